// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/source.rs
//
// Image sources (locator or inline payload) and data URL encoding.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};

use super::DocResult;
use crate::constant::{EMPTY_DATA_URL, ENCODED_MIME};

/// Where the displayed image comes from.
///
/// Locators and inline payloads are interchangeable; both load into the
/// same decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Filesystem path, `file://` URL or `http(s)://` URL.
    Locator(String),
    /// `data:` URL or bare base64 payload.
    Inline(String),
}

impl ImageSource {
    /// The URL to fetch, if this is a remote locator.
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            Self::Locator(locator) if is_remote(locator) => Some(locator.as_str()),
            _ => None,
        }
    }

    /// Decode a local image. Remote locators go through [`fetch_remote`].
    pub fn load(&self) -> DocResult<DynamicImage> {
        match self {
            Self::Locator(locator) if is_remote(locator) => {
                bail!("Remote locator {locator} has to be fetched first")
            }
            Self::Locator(locator) => load_locator(locator),
            Self::Inline(payload) if payload.starts_with("data:") => decode_data_url(payload),
            Self::Inline(payload) => {
                let bytes = STANDARD
                    .decode(payload.trim().as_bytes())
                    .context("Inline image is not valid base64")?;
                image::load_from_memory(&bytes).context("Failed to decode inline image")
            }
        }
    }
}

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

fn load_locator(locator: &str) -> DocResult<DynamicImage> {
    let path = Path::new(locator.strip_prefix("file://").unwrap_or(locator));
    let image = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(image)
}

/// Download and decode an `http(s)` image.
pub async fn fetch_remote(url: &str, timeout: Duration) -> DocResult<DynamicImage> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Failed to fetch {url}"))?;
    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body of {url}"))?;
    log::debug!("Fetched {} bytes from {url}", bytes.len());

    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .context("Decode task failed")?
        .with_context(|| format!("Failed to decode {url}"))?;
    Ok(image)
}

/// Serialize pixels as a PNG data URL.
///
/// A buffer without area becomes the empty data URL.
pub fn encode_data_url(pixels: &RgbaImage) -> DocResult<String> {
    if pixels.width() == 0 || pixels.height() == 0 {
        return Ok(EMPTY_DATA_URL.to_string());
    }
    let mut buffer = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(format!("data:{ENCODED_MIME};base64,{}", STANDARD.encode(buffer)))
}

/// Decode a base64 data URL. The empty data URL decodes to a 0x0 image.
pub fn decode_data_url(url: &str) -> DocResult<DynamicImage> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("Not a data URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("Data URL has no payload separator"))?;

    if payload.is_empty() {
        return Ok(DynamicImage::ImageRgba8(RgbaImage::new(0, 0)));
    }
    if !meta.ends_with(";base64") {
        bail!("Only base64 data URLs are supported");
    }

    let bytes = STANDARD
        .decode(payload.as_bytes())
        .context("Data URL payload is not valid base64")?;
    image::load_from_memory(&bytes).context("Failed to decode data URL image")
}

/// Decoded bytes of a data URL payload (used to write crops to disk).
pub fn data_url_bytes(url: &str) -> DocResult<Vec<u8>> {
    let (_, payload) = url
        .split_once(',')
        .ok_or_else(|| anyhow!("Data URL has no payload separator"))?;
    Ok(STANDARD.decode(payload.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    #[test]
    fn empty_buffer_encodes_to_empty_data_url() {
        assert_eq!(encode_data_url(&RgbaImage::new(0, 7)).unwrap(), "data:,");
        assert_eq!(encode_data_url(&RgbaImage::new(7, 0)).unwrap(), "data:,");
    }

    #[test]
    fn empty_data_url_decodes_to_empty_image() {
        let img = decode_data_url("data:,").unwrap();
        assert_eq!(img.dimensions(), (0, 0));
    }

    #[test]
    fn encoded_pixels_decode_back() {
        let mut pixels = RgbaImage::new(3, 2);
        pixels.put_pixel(2, 1, Rgba([1, 2, 3, 4]));
        let url = encode_data_url(&pixels).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = decode_data_url(&url).unwrap().to_rgba8();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn bare_base64_and_data_url_load_the_same_image() {
        let pixels = RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 255]));
        let url = encode_data_url(&pixels).unwrap();
        let (_, bare) = url.split_once(',').unwrap();

        let from_url = ImageSource::Inline(url.clone()).load().unwrap();
        let from_bare = ImageSource::Inline(bare.to_string()).load().unwrap();
        assert_eq!(from_url.to_rgba8(), from_bare.to_rgba8());
    }

    #[test]
    fn rejects_non_base64_data_url() {
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("nope").is_err());
    }

    #[test]
    fn only_http_locators_are_remote() {
        let remote = ImageSource::Locator("https://example.org/a.png".into());
        assert_eq!(remote.remote_url(), Some("https://example.org/a.png"));
        assert!(ImageSource::Locator("http://localhost/a.png".into())
            .remote_url()
            .is_some());
        assert!(ImageSource::Locator("file:///tmp/a.png".into())
            .remote_url()
            .is_none());
        assert!(ImageSource::Inline("https://example.org/a.png".into())
            .remote_url()
            .is_none());
    }

    #[test]
    fn remote_locator_is_not_loaded_synchronously() {
        let err = ImageSource::Locator("https://example.org/a.png".into())
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("fetched"));
    }

    #[tokio::test]
    async fn unreachable_remote_is_an_error() {
        // Port 9 (discard) is not served on loopback.
        let result = fetch_remote("http://127.0.0.1:9/a.png", Duration::from_secs(2)).await;
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ImageSource::Locator("file:///definitely/not/here.png".into())
            .load()
            .is_err());
    }
}
