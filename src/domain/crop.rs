// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop.rs
//
// Crop extraction: region copy, one-shot load latch and sequenced output.

use anyhow::bail;
use image::{DynamicImage, GenericImageView, RgbaImage};

use super::geometry::BoundingBox;
use super::source::{decode_data_url, encode_data_url};
use super::surface::Surface;
use super::DocResult;

/// Crop region in pixel coordinates.
///
/// The offset may be negative when handles were dragged outside the
/// image; the part of the region outside the source stays transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if region has valid dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl CropRegion {
    /// Byte length of an RGBA buffer for this region, if it fits in
    /// `max_pixels` and in memory.
    pub fn buffer_len(&self, max_pixels: u64) -> Option<usize> {
        let pixels = u64::from(self.width).checked_mul(u64::from(self.height))?;
        if pixels > max_pixels {
            return None;
        }
        usize::try_from(pixels.checked_mul(4)?).ok()
    }
}

impl From<BoundingBox> for CropRegion {
    /// The smallest pixel rectangle that contains the box: offsets are
    /// floored and the far edges ceiled, so a fractional box never loses
    /// a partially covered row or column. A box without area stays empty.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(bbox: BoundingBox) -> Self {
        fn span(offset: f32, size: f32) -> (i32, u32) {
            let start = f64::from(offset).floor();
            if size.is_nan() || size <= 0.0 {
                return (start as i32, 0);
            }
            let end = (f64::from(offset) + f64::from(size)).ceil();
            (start as i32, (end - start) as u32)
        }

        let (x, width) = span(bbox.offset_x, bbox.width);
        let (y, height) = span(bbox.offset_y, bbox.height);
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Copy `region` of `source` into a new buffer of exactly the region size.
///
/// Regions above `max_pixels` are refused rather than allocated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn copy_region(
    source: &DynamicImage,
    region: CropRegion,
    max_pixels: u64,
) -> DocResult<RgbaImage> {
    if region.buffer_len(max_pixels).is_none() {
        bail!(
            "Crop of {}x{} exceeds the limit of {max_pixels} pixels",
            region.width,
            region.height
        );
    }
    let mut buffer = RgbaImage::new(region.width, region.height);
    let (src_w, src_h) = source.dimensions();

    for (x, y, px) in buffer.enumerate_pixels_mut() {
        let sx = i64::from(region.x) + i64::from(x);
        let sy = i64::from(region.y) + i64::from(y);
        if (0..i64::from(src_w)).contains(&sx) && (0..i64::from(src_h)).contains(&sy) {
            *px = source.get_pixel(sx as u32, sy as u32);
        }
    }
    Ok(buffer)
}

/// State of a single-use guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latch {
    #[default]
    Armed,
    Fired,
}

impl Latch {
    /// Fire the latch. Returns `true` only the first time.
    pub fn fire(&mut self) -> bool {
        match self {
            Self::Armed => {
                *self = Self::Fired;
                true
            }
            Self::Fired => false,
        }
    }

    pub fn has_fired(&self) -> bool {
        *self == Self::Fired
    }
}

/// A crop in flight: the clipped snapshot waiting to be loaded.
#[derive(Debug, Clone)]
pub struct CropRequest {
    seq: u64,
    region: CropRegion,
    max_pixels: u64,
    snapshot: String,
    latch: Latch,
}

impl CropRequest {
    /// Assign the clipped surface's current pixels as the load source.
    ///
    /// `max_pixels` bounds the crop buffer allocated when the load arrives.
    pub fn assign<S: Surface + ?Sized>(
        seq: u64,
        clipped: &S,
        bbox: BoundingBox,
        max_pixels: u64,
    ) -> DocResult<Self> {
        let snapshot = encode_data_url(&clipped.snapshot())?;
        Ok(Self {
            seq,
            region: CropRegion::from(bbox),
            max_pixels,
            snapshot,
            latch: Latch::default(),
        })
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    /// The data URL being loaded.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn is_done(&self) -> bool {
        self.latch.has_fired()
    }

    /// Decode the snapshot. This is the slow part of a crop.
    pub fn decode(&self) -> DocResult<DynamicImage> {
        decode_data_url(&self.snapshot)
    }

    /// Handle a load event for the snapshot.
    ///
    /// The first call copies the region and encodes it; later calls
    /// return `None`.
    pub fn on_load(&mut self, loaded: &DynamicImage) -> Option<DocResult<String>> {
        if !self.latch.fire() {
            log::debug!("Ignoring repeated load for crop #{}", self.seq);
            return None;
        }
        let crop = copy_region(loaded, self.region, self.max_pixels);
        Some(crop.and_then(|buffer| encode_data_url(&buffer)))
    }
}

/// The visible crop result.
///
/// Only a result newer than the one currently shown is accepted, so a
/// slow stale crop cannot overwrite a fresher one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropOutput {
    src: Option<String>,
    seq: Option<u64>,
}

impl CropOutput {
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Sequence number of the shown result.
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Show `src` if `seq` is newer than the current result.
    pub fn commit(&mut self, seq: u64, src: String) -> bool {
        if self.seq.is_some_and(|current| seq <= current) {
            log::debug!("Dropping stale crop #{seq}");
            return false;
        }
        self.seq = Some(seq);
        self.src = Some(src);
        true
    }

    pub fn clear(&mut self) {
        self.src = None;
        self.seq = None;
    }
}
