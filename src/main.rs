// SPDX-License-Identifier: GPL-3.0-or-later
// src/main.rs
//
// Headless command line front end for the selection area.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Parser;

use quadcrop::constant::EMPTY_DATA_URL;
use quadcrop::domain::source::data_url_bytes;
use quadcrop::{AreaConfig, AreaMessage, ImageSource, Point, SelectionArea, UpdateResult};

/// Crop an image to the bounding box of a four-handle selection.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Image path, file:// or http(s):// URL, or data URL.
    pub image: String,

    /// Move a handle, as INDEX:X,Y (0 = top-left, clockwise). Repeatable.
    #[arg(long = "handle", value_parser = parse_handle)]
    pub handles: Vec<(usize, Point)>,

    /// Where to write the cropped PNG.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the crop as a data URL instead of writing a file.
    #[arg(long)]
    pub data_url: bool,

    /// Display width the image is scaled to.
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Display height the image is scaled to.
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Refuse handle moves that make the selection cross itself.
    #[arg(long)]
    pub reject_crossing: bool,
}

fn parse_handle(raw: &str) -> Result<(usize, Point), String> {
    let (index, coords) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected INDEX:X,Y, got {raw:?}"))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y after ':', got {coords:?}"))?;

    let index: usize = index.trim().parse().map_err(|e| format!("bad index: {e}"))?;
    if index >= quadcrop::constant::HANDLE_COUNT {
        return Err(format!("handle index {index} out of range (0..4)"));
    }
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok((index, Point::new(x, y)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AreaConfig {
        reject_self_intersecting: args.reject_crossing,
        ..AreaConfig::default()
    };

    let mut area = match (args.width, args.height) {
        (Some(width), Some(height)) => SelectionArea::with_size(config, width, height),
        _ => SelectionArea::new(config),
    };

    let source = if args.image.starts_with("data:") {
        ImageSource::Inline(args.image.clone())
    } else {
        ImageSource::Locator(args.image.clone())
    };
    let loaded = area.dispatch(&AreaMessage::SetSource(source));
    area.run(loaded).await;
    if let Some(e) = area.error() {
        bail!("{e}");
    }

    // Without explicit moves, re-place the first handle on its corner so
    // the whole area is cropped.
    let moves = if args.handles.is_empty() {
        let corner = area.handle(0).ok_or_else(|| anyhow!("Selection has no handles"))?;
        vec![(0, corner)]
    } else {
        args.handles.clone()
    };

    let mut last = UpdateResult::None;
    for (index, point) in moves {
        last = area.move_handle(index, point);
        if let Some(e) = area.error() {
            bail!("{e}");
        }
    }
    area.run(last).await;

    let output = area.output().context("No crop was produced")?;
    if args.data_url {
        println!("{output}");
        return Ok(());
    }

    if output == EMPTY_DATA_URL {
        bail!("Selection encloses no area, nothing to write");
    }
    let path = args
        .output
        .clone()
        .or_else(|| area.config().default_output_path())
        .context("No output path given and no default output directory found")?;
    std::fs::write(&path, data_url_bytes(output)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote crop to {}", path.display());

    Ok(())
}
