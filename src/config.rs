// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// Configuration of a selection area.

use std::path::PathBuf;
use std::time::Duration;

use crate::constant::{DEFAULT_OUTPUT_NAME, FETCH_TIMEOUT_SECS, MAX_CROP_PIXELS, OVERLAY_FILL};

/// Configuration for a selection area.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaConfig {
    /// Overlay fill color (RGBA, straight alpha).
    pub overlay_fill: [u8; 4],
    /// Refuse handle moves that make the traced path cross itself.
    pub reject_self_intersecting: bool,
    /// Crops larger than this many pixels are refused instead of allocated.
    pub max_crop_pixels: u64,
    /// Timeout for `http(s)` image locators.
    pub fetch_timeout: Duration,
    /// Directory the CLI writes crops to when no output path is given.
    pub output_dir: Option<PathBuf>,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            overlay_fill: OVERLAY_FILL,
            reject_self_intersecting: false,
            max_crop_pixels: MAX_CROP_PIXELS,
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            output_dir: dirs::picture_dir().or_else(dirs::home_dir),
        }
    }
}

impl AreaConfig {
    /// Default output file for crops, if an output directory is known.
    pub fn default_output_path(&self) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(DEFAULT_OUTPUT_NAME))
    }
}
