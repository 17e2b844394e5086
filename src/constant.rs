// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Constants that should not be changed by the user.

/// Number of corner handles of a selection area.
pub const HANDLE_COUNT: usize = 4;

/// Overlay fill color (white at 20% opacity, straight alpha).
pub const OVERLAY_FILL: [u8; 4] = [255, 255, 255, 51];

/// MIME type of every encoded surface and crop.
pub const ENCODED_MIME: &str = "image/png";

/// What a zero-sized buffer serializes to: a valid but empty data URL.
pub const EMPTY_DATA_URL: &str = "data:,";

/// File name used by the CLI when no output path is given.
pub const DEFAULT_OUTPUT_NAME: &str = "quadcrop.png";

/// Largest crop, in pixels, that is ever allocated (16384 x 16384).
pub const MAX_CROP_PIXELS: u64 = 1 << 28;

/// Time allowed for fetching a remote image.
pub const FETCH_TIMEOUT_SECS: u64 = 30;
