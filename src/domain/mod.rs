// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Domain layer: geometry, surfaces, masking and crop extraction.
// No host or event-loop concerns live here.

pub mod crop;
pub mod geometry;
pub mod mask;
pub mod source;
pub mod surface;

/// Result type used across the crate.
pub type DocResult<T> = anyhow::Result<T>;

pub use crop::{CropOutput, CropRegion, CropRequest, Latch};
pub use geometry::{resolve_bounding_box, BoundingBox, HandleSet, Point};
pub use mask::{render_mask, MaskMode, RenderOutcome};
pub use source::ImageSource;
pub use surface::{DrawContext, RasterSurface, Surface, Transform};
