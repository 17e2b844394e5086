// SPDX-License-Identifier: GPL-3.0-or-later
// src/lib.rs
//
// Four-handle quadrilateral selection over an image: overlay mask,
// clipped rendering and bounding-box crop extraction.

pub mod app;
pub mod config;
pub mod constant;
pub mod domain;

pub use app::{AreaMessage, SelectionArea, UpdateResult};
pub use config::AreaConfig;
pub use domain::{
    resolve_bounding_box, BoundingBox, DocResult, HandleSet, ImageSource, Point, RenderOutcome,
};
