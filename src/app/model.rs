// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/model.rs
//
// Selection area state.

use std::collections::BTreeMap;

use image::{DynamicImage, GenericImageView};

use crate::domain::{CropOutput, CropRequest, HandleSet, ImageSource, RasterSurface};

pub struct AreaModel {
    // Source.
    pub source: Option<ImageSource>,
    pub image: Option<DynamicImage>,
    /// Remote URL currently being fetched; only its result is installed.
    pub fetching: Option<String>,

    // Layout. A fixed display size wins over the image's own size.
    pub display_size: Option<(u32, u32)>,
    pub width: u32,
    pub height: u32,

    // Handles.
    pub handles: HandleSet,

    // Surfaces.
    pub overlay: RasterSurface,
    pub clipped: RasterSurface,

    // Crop pipeline.
    pub pending: BTreeMap<u64, CropRequest>,
    pub output: CropOutput,
    pub next_seq: u64,

    // UI state.
    pub error: Option<String>,
}

impl AreaModel {
    pub fn new(display_size: Option<(u32, u32)>) -> Self {
        let (width, height) = display_size.unwrap_or((0, 0));
        Self {
            source: None,
            image: None,
            fetching: None,
            display_size,
            width,
            height,
            handles: HandleSet::from_rect(width as f32, height as f32),
            overlay: RasterSurface::new(width, height),
            clipped: RasterSurface::new(width, height),
            pending: BTreeMap::new(),
            output: CropOutput::default(),
            next_seq: 1,
            error: None,
        }
    }

    /// Install a decoded source and lay the area out around it.
    ///
    /// Surfaces are recreated at the area size and handles go back to the
    /// corners; in-flight crops and the previous output are dropped.
    pub fn set_image(&mut self, source: ImageSource, image: DynamicImage) {
        let (width, height) = self.display_size.unwrap_or_else(|| image.dimensions());
        self.source = Some(source);
        self.image = Some(image);
        self.width = width;
        self.height = height;
        self.handles = HandleSet::from_rect(width as f32, height as f32);
        self.overlay = RasterSurface::new(width, height);
        self.clipped = RasterSurface::new(width, height);
        self.pending.clear();
        self.output.clear();
    }

    /// Allocate the next crop sequence number.
    pub fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn set_error<S: Into<String>>(&mut self, msg: S) {
        self.error = Some(msg.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
