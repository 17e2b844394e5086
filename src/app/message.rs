// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/message.rs
//
// Selection area messages: host events, user actions and load signals.

use std::sync::Arc;

use image::DynamicImage;

use crate::domain::{ImageSource, Point};

#[derive(Debug, Clone)]
pub enum AreaMessage {
    // Source.
    SetSource(ImageSource),
    SourceFetched {
        url: String,
        image: Arc<DynamicImage>,
    },
    FetchFailed {
        url: String,
        error: String,
    },

    // Handles.
    MoveHandle { index: usize, point: Point },
    ResetHandles,

    // Crop pipeline.
    SourceLoaded {
        seq: u64,
        image: Arc<DynamicImage>,
    },
    LoadFailed {
        seq: u64,
        error: String,
    },

    // Errors.
    ClearError,
}
