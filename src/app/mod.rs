// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/mod.rs
//
// Selection area component: owns the model and drives the crop pipeline.

pub mod message;
pub mod model;
pub mod update;

use std::sync::Arc;
use std::time::Duration;

pub use message::AreaMessage;
pub use model::AreaModel;
pub use update::UpdateResult;

use crate::config::AreaConfig;
use crate::domain::source::{decode_data_url, fetch_remote};
use crate::domain::{BoundingBox, CropRequest, ImageSource, Point, RasterSurface};

/// A four-handle selection area over an image.
pub struct SelectionArea {
    model: AreaModel,
    config: AreaConfig,
}

impl SelectionArea {
    /// An area sized after the image it is given.
    pub fn new(config: AreaConfig) -> Self {
        Self {
            model: AreaModel::new(None),
            config,
        }
    }

    /// An area with a fixed display size; the image is scaled to it.
    pub fn with_size(config: AreaConfig, width: u32, height: u32) -> Self {
        Self {
            model: AreaModel::new(Some((width, height))),
            config,
        }
    }

    /// Handle one message.
    pub fn dispatch(&mut self, message: &AreaMessage) -> UpdateResult {
        update::update(&mut self.model, &self.config, message)
    }

    /// Set the source from a locator (path, `file://` or `http(s)://` URL).
    ///
    /// Remote URLs return [`UpdateResult::Fetch`]; pass it to [`Self::run`].
    pub fn set_image_url(&mut self, url: impl Into<String>) -> UpdateResult {
        self.dispatch(&AreaMessage::SetSource(ImageSource::Locator(url.into())))
    }

    /// Set the source from an inline payload (data URL or bare base64).
    pub fn set_image_base64(&mut self, payload: impl Into<String>) -> UpdateResult {
        self.dispatch(&AreaMessage::SetSource(ImageSource::Inline(payload.into())))
    }

    pub fn move_handle(&mut self, index: usize, point: Point) -> UpdateResult {
        self.dispatch(&AreaMessage::MoveHandle { index, point })
    }

    /// Carry out the host side of an update result.
    ///
    /// Fetching and decoding run off the event loop; the resulting event
    /// is fed back through [`Self::dispatch`].
    pub async fn run(&mut self, result: UpdateResult) {
        let message = match result {
            UpdateResult::None => return,
            UpdateResult::Load { seq, snapshot } => load_snapshot(seq, snapshot).await,
            UpdateResult::Fetch { url } => fetch_source(url, self.config.fetch_timeout).await,
        };
        // Loaded and fetched events never ask for further work.
        let _ = self.dispatch(&message);
    }

    /// Move a handle and wait for the resulting crop.
    pub async fn move_handle_and_crop(&mut self, index: usize, point: Point) -> Option<&str> {
        let result = self.move_handle(index, point);
        self.run(result).await;
        self.output()
    }

    pub fn handle(&self, index: usize) -> Option<Point> {
        self.model.handles.get(index)
    }

    /// The current path through the four handles, in winding order.
    pub fn bounding_path(&self) -> [Point; 4] {
        self.model.handles.points()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.model.handles.bounding_box()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.model.width, self.model.height)
    }

    pub fn overlay(&self) -> &RasterSurface {
        &self.model.overlay
    }

    pub fn clipped(&self) -> &RasterSurface {
        &self.model.clipped
    }

    /// The live cropped output as a data URL.
    pub fn output(&self) -> Option<&str> {
        self.model.output.src()
    }

    pub fn pending(&self, seq: u64) -> Option<&CropRequest> {
        self.model.pending.get(&seq)
    }

    pub fn error(&self) -> Option<&str> {
        self.model.error.as_deref()
    }

    pub fn config(&self) -> &AreaConfig {
        &self.config
    }
}

/// Decode a clipped snapshot off the event loop.
pub async fn load_snapshot(seq: u64, snapshot: String) -> AreaMessage {
    let decoded = tokio::task::spawn_blocking(move || decode_data_url(&snapshot)).await;

    match decoded {
        Ok(Ok(image)) => AreaMessage::SourceLoaded {
            seq,
            image: Arc::new(image),
        },
        Ok(Err(e)) => AreaMessage::LoadFailed {
            seq,
            error: format!("{e:#}"),
        },
        Err(e) => AreaMessage::LoadFailed {
            seq,
            error: format!("Decode task failed: {e}"),
        },
    }
}

/// Fetch a remote source.
pub async fn fetch_source(url: String, timeout: Duration) -> AreaMessage {
    match fetch_remote(&url, timeout).await {
        Ok(image) => AreaMessage::SourceFetched {
            url,
            image: Arc::new(image),
        },
        Err(e) => AreaMessage::FetchFailed {
            error: format!("{e:#}"),
            url,
        },
    }
}
