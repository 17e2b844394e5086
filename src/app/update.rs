// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/update.rs
//
// Message handling for the selection area.

use image::{DynamicImage, Rgba};

use super::message::AreaMessage;
use super::model::AreaModel;
use crate::config::AreaConfig;
use crate::domain::{render_mask, CropRequest, ImageSource, MaskMode, Point, RenderOutcome};

/// What the host has to do after a message was handled.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    None,
    /// Load the clipped snapshot and report back with
    /// [`AreaMessage::SourceLoaded`] (or `LoadFailed`) for `seq`.
    Load { seq: u64, snapshot: String },
    /// Fetch a remote image and report back with
    /// [`AreaMessage::SourceFetched`] (or `FetchFailed`) for `url`.
    Fetch { url: String },
}

pub fn update(model: &mut AreaModel, config: &AreaConfig, message: &AreaMessage) -> UpdateResult {
    match message {
        AreaMessage::SetSource(source) => {
            // A newer source supersedes any fetch in flight.
            model.fetching = None;
            if let Some(url) = source.remote_url() {
                log::info!("Fetching {url}");
                model.fetching = Some(url.to_string());
                return UpdateResult::Fetch {
                    url: url.to_string(),
                };
            }
            match source.load() {
                Ok(image) => install(model, config, source.clone(), image),
                Err(e) => {
                    log::error!("Failed to load image source: {e:#}");
                    model.set_error(format!("{e:#}"));
                }
            }
            UpdateResult::None
        }

        AreaMessage::SourceFetched { url, image } => {
            if model.fetching.as_deref() != Some(url.as_str()) {
                log::debug!("Ignoring superseded fetch of {url}");
                return UpdateResult::None;
            }
            model.fetching = None;
            install(model, config, ImageSource::Locator(url.clone()), (**image).clone());
            UpdateResult::None
        }

        AreaMessage::FetchFailed { url, error } => {
            if model.fetching.as_deref() == Some(url.as_str()) {
                model.fetching = None;
                log::error!("Failed to fetch {url}: {error}");
                model.set_error(error.clone());
            }
            UpdateResult::None
        }

        AreaMessage::MoveHandle { index, point } => move_handle(model, config, *index, *point),

        AreaMessage::ResetHandles => {
            model.handles.reset();
            model.pending.clear();
            model.output.clear();
            render(model, config);
            UpdateResult::None
        }

        AreaMessage::SourceLoaded { seq, image } => {
            let Some(request) = model.pending.get_mut(seq) else {
                log::debug!("Load for unknown or superseded crop #{seq}");
                return UpdateResult::None;
            };
            match request.on_load(image) {
                None => {}
                Some(Ok(src)) => {
                    if model.output.commit(*seq, src) {
                        // Older crops can no longer become visible.
                        model.pending.retain(|&k, _| k >= *seq);
                    }
                }
                Some(Err(e)) => {
                    model.pending.remove(seq);
                    log::error!("Failed to extract crop #{seq}: {e:#}");
                    model.set_error(format!("{e:#}"));
                }
            }
            UpdateResult::None
        }

        AreaMessage::LoadFailed { seq, error } => {
            model.pending.remove(seq);
            log::error!("Failed to load snapshot for crop #{seq}: {error}");
            model.set_error(error.clone());
            UpdateResult::None
        }

        AreaMessage::ClearError => {
            model.clear_error();
            UpdateResult::None
        }
    }
}

fn install(model: &mut AreaModel, config: &AreaConfig, source: ImageSource, image: DynamicImage) {
    model.set_image(source, image);
    model.clear_error();
    render(model, config);
}

fn move_handle(
    model: &mut AreaModel,
    config: &AreaConfig,
    index: usize,
    point: Point,
) -> UpdateResult {
    let previous = model.handles.clone();
    if let Err(e) = model.handles.set(index, point) {
        log::warn!("{e}");
        model.set_error(e.to_string());
        return UpdateResult::None;
    }

    if model.handles.is_self_intersecting() {
        if config.reject_self_intersecting {
            model.handles = previous;
            model.set_error(format!(
                "Moving handle {index} to ({}, {}) would make the selection cross itself",
                point.x, point.y
            ));
            return UpdateResult::None;
        }
        log::warn!("Selection path crosses itself after moving handle {index}");
    }

    render(model, config);

    let seq = model.take_seq();
    let bbox = model.handles.bounding_box();
    match CropRequest::assign(seq, &model.clipped, bbox, config.max_crop_pixels) {
        Ok(request) => {
            let snapshot = request.snapshot().to_string();
            model.pending.insert(seq, request);
            UpdateResult::Load { seq, snapshot }
        }
        Err(e) => {
            log::error!("Failed to snapshot clipped surface: {e:#}");
            model.set_error(format!("{e:#}"));
            UpdateResult::None
        }
    }
}

/// Redraw the overlay and the clipped surface from the current handles.
pub fn render(model: &mut AreaModel, config: &AreaConfig) {
    let points = model.handles.points();

    let overlay = render_mask(
        &mut model.overlay,
        &points,
        MaskMode::Fill(Rgba(config.overlay_fill)),
        None,
    );
    let clipped = render_mask(&mut model.clipped, &points, MaskMode::Clip, model.image.as_ref());

    if overlay == RenderOutcome::Unsupported || clipped == RenderOutcome::Unsupported {
        log::debug!("Render skipped: overlay {overlay:?}, clipped {clipped:?}");
    }
}
