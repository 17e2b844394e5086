// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mask.rs
//
// Quadrilateral mask rendering: overlay fill and clip of the source.

use image::{imageops, DynamicImage, Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use super::geometry::Point;
use super::surface::{DrawContext, Surface};
use crate::constant::{HANDLE_COUNT, OVERLAY_FILL};

/// How the traced path is applied to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMode {
    /// Fill the path with a (semi-transparent) color.
    Fill(Rgba<u8>),
    /// Clip to the path and draw the source image inside it.
    Clip,
}

impl MaskMode {
    /// Fill mode with the default overlay color.
    pub const fn overlay() -> Self {
        Self::Fill(Rgba(OVERLAY_FILL))
    }
}

/// Result of a render call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// The surface has no drawing context; nothing was drawn.
    Unsupported,
}

/// Render the quadrilateral through `points` onto `surface`.
///
/// Both modes clear the surface first, so repeated calls with the same
/// input leave identical pixels behind. Edges are anti-aliased.
pub fn render_mask<S: Surface + ?Sized>(
    surface: &mut S,
    points: &[Point; HANDLE_COUNT],
    mode: MaskMode,
    source: Option<&DynamicImage>,
) -> RenderOutcome {
    let (width, height) = surface.dimensions();
    let Some(ctx) = surface.context_mut() else {
        log::debug!("Surface {width}x{height} has no drawing context, skipping render");
        return RenderOutcome::Unsupported;
    };

    if matches!(mode, MaskMode::Clip) {
        ctx.reset_transform();
    }
    ctx.clear();

    // A zero-sized surface has nothing to draw on.
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return RenderOutcome::Rendered;
    };
    let Some(path) = build_path(points) else {
        log::debug!("Selection path is empty, nothing to draw");
        return RenderOutcome::Rendered;
    };

    match mode {
        MaskMode::Fill(Rgba([r, g, b, a])) => {
            let mut paint = Paint::default();
            paint.set_color_rgba8(r, g, b, a);
            paint.anti_alias = true;
            pixmap.fill_path(
                &path,
                &paint,
                FillRule::Winding,
                ctx.transform().into(),
                None,
            );
        }
        MaskMode::Clip => {
            let Some(source) = source else {
                return RenderOutcome::Rendered;
            };
            let Some(mut mask) = Mask::new(width, height) else {
                return RenderOutcome::Rendered;
            };
            mask.fill_path(&path, FillRule::Winding, true, Transform::identity());

            let Some(scaled) = to_pixmap(&fit_source(source, width, height)) else {
                return RenderOutcome::Rendered;
            };
            pixmap.draw_pixmap(
                0,
                0,
                scaled.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                Some(&mask),
            );
        }
    }

    store(ctx, &pixmap);
    RenderOutcome::Rendered
}

/// Closed path through the handles, in order.
fn build_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for point in rest {
        builder.line_to(point.x, point.y);
    }
    builder.close();
    builder.finish()
}

/// The source image at the surface size, as RGBA.
fn fit_source(source: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let rgba = source.to_rgba8();
    if rgba.dimensions() == (width, height) {
        rgba
    } else {
        imageops::resize(&rgba, width, height, imageops::FilterType::Triangle)
    }
}

/// Straight-alpha pixels to a premultiplied pixmap.
fn to_pixmap(pixels: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(pixels.width(), pixels.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(pixels.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Write a premultiplied pixmap back into the context's straight-alpha pixels.
fn store(ctx: &mut DrawContext, pixmap: &Pixmap) {
    for (dst, src) in ctx.pixels_mut().pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
}
