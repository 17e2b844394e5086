// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/surface.rs
//
// Pixel surfaces and their drawing contexts.

use image::{Rgba, RgbaImage};

use super::geometry::Point;

/// Scale-then-translate transform applied to traced paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale_x + self.translate_x,
            p.y * self.scale_y + self.translate_y,
        )
    }
}

impl From<Transform> for tiny_skia::Transform {
    fn from(t: Transform) -> Self {
        Self::from_row(t.scale_x, 0.0, 0.0, t.scale_y, t.translate_x, t.translate_y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Drawing context of a surface: pixels plus the current transform.
#[derive(Debug, Clone)]
pub struct DrawContext {
    pixels: RgbaImage,
    transform: Transform,
}

impl DrawContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            transform: Transform::IDENTITY,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn reset_transform(&mut self) {
        self.transform = Transform::IDENTITY;
    }

    /// Clear every pixel to transparent black.
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
}

/// Something the mask renderer can draw on.
///
/// A surface without a drawing context still has dimensions; rendering
/// onto it is skipped and its snapshot is fully transparent.
pub trait Surface {
    fn dimensions(&self) -> (u32, u32);

    fn context(&self) -> Option<&DrawContext>;

    fn context_mut(&mut self) -> Option<&mut DrawContext>;

    /// Current pixels, or a transparent buffer if there is no context.
    fn snapshot(&self) -> RgbaImage {
        match self.context() {
            Some(ctx) => ctx.pixels().clone(),
            None => {
                let (width, height) = self.dimensions();
                RgbaImage::new(width, height)
            }
        }
    }
}

/// In-memory RGBA surface.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    context: Option<DrawContext>,
}

impl RasterSurface {
    /// A drawable surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            context: Some(DrawContext::new(width, height)),
        }
    }

    /// A surface that has no drawing context (no rendering backend).
    pub fn headless(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            context: None,
        }
    }
}

impl Surface for RasterSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn context(&self) -> Option<&DrawContext> {
        self.context.as_ref()
    }

    fn context_mut(&mut self) -> Option<&mut DrawContext> {
        self.context.as_mut()
    }
}
