// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/geometry.rs
//
// Handle points, handle set and bounding box resolution.

use anyhow::bail;

use super::DocResult;
use crate::constant::HANDLE_COUNT;

/// A viewport-relative position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Smallest axis-aligned rectangle enclosing the four handles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// True when the box encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Resolve the bounding box of four points.
///
/// Sorts the x and y coordinates separately and takes the extremes, so the
/// result only depends on the set of points, never on their order.
pub fn resolve_bounding_box(points: &[Point; HANDLE_COUNT]) -> BoundingBox {
    let mut xs = points.map(|p| p.x);
    let mut ys = points.map(|p| p.y);
    xs.sort_by(f32::total_cmp);
    ys.sort_by(f32::total_cmp);

    let last = HANDLE_COUNT - 1;
    BoundingBox {
        offset_x: xs[0],
        offset_y: ys[0],
        width: xs[last] - xs[0],
        height: ys[last] - ys[0],
    }
}

/// The four corner handles of a selection area.
///
/// Indices follow the winding top-left, top-right, bottom-right,
/// bottom-left. A handle that was never moved sits on its initial corner.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleSet {
    initial: [Point; HANDLE_COUNT],
    moved: [Option<Point>; HANDLE_COUNT],
}

impl HandleSet {
    /// Handles on the corners of a `width` x `height` rectangle.
    pub fn from_rect(width: f32, height: f32) -> Self {
        Self {
            initial: [
                Point::new(0.0, 0.0),
                Point::new(width, 0.0),
                Point::new(width, height),
                Point::new(0.0, height),
            ],
            moved: [None; HANDLE_COUNT],
        }
    }

    /// Effective position of handle `index`.
    pub fn get(&self, index: usize) -> Option<Point> {
        let initial = *self.initial.get(index)?;
        Some(self.moved[index].unwrap_or(initial))
    }

    /// Effective positions of all handles, in winding order.
    pub fn points(&self) -> [Point; HANDLE_COUNT] {
        std::array::from_fn(|i| self.moved[i].unwrap_or(self.initial[i]))
    }

    /// Move handle `index` to `point`.
    pub fn set(&mut self, index: usize, point: Point) -> DocResult<()> {
        let Some(slot) = self.moved.get_mut(index) else {
            bail!("Handle index {index} out of range (0..{HANDLE_COUNT})");
        };
        *slot = Some(point);
        Ok(())
    }

    /// Whether handle `index` has been moved away from its initial corner.
    pub fn is_moved(&self, index: usize) -> bool {
        self.moved.get(index).is_some_and(Option::is_some)
    }

    /// Return every handle to its initial corner.
    pub fn reset(&mut self) {
        self.moved = [None; HANDLE_COUNT];
    }

    pub fn bounding_box(&self) -> BoundingBox {
        resolve_bounding_box(&self.points())
    }

    /// Whether the closed path through the handles crosses itself.
    ///
    /// Only opposite edges of a quadrilateral can cross. Touching or
    /// collinear edges do not count as a crossing.
    pub fn is_self_intersecting(&self) -> bool {
        let [a, b, c, d] = self.points();
        segments_cross(a, b, c, d) || segments_cross(b, c, d, a)
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}
