// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! 2D geometry primitives shared by the view controller, hit-testing and
//! thumbnail composition.
//!
//! All view updates are expressed as [`Affine`] products. `a.then(b)` applies
//! `a` first and `b` second, so the order of a composed transform reads left
//! to right.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Determinant magnitude below which a matrix is treated as non-invertible.
pub const SINGULAR_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero or negative.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle stored as origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Inclusive on the left/top edges, exclusive on the right/bottom edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("matrix is singular and cannot be inverted")]
pub struct SingularMatrix;

/// 2x3 affine matrix in row-vector form.
///
/// ```text
/// | m11 m12 0 |
/// | m21 m22 0 |
/// | dx  dy  1 |
/// ```
///
/// A point maps as `x' = x*m11 + y*m21 + dx`, `y' = x*m12 + y*m22 + dy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(m11: f64, m12: f64, m21: f64, m22: f64, dx: f64, dy: f64) -> Self {
        Self {
            m11,
            m12,
            m21,
            m22,
            dx,
            dy,
        }
    }

    pub const fn translate(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Uniform scale that keeps `center` fixed.
    pub fn scale_about(center: Point, factor: f64) -> Self {
        Self::translate(-center.x, -center.y)
            .then(Self::scale(factor, factor))
            .then(Self::translate(center.x, center.y))
    }

    /// Returns the transform that applies `self` first, then `next`.
    pub fn then(self, next: Affine) -> Affine {
        Affine {
            m11: self.m11 * next.m11 + self.m12 * next.m21,
            m12: self.m11 * next.m12 + self.m12 * next.m22,
            m21: self.m21 * next.m11 + self.m22 * next.m21,
            m22: self.m21 * next.m12 + self.m22 * next.m22,
            dx: self.dx * next.m11 + self.dy * next.m21 + next.dx,
            dy: self.dx * next.m12 + self.dy * next.m22 + next.dy,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    pub fn invert(&self) -> Result<Affine, SingularMatrix> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return Err(SingularMatrix);
        }

        let idet = 1.0 / det;
        let m11 = self.m22 * idet;
        let m12 = -self.m12 * idet;
        let m21 = -self.m21 * idet;
        let m22 = self.m11 * idet;

        Ok(Affine {
            m11,
            m12,
            m21,
            m22,
            dx: -(self.dx * m11 + self.dy * m21),
            dy: -(self.dx * m12 + self.dy * m22),
        })
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.m11 + p.y * self.m21 + self.dx,
            p.x * self.m12 + p.y * self.m22 + self.dy,
        )
    }

    /// Axis-aligned bounding box of `rect` after transformation.
    pub fn transform_rect(&self, rect: Rect) -> Rect {
        let corners = [
            self.apply(Point::new(rect.left(), rect.top())),
            self.apply(Point::new(rect.right(), rect.top())),
            self.apply(Point::new(rect.left(), rect.bottom())),
            self.apply(Point::new(rect.right(), rect.bottom())),
        ];

        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Horizontal scale factor. The view never rotates, so this is the zoom level.
    pub fn scale_factor(&self) -> f64 {
        self.m11
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// The sub-rectangle a "contain"-fit image occupies inside `container`.
///
/// The image fills the container along one axis and is letterboxed and
/// centered along the other. A degenerate container or aspect returns the
/// whole container.
pub fn content_rect(container: Size, image_aspect: f64) -> Rect {
    if container.is_degenerate() || !(image_aspect.is_finite() && image_aspect > 0.0) {
        return Rect::from_size(container);
    }

    let container_aspect = container.width / container.height;

    if image_aspect > container_aspect {
        // Bars above and below
        let height = container.width / image_aspect;
        Rect::new(
            0.0,
            (container.height - height) / 2.0,
            container.width,
            height,
        )
    } else {
        // Bars left and right
        let width = container.height * image_aspect;
        Rect::new(
            (container.width - width) / 2.0,
            0.0,
            width,
            container.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_then_applies_left_first() {
        let m = Affine::scale(2.0, 2.0).then(Affine::translate(10.0, 0.0));
        assert_eq!(m.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));

        let m = Affine::translate(10.0, 0.0).then(Affine::scale(2.0, 2.0));
        assert_eq!(m.apply(Point::new(1.0, 1.0)), Point::new(22.0, 2.0));
    }

    #[test]
    fn test_scale_about_keeps_center() {
        let center = Point::new(40.0, 25.0);
        let m = Affine::scale_about(center, 3.0);
        let mapped = m.apply(center);
        assert!((mapped.x - center.x).abs() < 1e-9);
        assert!((mapped.y - center.y).abs() < 1e-9);
    }

    #[test]
    fn test_contains_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.999, 9.999)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(5.0, 10.0)));
    }

    #[test]
    fn test_singular() {
        assert_eq!(Affine::scale(0.0, 1.0).invert(), Err(SingularMatrix));
    }
}
