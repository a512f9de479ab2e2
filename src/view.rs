// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Pan/zoom state for the full-resolution schematic view.
//!
//! The image widget fills the container and draws the bitmap "contain"-fit
//! inside it, so image-local coordinates and container coordinates coincide
//! at identity. The controller's matrix maps image-local coordinates to
//! container coordinates.

use crate::config::ViewerConfig;
use crate::geometry::{content_rect, Affine, Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub factor: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for ZoomLimits {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            factor: config.zoom_factor,
            min: config.min_zoom,
            max: config.max_zoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// What a zoom step did. Every variant except `Ignored` means the input
/// event was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutcome {
    Zoomed,
    /// The step would have exceeded the maximum scale.
    Rejected,
    /// The step fell below the minimum scale and the view snapped to identity.
    Reset,
    /// No usable container yet.
    Ignored,
}

impl ZoomOutcome {
    pub fn needs_redraw(self) -> bool {
        matches!(self, ZoomOutcome::Zoomed | ZoomOutcome::Reset)
    }
}

#[derive(Debug, Clone, Copy)]
struct PanGesture {
    start_point: Point,
    start_matrix: Affine,
}

/// Slides `matrix` so the transformed `content` leaves no empty space in
/// `container`. Scale is never changed.
///
/// Content at least as wide as the container is moved until neither side
/// shows a gap; narrower content is centered horizontally. Vertically the
/// same gap rule applies, but shorter content is pinned to the top.
pub fn clamp_matrix(matrix: Affine, container: Size, content: Rect) -> Affine {
    if container.is_degenerate() {
        return matrix;
    }

    let scale = matrix.scale_factor();
    let mut tx = matrix.dx;
    let mut ty = matrix.dy;
    let shown = matrix.transform_rect(content);

    if shown.width >= container.width {
        if shown.left() > 0.0 {
            tx -= shown.left();
        } else if shown.right() < container.width {
            tx += container.width - shown.right();
        }
    } else {
        tx = (container.width - shown.width) / 2.0 - scale * content.left();
    }

    if shown.height >= container.height {
        if shown.top() > 0.0 {
            ty -= shown.top();
        } else if shown.bottom() < container.height {
            ty += container.height - shown.bottom();
        }
    } else {
        ty = -(scale * content.top());
    }

    Affine::new(scale, 0.0, 0.0, scale, tx, ty)
}

#[derive(Debug, Clone)]
pub struct ViewTransform {
    matrix: Affine,
    container: Size,
    /// Pixel size of the displayed bitmap, if one is loaded.
    image_size: Option<Size>,
    limits: ZoomLimits,
    pan: Option<PanGesture>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl ViewTransform {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            matrix: Affine::IDENTITY,
            container: Size::default(),
            image_size: None,
            limits,
            pan: None,
        }
    }

    pub fn matrix(&self) -> Affine {
        self.matrix
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Back to identity with no image; used when the displayed schematic changes.
    pub fn reset(&mut self) {
        self.matrix = Affine::IDENTITY;
        self.image_size = None;
        self.pan = None;
    }

    /// Records the pixel size of a newly installed image and reclamps.
    pub fn set_image_size(&mut self, size: Option<Size>) -> bool {
        self.image_size = size.filter(|s| !s.is_degenerate());
        self.clamp();
        true
    }

    /// Applies a settled layout size. Safe to call on every layout pass;
    /// returns true only when something visible changed.
    pub fn set_container_size(&mut self, size: Size) -> bool {
        if size.is_degenerate() {
            return false;
        }
        let resized = size != self.container;
        self.container = size;
        let moved = self.clamp();
        resized || moved
    }

    /// Rectangle the bitmap occupies in image-local coordinates.
    pub fn content_rect(&self) -> Rect {
        match self.image_size {
            Some(size) => content_rect(self.container, size.width / size.height),
            None => Rect::from_size(self.container),
        }
    }

    /// Re-applies the boundary rule. Returns true when the matrix changed.
    pub fn clamp(&mut self) -> bool {
        if self.container.is_degenerate() {
            return false;
        }

        let clamped = clamp_matrix(self.matrix, self.container, self.content_rect());
        let changed = clamped != self.matrix;
        self.matrix = clamped;
        changed
    }

    /// One zoom step anchored at `cursor` (container coordinates).
    pub fn zoom(&mut self, cursor: Point, direction: ZoomDirection) -> ZoomOutcome {
        if self.container.is_degenerate() {
            return ZoomOutcome::Ignored;
        }

        let step = match direction {
            ZoomDirection::In => self.limits.factor,
            ZoomDirection::Out => 1.0 / self.limits.factor,
        };
        let new_scale = self.matrix.scale_factor() * step;

        if new_scale > self.limits.max {
            return ZoomOutcome::Rejected;
        }

        if new_scale < self.limits.min {
            self.matrix = Affine::IDENTITY;
            return ZoomOutcome::Reset;
        }

        // Anchor the step at the image-local point under the cursor.
        let Ok(inverse) = self.matrix.invert() else {
            return ZoomOutcome::Ignored;
        };
        let local = inverse.apply(cursor);

        self.matrix = Affine::scale_about(local, step).then(self.matrix);
        self.clamp();
        ZoomOutcome::Zoomed
    }

    pub fn begin_pan(&mut self, at: Point) {
        self.pan = Some(PanGesture {
            start_point: at,
            start_matrix: self.matrix,
        });
    }

    /// Moves the view with the pointer. Clamps on every move so dragging
    /// never exposes empty space.
    pub fn pan_to(&mut self, at: Point) -> bool {
        let Some(gesture) = self.pan else {
            return false;
        };
        if self.container.is_degenerate() {
            return false;
        }

        let delta = at - gesture.start_point;
        self.matrix = gesture
            .start_matrix
            .then(Affine::translate(delta.x, delta.y));
        self.clamp();
        true
    }

    pub fn end_pan(&mut self) -> bool {
        self.pan.take().is_some()
    }

    /// Maps a container point into bitmap pixel coordinates.
    ///
    /// Returns `None` when the matrix is singular, no image is loaded, or the
    /// point lies outside the bitmap.
    pub fn to_image_pixel(&self, at: Point) -> Option<Point> {
        let image = self.image_size?;
        let inverse = self.matrix.invert().ok()?;
        let local = inverse.apply(at);

        let content = self.content_rect();
        if content.is_empty() || !content.contains(local) {
            return None;
        }

        Some(Point::new(
            (local.x - content.x) / content.width * image.width,
            (local.y - content.y) / content.height * image.height,
        ))
    }

    /// Maps a rectangle in bitmap pixel coordinates into container coordinates.
    pub fn image_rect_to_container(&self, rect: Rect) -> Option<Rect> {
        let image = self.image_size?;
        let content = self.content_rect();
        let sx = content.width / image.width;
        let sy = content.height / image.height;
        let local = Rect::new(
            content.x + rect.x * sx,
            content.y + rect.y * sy,
            rect.width * sx,
            rect.height * sy,
        );
        Some(self.matrix.transform_rect(local))
    }
}
