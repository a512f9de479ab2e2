// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! CPU-side highlight composition.
//!
//! The live view only needs a list of container-space quads each frame; the
//! thumbnails get the highlights baked into a fresh bitmap whenever the
//! selection or blink phase changes.

use image::{imageops, imageops::FilterType, Rgba, RgbaImage};

use crate::config::ViewerConfig;
use crate::data::SchematicRecord;
use crate::geometry::Rect;
use crate::index::HighlightIndex;
use crate::metadata::{parse_color_or, parse_opacity_or, Color};
use crate::view::ViewTransform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    pub color: Color,
    /// Configured opacity in `[0, 1]`, before any blink multiplier.
    pub opacity: f64,
}

impl HighlightStyle {
    pub fn parse(color: &str, opacity: &str, config: &ViewerConfig) -> Self {
        Self {
            color: parse_color_or(color, config.default_highlight_color),
            opacity: parse_opacity_or(opacity, config.default_highlight_opacity),
        }
    }

    /// Opacity after applying a blink multiplier.
    pub fn effective_opacity(&self, multiplier: f64) -> f64 {
        (self.opacity * multiplier.clamp(0.0, 1.0)).clamp(0.0, 1.0)
    }
}

/// Highlight styles for one schematic: the full-resolution view and its
/// thumbnail may use different colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchematicStyles {
    pub main: HighlightStyle,
    pub thumbnail: HighlightStyle,
}

impl SchematicStyles {
    pub fn from_record(record: &SchematicRecord, config: &ViewerConfig) -> Self {
        Self {
            main: HighlightStyle::parse(
                &record.main_highlight_color,
                &record.main_highlight_opacity,
                config,
            ),
            thumbnail: HighlightStyle::parse(
                &record.thumbnail_highlight_color,
                &record.thumbnail_highlight_opacity,
                config,
            ),
        }
    }
}

/// One highlight rectangle ready to paint over the live view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayQuad {
    /// Container coordinates.
    pub rect: Rect,
    pub color: Color,
    /// Effective opacity, already multiplied by the blink factor.
    pub opacity: f64,
}

/// Quads for the displayed schematic. Nothing is produced without an index
/// or before the bitmap size is known.
pub fn overlay_quads(
    index: Option<&HighlightIndex>,
    view: &ViewTransform,
    style: HighlightStyle,
    blink_multiplier: f64,
) -> Vec<OverlayQuad> {
    let Some(index) = index else {
        return Vec::new();
    };

    let opacity = style.effective_opacity(blink_multiplier);
    index
        .rects()
        .iter()
        .filter_map(|r| view.image_rect_to_container(*r))
        .map(|rect| OverlayQuad {
            rect,
            color: style.color,
            opacity,
        })
        .collect()
}

/// Downscales `source` to at most `max_width` pixels wide. Never upscales.
pub fn create_scaled_thumbnail(source: &RgbaImage, max_width: u32) -> RgbaImage {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return RgbaImage::new(1, 1);
    }

    let scale = (f64::from(max_width) / f64::from(width)).min(1.0);
    let tw = ((f64::from(width) * scale) as u32).max(1);
    let th = ((f64::from(height) * scale) as u32).max(1);

    if (tw, th) == (width, height) {
        return source.clone();
    }

    imageops::resize(source, tw, th, FilterType::Triangle)
}

/// Source-over blend of `color` at `opacity` into every pixel of `rect`
/// (pixel coordinates, clipped to the image).
pub fn blend_rect(target: &mut RgbaImage, rect: Rect, color: Color, opacity: f64) {
    let alpha = f64::from(color.a) / 255.0 * opacity.clamp(0.0, 1.0);
    if alpha <= 0.0 || rect.is_empty() {
        return;
    }

    let (width, height) = target.dimensions();
    let x0 = rect.left().floor().max(0.0) as u32;
    let y0 = rect.top().floor().max(0.0) as u32;
    let x1 = (rect.right().ceil().max(0.0) as u32).min(width);
    let y1 = (rect.bottom().ceil().max(0.0) as u32).min(height);

    let src = [f64::from(color.r), f64::from(color.g), f64::from(color.b)];
    for y in y0..y1 {
        for x in x0..x1 {
            let Rgba(px) = *target.get_pixel(x, y);
            let mut out = [0u8; 4];
            for c in 0..3 {
                out[c] = (f64::from(px[c]) * (1.0 - alpha) + src[c] * alpha).round() as u8;
            }
            out[3] = (f64::from(px[3]) + (255.0 - f64::from(px[3])) * alpha).round() as u8;
            target.put_pixel(x, y, Rgba(out));
        }
    }
}

/// Bakes the highlight rectangles into a copy of `base`.
///
/// `original_size` is the pixel size of the full-resolution image the index
/// coordinates refer to; rectangles are rescaled into the thumbnail's space.
pub fn create_highlighted_thumbnail(
    base: &RgbaImage,
    original_size: (u32, u32),
    index: &HighlightIndex,
    style: HighlightStyle,
    opacity_multiplier: f64,
) -> RgbaImage {
    let mut result = base.clone();
    let (ow, oh) = original_size;
    if ow == 0 || oh == 0 {
        return result;
    }

    let (tw, th) = base.dimensions();
    let sx = f64::from(tw) / f64::from(ow);
    let sy = f64::from(th) / f64::from(oh);
    let opacity = style.effective_opacity(opacity_multiplier);

    for r in index.rects() {
        let scaled = Rect::new(r.x * sx, r.y * sy, r.width * sx, r.height * sy);
        blend_rect(&mut result, scaled, style.color, opacity);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_full_opacity_replaces_pixel() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        blend_rect(
            &mut img,
            Rect::new(1.0, 1.0, 2.0, 2.0),
            Color::rgb(200, 100, 50),
            1.0,
        );
        assert_eq!(img.get_pixel(1, 1), &Rgba([200, 100, 50, 255]));
        assert_eq!(img.get_pixel(2, 2), &Rgba([200, 100, 50, 255]));
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(3, 3), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_blend_clips_to_image() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 255]));
        blend_rect(
            &mut img,
            Rect::new(-5.0, -5.0, 100.0, 100.0),
            Color::rgb(110, 110, 110),
            0.5,
        );
        assert_eq!(img.get_pixel(1, 1), &Rgba([60, 60, 60, 255]));
    }

    #[test]
    fn test_zero_opacity_is_noop() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let before = img.clone();
        blend_rect(&mut img, Rect::new(0.0, 0.0, 2.0, 2.0), Color::INDIAN_RED, 0.0);
        assert_eq!(img, before);
    }
}
