// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use schematic_viewer::geometry::content_rect;
use schematic_viewer::view::{clamp_matrix, ZoomLimits};
use schematic_viewer::{Affine, Point, Rect, Size, ViewTransform, ZoomDirection, ZoomOutcome};

const EPS: f64 = 1e-9;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < EPS, "{a} != {b}");
}

fn assert_matrix_close(a: Affine, b: Affine) {
    assert_close(a.m11, b.m11);
    assert_close(a.m12, b.m12);
    assert_close(a.m21, b.m21);
    assert_close(a.m22, b.m22);
    assert_close(a.dx, b.dx);
    assert_close(a.dy, b.dy);
}

fn view_with_image(container: Size, image: Size) -> ViewTransform {
    let mut view = ViewTransform::new(ZoomLimits::default());
    view.set_container_size(container);
    view.set_image_size(Some(image));
    view
}

#[test]
fn test_invert_round_trip() {
    let matrices = [
        Affine::IDENTITY,
        Affine::scale(2.5, 2.5),
        Affine::scale_about(Point::new(120.0, 80.0), 1.5).then(Affine::translate(-30.0, 12.0)),
        Affine::translate(5.0, -7.0).then(Affine::scale(0.25, 0.25)),
    ];
    let points = [
        Point::new(0.0, 0.0),
        Point::new(399.5, 12.25),
        Point::new(-50.0, 1000.0),
    ];

    for m in matrices {
        let inverse = m.invert().unwrap();
        for p in points {
            let back = inverse.apply(m.apply(p));
            assert_close(back.x, p.x);
            assert_close(back.y, p.y);
        }
    }
}

#[test]
fn test_singular_matrix_is_not_invertible() {
    let m = Affine::scale(0.0, 1.0);
    assert!(m.invert().is_err());
}

#[test]
fn test_clamp_is_idempotent() {
    let container = Size::new(800.0, 600.0);
    let content = content_rect(container, 2.0);
    let matrices = [
        Affine::IDENTITY,
        Affine::scale(3.0, 3.0).then(Affine::translate(250.0, -900.0)),
        Affine::scale(3.0, 3.0).then(Affine::translate(-5000.0, 400.0)),
        Affine::scale(0.5, 0.5).then(Affine::translate(37.0, 91.0)),
        Affine::scale(1.5, 1.5),
    ];

    for m in matrices {
        let once = clamp_matrix(m, container, content);
        let twice = clamp_matrix(once, container, content);
        assert_matrix_close(once, twice);
        assert_close(once.scale_factor(), m.scale_factor());
    }
}

#[test]
fn test_short_content_is_top_aligned() {
    let container = Size::new(800.0, 600.0);
    // A 2:1 image leaves bars above and below at identity
    let content = content_rect(container, 2.0);
    assert_close(content.y, 100.0);

    for scale in [1.0, 0.9, 0.75, 0.5, 0.1] {
        let m = Affine::scale(scale, scale).then(Affine::translate(13.0, 250.0));
        let shown = clamp_matrix(m, container, content).transform_rect(content);
        assert_close(shown.top(), 0.0);
        // Narrower content is centered horizontally
        if shown.width < container.width {
            assert_close(shown.left(), (container.width - shown.width) / 2.0);
        }
    }
}

#[test]
fn test_wide_content_leaves_no_gap() {
    let container = Size::new(800.0, 600.0);
    let content = content_rect(container, 800.0 / 600.0);

    let m = Affine::scale(2.0, 2.0).then(Affine::translate(300.0, 0.0));
    let shown = clamp_matrix(m, container, content).transform_rect(content);
    assert_close(shown.left(), 0.0);

    let m = Affine::scale(2.0, 2.0).then(Affine::translate(-2000.0, -2000.0));
    let shown = clamp_matrix(m, container, content).transform_rect(content);
    assert_close(shown.right(), container.width);
    assert_close(shown.bottom(), container.height);
}

#[test]
fn test_zoom_out_below_minimum_snaps_to_identity() {
    let mut view = view_with_image(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0));
    assert_eq!(view.matrix().scale_factor(), 1.0);

    let outcome = view.zoom(Point::new(123.0, 456.0), ZoomDirection::Out);
    assert_eq!(outcome, ZoomOutcome::Reset);
    assert_eq!(view.matrix(), Affine::IDENTITY);
}

#[test]
fn test_zoom_in_keeps_cursor_anchored() {
    let mut view = view_with_image(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0));
    let cursor = Point::new(400.0, 300.0);
    let before = view.to_image_pixel(cursor).unwrap();

    assert_eq!(view.zoom(cursor, ZoomDirection::In), ZoomOutcome::Zoomed);
    assert_close(view.matrix().scale_factor(), 1.5);

    let after = view.to_image_pixel(cursor).unwrap();
    assert_close(after.x, before.x);
    assert_close(after.y, before.y);

    assert_eq!(view.zoom(cursor, ZoomDirection::Out), ZoomOutcome::Zoomed);
    assert_close(view.matrix().scale_factor(), 1.0);
}

#[test]
fn test_zoom_beyond_maximum_is_rejected() {
    let mut view = view_with_image(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0));
    let cursor = Point::new(10.0, 10.0);

    // 1.5^7 is about 17.1, the eighth step would pass 20
    for _ in 0..7 {
        assert_eq!(view.zoom(cursor, ZoomDirection::In), ZoomOutcome::Zoomed);
    }
    let scale = view.matrix().scale_factor();
    assert_eq!(view.zoom(cursor, ZoomDirection::In), ZoomOutcome::Rejected);
    assert_eq!(view.matrix().scale_factor(), scale);
}

#[test]
fn test_zoom_without_container_is_ignored() {
    let mut view = ViewTransform::default();
    assert_eq!(
        view.zoom(Point::new(0.0, 0.0), ZoomDirection::In),
        ZoomOutcome::Ignored
    );
    assert!(!ZoomOutcome::Ignored.needs_redraw());
    assert!(ZoomOutcome::Reset.needs_redraw());
}

#[test]
fn test_pan_is_clamped() {
    let mut view = view_with_image(Size::new(800.0, 600.0), Size::new(800.0, 600.0));
    view.zoom(Point::new(400.0, 300.0), ZoomDirection::In);

    view.begin_pan(Point::new(100.0, 100.0));
    assert!(view.is_panning());
    assert!(view.pan_to(Point::new(5000.0, 5000.0)));

    let shown = view.matrix().transform_rect(view.content_rect());
    assert_close(shown.left(), 0.0);
    assert_close(shown.top(), 0.0);

    assert!(view.end_pan());
    assert!(!view.pan_to(Point::new(0.0, 0.0)));
}

#[test]
fn test_resize_reclamps_only_on_change() {
    let mut view = view_with_image(Size::new(800.0, 600.0), Size::new(1600.0, 800.0));
    assert!(!view.set_container_size(Size::new(800.0, 600.0)));
    assert!(view.set_container_size(Size::new(1000.0, 600.0)));

    let shown = view.matrix().transform_rect(view.content_rect());
    assert_close(shown.top(), 0.0);
}

#[test]
fn test_image_pixel_mapping() {
    let view = view_with_image(Size::new(800.0, 400.0), Size::new(1600.0, 800.0));

    let pixel = view.to_image_pixel(Point::new(400.0, 200.0)).unwrap();
    assert_close(pixel.x, 800.0);
    assert_close(pixel.y, 400.0);

    let rect = view
        .image_rect_to_container(Rect::new(100.0, 50.0, 200.0, 100.0))
        .unwrap();
    assert_close(rect.x, 50.0);
    assert_close(rect.y, 25.0);
    assert_close(rect.width, 100.0);
    assert_close(rect.height, 50.0);

    assert!(view.to_image_pixel(Point::new(900.0, 10.0)).is_none());
}

#[test]
fn test_zero_container_is_ignored() {
    let mut view = view_with_image(Size::new(800.0, 600.0), Size::new(1600.0, 800.0));
    let before = view.matrix();

    assert!(!view.set_container_size(Size::new(0.0, 600.0)));
    assert_eq!(view.container(), Size::new(800.0, 600.0));
    assert_eq!(view.matrix(), before);
}
