use super::*;
use crate::foundation::core::Rect;
use crate::render::surface::rect_path;

#[test]
fn rejects_empty_and_oversized_surfaces() {
    assert!(CoverageRasterizer::new(0, 4).is_err());
    assert!(CoverageRasterizer::new(70_000, 4).is_err());
    assert!(CoverageRasterizer::new(3, 2).is_ok());
}

#[test]
fn pixel_aligned_rect_has_full_coverage_inside_only() {
    let mut r = CoverageRasterizer::new(8, 8).unwrap();
    let path = rect_path(Rect::new(2.0, 2.0, 6.0, 6.0));
    let cov = r.fill(&path, Affine::IDENTITY, FillRule::NonZero, None);
    assert_eq!(cov.at(3, 3), 255);
    assert_eq!(cov.at(2, 5), 255);
    assert_eq!(cov.at(1, 1), 0);
    assert_eq!(cov.at(6, 6), 0);
}

#[test]
fn transform_is_applied_to_path() {
    let mut r = CoverageRasterizer::new(8, 8).unwrap();
    let path = rect_path(Rect::new(0.0, 0.0, 1.0, 1.0));
    let cov = r.fill(&path, Affine::scale(4.0), FillRule::NonZero, None);
    assert_eq!(cov.at(3, 3), 255);
    assert_eq!(cov.at(4, 4), 0);
}

#[test]
fn clip_restricts_coverage() {
    let mut r = CoverageRasterizer::new(8, 8).unwrap();
    let path = rect_path(Rect::new(0.0, 0.0, 8.0, 8.0));
    let clip = rect_path(Rect::new(0.0, 0.0, 4.0, 8.0));
    let cov = r.fill(&path, Affine::IDENTITY, FillRule::NonZero, Some(&clip));
    assert_eq!(cov.at(1, 1), 255);
    assert_eq!(cov.at(6, 1), 0);
}

#[test]
fn even_odd_leaves_hole() {
    let mut r = CoverageRasterizer::new(8, 8).unwrap();
    let mut path = rect_path(Rect::new(0.0, 0.0, 8.0, 8.0));
    path.extend(rect_path(Rect::new(2.0, 2.0, 6.0, 6.0)).elements().iter().copied());
    let cov = r.fill(&path, Affine::IDENTITY, FillRule::EvenOdd, None);
    assert_eq!(cov.at(0, 0), 255);
    assert_eq!(cov.at(4, 4), 0);
    let cov = r.fill(&path, Affine::IDENTITY, FillRule::NonZero, None);
    assert_eq!(cov.at(4, 4), 255);
}

#[test]
fn stroke_covers_the_line() {
    let mut r = CoverageRasterizer::new(8, 8).unwrap();
    let mut path = BezPath::new();
    path.move_to((0.0, 4.0));
    path.line_to((8.0, 4.0));
    let cov = r.stroke(&path, Affine::IDENTITY, &StrokeStyle::new(2.0), None);
    assert_eq!(cov.at(4, 3), 255);
    assert_eq!(cov.at(4, 4), 255);
    assert_eq!(cov.at(4, 0), 0);
}

#[test]
fn coverage_region_hugs_the_path() {
    let mut r = CoverageRasterizer::new(64, 64).unwrap();
    let path = rect_path(Rect::new(10.0, 20.0, 14.0, 22.0));
    let cov = r.fill(&path, Affine::IDENTITY, FillRule::NonZero, None);
    let region = cov.region().unwrap();
    assert!(region.x0 <= 10 && region.x1 >= 14);
    assert!(region.y0 <= 20 && region.y1 >= 22);
    assert!(region.x1 - region.x0 <= 8);
    assert!(region.y1 - region.y0 <= 6);
}

#[test]
fn paths_off_the_surface_touch_nothing() {
    let mut r = CoverageRasterizer::new(8, 8).unwrap();
    let path = rect_path(Rect::new(20.0, 20.0, 30.0, 30.0));
    let cov = r.fill(&path, Affine::IDENTITY, FillRule::NonZero, None);
    assert!(cov.region().is_none());
}

#[test]
fn previous_draw_leaves_no_stale_coverage() {
    let mut r = CoverageRasterizer::new(16, 16).unwrap();
    let big = rect_path(Rect::new(0.0, 0.0, 16.0, 16.0));
    let cov = r.fill(&big, Affine::IDENTITY, FillRule::NonZero, None);
    assert_eq!(cov.at(12, 12), 255);

    let small = rect_path(Rect::new(1.0, 1.0, 3.0, 3.0));
    let cov = r.fill(&small, Affine::IDENTITY, FillRule::NonZero, None);
    assert_eq!(cov.at(2, 2), 255);
    assert_eq!(cov.at(12, 12), 0);
    assert_eq!(cov.at(5, 5), 0);

    let outside = rect_path(Rect::new(40.0, 40.0, 50.0, 50.0));
    let cov = r.fill(&outside, Affine::IDENTITY, FillRule::NonZero, None);
    assert_eq!(cov.at(2, 2), 0);
}

#[test]
fn stroke_region_includes_miter_reach() {
    let mut r = CoverageRasterizer::new(64, 64).unwrap();
    let mut path = BezPath::new();
    path.move_to((20.0, 40.0));
    path.line_to((32.0, 20.0));
    path.line_to((44.0, 40.0));
    let style = StrokeStyle::new(4.0);
    let cov = r.stroke(&path, Affine::IDENTITY, &style, None);
    let region = cov.region().unwrap();
    // The miter tip sits above the apex by up to half the width times the limit.
    assert!(region.y0 <= 20 - 2);
    assert_eq!(cov.at(32, 19), 255);
}
