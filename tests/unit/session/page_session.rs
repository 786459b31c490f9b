use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::foundation::core::{Rect, Rgba8};
use crate::paint::Paint;
use crate::pattern::color::DeviceRgb;
use crate::pattern::tiling::{PatternContent, PatternId};
use crate::render::raster_surface::RasterSurface;

#[derive(Default)]
struct CountingContent {
    draws: AtomicUsize,
}

impl PatternContent for CountingContent {
    fn draw(&self, surface: &mut dyn Surface, _matrix: Affine) -> CompositeResult<()> {
        self.draws.fetch_add(1, Ordering::SeqCst);
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
        Ok(())
    }
}

struct BoxFont;

impl FontSource for BoxFont {
    fn name(&self) -> &str {
        "Box"
    }

    fn has_glyph(&self, _code: u32) -> bool {
        true
    }

    fn normalized_outline(&self, _code: u32) -> anyhow::Result<BezPath> {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((1.0, 0.0));
        p.line_to((1.0, 1.0));
        p.line_to((0.0, 1.0));
        p.close_path();
        Ok(p)
    }
}

fn pattern(content: Arc<CountingContent>) -> TilingPattern {
    TilingPattern {
        id: PatternId(11),
        bbox: Some(Rect::new(0.0, 0.0, 4.0, 4.0)),
        x_step: 4.0,
        y_step: 4.0,
        matrix: Affine::IDENTITY,
        content,
    }
}

fn session() -> PageSession {
    PageSession::new(RenderOpts::default(), Affine::IDENTITY, Affine::IDENTITY).unwrap()
}

#[test]
fn invalid_opts_are_rejected() {
    let opts = RenderOpts {
        max_tile_edge: f64::NAN,
        ..RenderOpts::default()
    };
    assert!(PageSession::new(opts, Affine::IDENTITY, Affine::IDENTITY).is_err());
}

#[test]
fn tiling_paint_reuses_rendered_tile() {
    let content = Arc::new(CountingContent::default());
    let p = pattern(Arc::clone(&content));
    let mut s = session();
    let a = s.tiling_paint(&p, None).unwrap();
    let b = s.tiling_paint(&p, None).unwrap();
    assert!(Arc::ptr_eq(a.tile(), b.tile()));
    assert_eq!(content.draws.load(Ordering::SeqCst), 1);
    assert_eq!(s.pattern_cache_stats().hits, 1);
}

#[test]
fn different_colors_render_separately() {
    let content = Arc::new(CountingContent::default());
    let p = pattern(Arc::clone(&content));
    let mut s = session();
    let red = PatternColor::new(Arc::new(DeviceRgb), [1.0, 0.0, 0.0]);
    let blue = PatternColor::new(Arc::new(DeviceRgb), [0.0, 0.0, 1.0]);
    let r = s.tiling_tile(&p, Some(&red)).unwrap();
    let b = s.tiling_tile(&p, Some(&blue)).unwrap();
    assert_eq!(content.draws.load(Ordering::SeqCst), 2);
    assert_eq!(r.image().pixel(0, 0), Rgba8::opaque(255, 0, 0));
    assert_eq!(b.image().pixel(0, 0), Rgba8::opaque(0, 0, 255));
}

#[test]
fn tiling_paint_fills_a_surface() {
    let p = pattern(Arc::new(CountingContent::default()));
    let mut s = session();
    let paint = s.tiling_paint(&p, None).unwrap();

    let mut surface = RasterSurface::new(8, 8).unwrap();
    surface.set_paint(Paint::from(paint));
    surface.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0));
    let img = surface.image();
    assert_eq!(img.pixel(1, 1), Rgba8::BLACK);
    assert_eq!(img.pixel(5, 5), Rgba8::BLACK);
    assert_eq!(img.pixel(3, 1), Rgba8::TRANSPARENT);
    assert_eq!(img.pixel(6, 7), Rgba8::TRANSPARENT);
}

#[test]
fn release_session_forces_rerender() {
    let content = Arc::new(CountingContent::default());
    let p = pattern(Arc::clone(&content));
    let mut s = session();
    drop(s.tiling_paint(&p, None).unwrap());
    s.release_session();
    assert_eq!(s.pattern_cache_stats().retained_entries, 0);
    drop(s.tiling_paint(&p, None).unwrap());
    assert_eq!(content.draws.load(Ordering::SeqCst), 2);
}

#[test]
fn glyph_caches_are_per_font() {
    let f1: SharedFont = Arc::new(BoxFont);
    let f2: SharedFont = Arc::new(BoxFont);
    let mut s = session();
    s.glyph_outline(&f1, 65);
    s.glyph_outline(&f1, 65);
    s.glyph_outline(&f2, 65);
    assert_eq!(s.glyph_cache_stats(&f1).unwrap().hits, 1);
    assert_eq!(s.glyph_cache_stats(&f2).unwrap().misses, 1);

    s.release_session();
    assert!(s.glyph_cache_stats(&f1).is_none());
}

#[test]
fn show_glyphs_draws_cached_outlines() {
    let font: SharedFont = Arc::new(BoxFont);
    let mut s = session();
    let mut surface = RasterSurface::new(8, 4).unwrap();
    let glyphs = [
        (72, Affine::scale(2.0)),
        (72, Affine::translate((4.0, 0.0)) * Affine::scale(2.0)),
    ];
    s.show_glyphs(&mut surface, &font, &glyphs);
    assert_eq!(surface.image().pixel(1, 1), Rgba8::BLACK);
    assert_eq!(surface.image().pixel(5, 1), Rgba8::BLACK);
    assert_eq!(surface.image().pixel(3, 1), Rgba8::TRANSPARENT);
    assert_eq!(s.glyph_cache_stats(&font).unwrap().hits, 1);
}
