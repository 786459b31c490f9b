use std::fmt;
use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::CompositeResult;
use crate::foundation::raster::RasterImage;
use crate::paint::{ImagePaint, Paint, PaintSampler};
use crate::render::composite::{BlendMode, composite_pixel};
use crate::render::coverage::{Coverage, CoverageRasterizer};
use crate::render::surface::{FillRule, GraphicsState, StrokeStyle, Surface, rect_path};

/// Decides, from the current user-to-device transform, whether a draw call paints anything.
///
/// Installed to skip content that a caller knows is irrelevant (for example glyph runs hidden
/// by a text render mode). Rejected draws are dropped silently.
pub type DrawPredicate = Arc<dyn Fn(&Affine) -> bool + Send + Sync>;

/// CPU surface backed by an owned straight-alpha RGBA8 raster.
pub struct RasterSurface {
    target: RasterImage,
    state: GraphicsState,
    rasterizer: CoverageRasterizer,
    draw_predicate: Option<DrawPredicate>,
    blended: bool,
}

impl RasterSurface {
    /// Transparent surface of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> CompositeResult<Self> {
        Self::from_image(RasterImage::new(width, height))
    }

    /// Surface drawing onto an existing raster.
    pub fn from_image(target: RasterImage) -> CompositeResult<Self> {
        let rasterizer = CoverageRasterizer::new(target.width(), target.height())?;
        tracing::trace!(
            width = target.width(),
            height = target.height(),
            "raster surface created"
        );
        Ok(Self {
            target,
            state: GraphicsState::default(),
            rasterizer,
            draw_predicate: None,
            blended: false,
        })
    }

    /// Install a predicate consulted before every draw call.
    pub fn with_draw_predicate(mut self, predicate: DrawPredicate) -> Self {
        self.draw_predicate = Some(predicate);
        self
    }

    /// Replace or remove the draw predicate.
    pub fn set_draw_predicate(&mut self, predicate: Option<DrawPredicate>) {
        self.draw_predicate = predicate;
    }

    /// Pixels drawn so far.
    pub fn image(&self) -> &RasterImage {
        &self.target
    }

    /// Consume the surface and return its raster.
    pub fn into_image(self) -> RasterImage {
        self.target
    }

    /// Full drawing state.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Whether any draw so far used a blend mode other than `Normal`.
    pub fn used_blending(&self) -> bool {
        self.blended
    }

    fn accepts_draw(&mut self) -> bool {
        if let Some(pred) = &self.draw_predicate
            && !pred(&self.state.transform)
        {
            return false;
        }
        if self.state.blend_mode.is_blending() {
            self.blended = true;
        }
        true
    }
}

fn paint_coverage(
    target: &mut RasterImage,
    coverage: &Coverage<'_>,
    sampler: &PaintSampler<'_>,
    mode: BlendMode,
) {
    let Some(region) = coverage.region() else {
        return;
    };
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            let c = coverage.at(x, y);
            if c == 0 {
                continue;
            }
            let src = sampler.sample(x, y);
            if src.a == 0 {
                continue;
            }
            let dst = target.pixel(x, y);
            target.set_pixel(x, y, composite_pixel(dst, src, c, mode));
        }
    }
}

impl Surface for RasterSurface {
    fn fill_path(&mut self, path: &BezPath) {
        if !self.accepts_draw() {
            return;
        }
        let state = &self.state;
        let sampler = state.paint.sampler(state.transform);
        let coverage = self
            .rasterizer
            .fill(path, state.transform, state.fill_rule, state.clip.as_ref());
        paint_coverage(&mut self.target, &coverage, &sampler, state.blend_mode);
    }

    fn stroke_path(&mut self, path: &BezPath) {
        if !self.accepts_draw() {
            return;
        }
        let state = &self.state;
        let sampler = state.paint.sampler(state.transform);
        let coverage = self.rasterizer.stroke(
            path,
            state.transform,
            &state.stroke,
            state.clip.as_ref(),
        );
        paint_coverage(&mut self.target, &coverage, &sampler, state.blend_mode);
    }

    fn draw_image(&mut self, image: Arc<RasterImage>, image_transform: Affine) {
        let bounds = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
        let outline = image_transform * rect_path(bounds);
        let saved = std::mem::replace(
            &mut self.state.paint,
            Paint::Image(ImagePaint::new(image, image_transform)),
        );
        self.fill_path(&outline);
        self.state.paint = saved;
    }

    fn transform(&self) -> Affine {
        self.state.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    fn clip(&self) -> Option<&BezPath> {
        self.state.clip.as_ref()
    }

    fn set_clip(&mut self, clip: Option<BezPath>) {
        self.state.clip = clip;
    }

    fn paint(&self) -> &Paint {
        &self.state.paint
    }

    fn set_paint(&mut self, paint: Paint) {
        self.state.paint = paint;
    }

    fn stroke(&self) -> &StrokeStyle {
        &self.state.stroke
    }

    fn set_stroke(&mut self, stroke: StrokeStyle) {
        self.state.stroke = stroke;
    }

    fn blend_mode(&self) -> BlendMode {
        self.state.blend_mode
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend_mode = mode;
    }

    fn fill_rule(&self) -> FillRule {
        self.state.fill_rule
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.state.fill_rule = rule;
    }
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("size", &self.target.dimensions())
            .field("state", &self.state)
            .field("has_draw_predicate", &self.draw_predicate.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster_surface.rs"]
mod tests;
