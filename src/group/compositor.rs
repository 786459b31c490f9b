use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rgba8};
use crate::foundation::error::{CompositeError, CompositeResult};
use crate::foundation::math::round_clamp_u8;
use crate::foundation::raster::RasterImage;
use crate::paint::Paint;
use crate::render::composite::{BlendMode, composite_image};
use crate::render::raster_surface::{DrawPredicate, RasterSurface};
use crate::render::surface::{FillRule, StrokeStyle, Surface};

/// Parent raster a non-isolated group is drawn against.
///
/// `(offset_x, offset_y)` is the position of the group's origin inside `image`.
#[derive(Clone, Copy, Debug)]
pub struct BackdropSpec<'a> {
    /// Parent surface pixels.
    pub image: &'a RasterImage,
    /// Horizontal offset of the group origin in `image`.
    pub offset_x: i64,
    /// Vertical offset of the group origin in `image`.
    pub offset_y: i64,
}

impl<'a> BackdropSpec<'a> {
    /// Backdrop at the given offset into `image`.
    pub fn new(image: &'a RasterImage, offset_x: i64, offset_y: i64) -> Self {
        Self {
            image,
            offset_x,
            offset_y,
        }
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        self.image
            .pixel_checked(self.offset_x + i64::from(x), self.offset_y + i64::from(y))
            .unwrap_or(Rgba8::TRANSPARENT)
    }
}

/// The two buffers of a group: `color` sees backdrop and content, `alpha` only the content.
#[derive(Clone, Debug)]
pub struct GroupBufferPair {
    /// Backdrop-seeded buffer receiving every draw.
    pub color: RasterImage,
    /// Transparent-seeded buffer receiving the same draws.
    pub alpha: RasterImage,
}

impl GroupBufferPair {
    /// Check that both buffers have the same dimensions.
    pub fn validate(&self) -> CompositeResult<()> {
        if self.color.same_size(&self.alpha) {
            return Ok(());
        }
        let (cw, ch) = self.color.dimensions();
        let (aw, ah) = self.alpha.dimensions();
        Err(CompositeError::precondition(format!(
            "group buffers differ in size: color {cw}x{ch}, alpha {aw}x{ah}"
        )))
    }
}

/// Renders one transparency group into a dual-buffer pair.
///
/// The compositor is itself a [`Surface`]: every primitive is replayed on the color buffer
/// and on the alpha buffer with identical state, so the alpha buffer ends up holding exactly
/// the coverage contributed by the group's content.
#[derive(Debug)]
pub struct TransparencyGroupCompositor {
    color: RasterSurface,
    alpha: RasterSurface,
    isolated: bool,
}

impl TransparencyGroupCompositor {
    /// Start a group of `width x height` pixels.
    ///
    /// With a backdrop the color buffer is seeded from the backdrop region (non-isolated group);
    /// without one both buffers start transparent (isolated group).
    pub fn begin(
        backdrop: Option<&BackdropSpec<'_>>,
        width: u32,
        height: u32,
    ) -> CompositeResult<Self> {
        let seed = match backdrop {
            Some(b) => b.image.region(b.offset_x, b.offset_y, width, height),
            None => RasterImage::new(width, height),
        };
        Ok(Self {
            color: RasterSurface::from_image(seed)?,
            alpha: RasterSurface::new(width, height)?,
            isolated: backdrop.is_none(),
        })
    }

    /// Install a draw predicate on both buffers.
    pub fn with_draw_predicate(mut self, predicate: DrawPredicate) -> Self {
        self.color.set_draw_predicate(Some(Arc::clone(&predicate)));
        self.alpha.set_draw_predicate(Some(predicate));
        self
    }

    /// Whether the group was started without a backdrop.
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// Whether any primitive so far used a blend mode other than `Normal`.
    pub fn used_blending(&self) -> bool {
        self.color.used_blending()
    }

    /// Backdrop-seeded buffer in its current state.
    pub fn color_buffer(&self) -> &RasterImage {
        self.color.image()
    }

    /// Content-only buffer in its current state.
    pub fn alpha_buffer(&self) -> &RasterImage {
        self.alpha.image()
    }

    /// Give up the surfaces and return the raw buffer pair.
    pub fn into_buffers(self) -> GroupBufferPair {
        GroupBufferPair {
            color: self.color.into_image(),
            alpha: self.alpha.into_image(),
        }
    }

    /// Finish the group and return the image to composite into the parent.
    ///
    /// Isolated groups and groups drawn only with `Normal` compositing return the color buffer
    /// untouched. Otherwise the backdrop contribution is removed, which requires the same
    /// backdrop the group was started with.
    #[tracing::instrument(
        skip_all,
        fields(isolated = self.isolated, blended = self.used_blending())
    )]
    pub fn finish(self, backdrop: Option<&BackdropSpec<'_>>) -> CompositeResult<RasterImage> {
        if self.isolated || !self.used_blending() {
            return Ok(self.color.into_image());
        }
        let Some(backdrop) = backdrop else {
            return Err(CompositeError::precondition(
                "non-isolated blended group finished without a backdrop",
            ));
        };
        remove_backdrop(&self.into_buffers(), backdrop)
    }

    /// Finish the group against `parent` and composite the result into it.
    ///
    /// `(offset_x, offset_y)` is the group origin in `parent`, the same offset the group was
    /// started with. Only the group's own content is composited: a non-isolated group drawn
    /// with `Normal` alone contributes its alpha buffer, which holds that content without the
    /// backdrop.
    pub fn finish_into(
        self,
        parent: &mut RasterImage,
        offset_x: i64,
        offset_y: i64,
        mode: BlendMode,
        opacity: f32,
    ) -> CompositeResult<()> {
        let result = if !self.isolated && !self.used_blending() {
            self.alpha.into_image()
        } else {
            let backdrop = BackdropSpec::new(parent, offset_x, offset_y);
            self.finish(Some(&backdrop))?
        };
        composite_image(parent, &result, offset_x, offset_y, mode, opacity)
    }
}

/// Extract the group's own color from a backdrop-seeded color buffer.
///
/// Per pixel, with `ag` the alpha of `pair.alpha` and `(C0, a0)` the backdrop pixel:
/// `C = Cn + (Cn - C0) * (a0 / ag - a0 / 255)`, alpha `ag`. Pixels with `ag == 0` come out
/// transparent; backdrop pixels outside the parent raster count as transparent.
pub fn remove_backdrop(
    pair: &GroupBufferPair,
    backdrop: &BackdropSpec<'_>,
) -> CompositeResult<RasterImage> {
    pair.validate()?;
    let (w, h) = pair.color.dimensions();
    let mut out = RasterImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let ag = pair.alpha.pixel(x, y).a;
            if ag == 0 {
                continue;
            }
            let cn = pair.color.pixel(x, y);
            let b = backdrop.pixel(x, y);
            let a0 = f64::from(b.a);
            let k = a0 / f64::from(ag) - a0 / 255.0;
            let channel = |cn: u8, c0: u8| {
                let cn = f64::from(cn);
                round_clamp_u8(cn + (cn - f64::from(c0)) * k)
            };
            out.set_pixel(
                x,
                y,
                Rgba8::new(
                    channel(cn.r, b.r),
                    channel(cn.g, b.g),
                    channel(cn.b, b.b),
                    ag,
                ),
            );
        }
    }
    Ok(out)
}

impl Surface for TransparencyGroupCompositor {
    fn fill_path(&mut self, path: &BezPath) {
        self.color.fill_path(path);
        self.alpha.fill_path(path);
    }

    fn stroke_path(&mut self, path: &BezPath) {
        self.color.stroke_path(path);
        self.alpha.stroke_path(path);
    }

    fn draw_image(&mut self, image: Arc<RasterImage>, image_transform: Affine) {
        self.color.draw_image(Arc::clone(&image), image_transform);
        self.alpha.draw_image(image, image_transform);
    }

    fn draw_glyph(&mut self, outline: &BezPath, glyph_transform: Affine) {
        self.color.draw_glyph(outline, glyph_transform);
        self.alpha.draw_glyph(outline, glyph_transform);
    }

    fn transform(&self) -> Affine {
        self.color.transform()
    }

    fn set_transform(&mut self, transform: Affine) {
        self.color.set_transform(transform);
        self.alpha.set_transform(transform);
    }

    fn clip(&self) -> Option<&BezPath> {
        self.color.clip()
    }

    fn set_clip(&mut self, clip: Option<BezPath>) {
        self.color.set_clip(clip.clone());
        self.alpha.set_clip(clip);
    }

    fn paint(&self) -> &Paint {
        self.color.paint()
    }

    fn set_paint(&mut self, paint: Paint) {
        self.color.set_paint(paint.clone());
        self.alpha.set_paint(paint);
    }

    fn stroke(&self) -> &StrokeStyle {
        self.color.stroke()
    }

    fn set_stroke(&mut self, stroke: StrokeStyle) {
        self.color.set_stroke(stroke.clone());
        self.alpha.set_stroke(stroke);
    }

    fn blend_mode(&self) -> BlendMode {
        self.color.blend_mode()
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.color.set_blend_mode(mode);
        self.alpha.set_blend_mode(mode);
    }

    fn fill_rule(&self) -> FillRule {
        self.color.fill_rule()
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.color.set_fill_rule(rule);
        self.alpha.set_fill_rule(rule);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/group/compositor.rs"]
mod tests;
