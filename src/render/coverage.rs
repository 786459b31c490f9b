use kurbo::{PathEl, Shape};

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{CompositeError, CompositeResult};
use crate::render::surface::{FillRule, LineCap, LineJoin, StrokeStyle};

/// Anti-aliased coverage of a single path, as produced by `vello_cpu`.
///
/// Paths are rendered in opaque white; the alpha channel of the result is the coverage that
/// the paint pipeline then multiplies into the sampled paint.
pub(crate) struct CoverageRasterizer {
    width: u32,
    height: u32,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    // Pixels the previous draw may have written; everything else in the pixmap is zero.
    dirty: Option<PixelRegion>,
}

/// Device pixels `[x0, x1) x [y0, y1)` a draw can touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRegion {
    pub(crate) x0: u32,
    pub(crate) y0: u32,
    pub(crate) x1: u32,
    pub(crate) y1: u32,
}

// Anti-aliasing can spill one pixel past the exact geometry.
const AA_MARGIN: f64 = 2.0;

impl PixelRegion {
    /// Pixels of a `width x height` surface overlapped by `bounds`, or `None` when disjoint.
    ///
    /// Non-finite bounds cover the whole surface.
    pub(crate) fn from_bounds(bounds: Rect, width: u32, height: u32) -> Option<Self> {
        let finite = [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Some(Self {
                x0: 0,
                y0: 0,
                x1: width,
                y1: height,
            });
        }
        let clamp = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
        let region = Self {
            x0: clamp(bounds.x0.floor(), width),
            y0: clamp(bounds.y0.floor(), height),
            x1: clamp(bounds.x1.ceil(), width),
            y1: clamp(bounds.y1.ceil(), height),
        };
        (region.x0 < region.x1 && region.y0 < region.y1).then_some(region)
    }
}

/// Borrowed coverage mask of the last rasterized path.
pub(crate) struct Coverage<'a> {
    data: &'a [u8],
    width: u32,
    region: Option<PixelRegion>,
}

impl Coverage<'_> {
    pub(crate) fn at(&self, x: u32, y: u32) -> u8 {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[idx + 3]
    }

    /// Pixels that can carry non-zero coverage; `None` when the draw touches nothing.
    pub(crate) fn region(&self) -> Option<PixelRegion> {
        self.region
    }
}

impl CoverageRasterizer {
    pub(crate) fn new(width: u32, height: u32) -> CompositeResult<Self> {
        if width == 0 || height == 0 {
            return Err(CompositeError::precondition(format!(
                "surface must be at least 1x1, got {width}x{height}"
            )));
        }
        let w: u16 = width.try_into().map_err(|_| {
            CompositeError::precondition(format!("surface width exceeds u16: {width}"))
        })?;
        let h: u16 = height.try_into().map_err(|_| {
            CompositeError::precondition(format!("surface height exceeds u16: {height}"))
        })?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            dirty: None,
        })
    }

    pub(crate) fn fill(
        &mut self,
        path: &BezPath,
        transform: Affine,
        rule: FillRule,
        clip: Option<&BezPath>,
    ) -> Coverage<'_> {
        let cpu_path = bezpath_to_cpu(path);
        let fill = match rule {
            FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
            FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
        };
        let bounds = transform.transform_rect_bbox(path.bounding_box());
        self.render(bounds, clip, |ctx| {
            ctx.set_fill_rule(fill);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.fill_path(&cpu_path);
        })
    }

    pub(crate) fn stroke(
        &mut self,
        path: &BezPath,
        transform: Affine,
        style: &StrokeStyle,
        clip: Option<&BezPath>,
    ) -> Coverage<'_> {
        // Zero-width strokes are the thinnest line the device can draw: one device pixel.
        let (device_path, transform, width) = if style.width > 0.0 {
            (None, transform, style.width)
        } else {
            (Some(transform * path.clone()), Affine::IDENTITY, 1.0)
        };
        let path = device_path.as_ref().unwrap_or(path);
        let cpu_path = bezpath_to_cpu(path);
        // Miter joins reach furthest: half the width times the miter limit.
        let reach = 0.5 * width * style.miter_limit.max(std::f64::consts::SQRT_2);
        let bounds = transform.transform_rect_bbox(path.bounding_box().inflate(reach, reach));
        let stroke = stroke_to_cpu(style, width);
        self.render(bounds, clip, |ctx| {
            ctx.set_stroke(stroke);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.stroke_path(&cpu_path);
        })
    }

    fn render(
        &mut self,
        bounds: Rect,
        clip: Option<&BezPath>,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> Coverage<'_> {
        let mut bounds = bounds.inflate(AA_MARGIN, AA_MARGIN);
        if let Some(clip) = clip {
            bounds = bounds.intersect(clip.bounding_box().inflate(AA_MARGIN, AA_MARGIN));
        }
        let region = PixelRegion::from_bounds(bounds, self.width, self.height);

        if let Some(dirty) = self.dirty.take() {
            self.clear(dirty);
        }
        let Some(region) = region else {
            return Coverage {
                data: self.pixmap.data_as_u8_slice(),
                width: self.width,
                region: None,
            };
        };

        let ctx = &mut self.ctx;
        ctx.reset();
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        if let Some(clip) = clip {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.push_clip_layer(&bezpath_to_cpu(clip));
        }
        draw(ctx);
        if clip.is_some() {
            ctx.pop_layer();
        }
        ctx.flush();

        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.dirty = Some(region);
        Coverage {
            data: self.pixmap.data_as_u8_slice(),
            width: self.width,
            region: Some(region),
        }
    }

    fn clear(&mut self, region: PixelRegion) {
        let stride = self.width as usize * 4;
        let data = self.pixmap.data_as_u8_slice_mut();
        for y in region.y0..region.y1 {
            let row = y as usize * stride;
            data[row + region.x0 as usize * 4..row + region.x1 as usize * 4].fill(0);
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn stroke_to_cpu(style: &StrokeStyle, width: f64) -> vello_cpu::kurbo::Stroke {
    use vello_cpu::kurbo::{Cap, Join, Stroke};

    let cap = match style.cap {
        LineCap::Butt => Cap::Butt,
        LineCap::Round => Cap::Round,
        LineCap::Square => Cap::Square,
    };
    let join = match style.join {
        LineJoin::Miter => Join::Miter,
        LineJoin::Round => Join::Round,
        LineJoin::Bevel => Join::Bevel,
    };
    let stroke = Stroke::new(width)
        .with_caps(cap)
        .with_join(join)
        .with_miter_limit(style.miter_limit);
    if style.dash_array.is_empty() || style.dash_array.iter().all(|d| *d <= 0.0) {
        stroke
    } else {
        stroke.with_dashes(style.dash_offset, style.dash_array.iter().copied())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/coverage.rs"]
mod tests;
