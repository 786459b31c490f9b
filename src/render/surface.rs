use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::raster::RasterImage;
use crate::paint::Paint;
use crate::render::composite::BlendMode;

/// Winding rule used to fill paths.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum FillRule {
    /// Non-zero winding.
    #[default]
    NonZero,
    /// Even-odd.
    EvenOdd,
}

/// Shape drawn at open path ends.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Semicircle around the endpoint.
    Round,
    /// Flat end extended by half the line width.
    Square,
}

/// Shape drawn at path corners.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

/// Stroke parameters, in user space.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width.
    pub width: f64,
    /// End cap.
    pub cap: LineCap,
    /// Corner join.
    pub join: LineJoin,
    /// Miter limit ratio.
    pub miter_limit: f64,
    /// Alternating dash/gap lengths; empty means solid.
    pub dash_array: SmallVec<[f64; 4]>,
    /// Offset into the dash pattern.
    pub dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash_array: SmallVec::new(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeStyle {
    /// Solid stroke of the given width.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

/// Mutable drawing state carried by every surface.
#[derive(Clone, Debug)]
pub struct GraphicsState {
    /// User-to-device transform applied to paths.
    pub transform: Affine,
    /// Device-space clip path.
    pub clip: Option<BezPath>,
    /// Paint used by fills and strokes.
    pub paint: Paint,
    /// Stroke parameters.
    pub stroke: StrokeStyle,
    /// Blend mode used to composite onto the surface.
    pub blend_mode: BlendMode,
    /// Winding rule for fills.
    pub fill_rule: FillRule,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip: None,
            paint: Paint::default(),
            stroke: StrokeStyle::default(),
            blend_mode: BlendMode::Normal,
            fill_rule: FillRule::NonZero,
        }
    }
}

/// Minimal drawing-surface contract.
///
/// The interpreter draws into transparency groups, soft masks and pattern tiles through this
/// trait exactly as it draws into a page. Higher-level operations are composed from these
/// primitives rather than added to the trait.
pub trait Surface {
    /// Fill `path` (user space) with the current paint.
    fn fill_path(&mut self, path: &BezPath);

    /// Stroke `path` (user space) with the current paint and stroke style.
    fn stroke_path(&mut self, path: &BezPath);

    /// Draw `image`, whose pixel grid is mapped to user space by `image_transform`.
    fn draw_image(&mut self, image: Arc<RasterImage>, image_transform: Affine);

    /// Fill a glyph outline placed by `glyph_transform` (glyph space to user space).
    fn draw_glyph(&mut self, outline: &BezPath, glyph_transform: Affine) {
        let saved = self.transform();
        self.set_transform(saved * glyph_transform);
        self.fill_path(outline);
        self.set_transform(saved);
    }

    /// Current user-to-device transform.
    fn transform(&self) -> Affine;
    /// Replace the user-to-device transform.
    fn set_transform(&mut self, transform: Affine);

    /// Current device-space clip.
    fn clip(&self) -> Option<&BezPath>;
    /// Replace the device-space clip; `None` removes it.
    fn set_clip(&mut self, clip: Option<BezPath>);

    /// Current paint.
    fn paint(&self) -> &Paint;
    /// Replace the paint.
    fn set_paint(&mut self, paint: Paint);

    /// Current stroke style.
    fn stroke(&self) -> &StrokeStyle;
    /// Replace the stroke style.
    fn set_stroke(&mut self, stroke: StrokeStyle);

    /// Current blend mode.
    fn blend_mode(&self) -> BlendMode;
    /// Replace the blend mode.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Current fill rule.
    fn fill_rule(&self) -> FillRule;
    /// Replace the fill rule.
    fn set_fill_rule(&mut self, rule: FillRule);

    /// Fill an axis-aligned rectangle in user space.
    fn fill_rect(&mut self, rect: Rect) {
        self.fill_path(&rect_path(rect));
    }
}

pub(crate) fn rect_path(rect: Rect) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((rect.x0, rect.y0));
    p.line_to((rect.x1, rect.y0));
    p.line_to((rect.x1, rect.y1));
    p.line_to((rect.x0, rect.y1));
    p.close_path();
    p
}
