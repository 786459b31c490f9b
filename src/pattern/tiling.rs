use std::fmt;
use std::sync::Arc;

use crate::foundation::core::{Affine, Rect, Rgba8};
use crate::foundation::error::{CompositeError, CompositeResult};
use crate::foundation::math::{is_degenerate, scale_factors, stable_ceil};
use crate::foundation::raster::RasterImage;
use crate::paint::{Paint, pixel_center};
use crate::render::raster_surface::RasterSurface;
use crate::render::surface::Surface;

/// Identity of a pattern definition in the source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(pub u64);

/// Draws one cell of a tiling pattern.
pub trait PatternContent: Send + Sync {
    /// Draw the cell in pattern space onto `surface`.
    ///
    /// `matrix` maps pattern space to the tile raster and is already installed as the
    /// surface transform.
    fn draw(&self, surface: &mut dyn Surface, matrix: Affine) -> CompositeResult<()>;
}

/// A tiling pattern definition.
#[derive(Clone)]
pub struct TilingPattern {
    /// Document identity.
    pub id: PatternId,
    /// Pattern cell bounds in pattern space; required for rendering.
    pub bbox: Option<Rect>,
    /// Horizontal distance between cells; may be negative.
    pub x_step: f64,
    /// Vertical distance between cells; may be negative.
    pub y_step: f64,
    /// Pattern space to default page space.
    pub matrix: Affine,
    /// Cell content.
    pub content: Arc<dyn PatternContent>,
}

impl fmt::Debug for TilingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TilingPattern")
            .field("id", &self.id)
            .field("bbox", &self.bbox)
            .field("x_step", &self.x_step)
            .field("y_step", &self.y_step)
            .field("matrix", &self.matrix)
            .finish_non_exhaustive()
    }
}

/// One pattern cell in the scaled pattern space. Width and height keep the sign of the step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Signed cell width.
    pub width: f64,
    /// Signed cell height.
    pub height: f64,
}

/// A rasterized pattern cell plus what is needed to place it on the page.
#[derive(Debug)]
pub struct PatternTile {
    image: RasterImage,
    anchor: AnchorRect,
    pattern_no_scale: Affine,
}

impl PatternTile {
    /// Tile pixels.
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Cell rectangle the tile covers.
    pub fn anchor(&self) -> AnchorRect {
        self.anchor
    }

    /// Pattern-to-page matrix with the scale already baked into the tile divided out.
    pub fn pattern_no_scale(&self) -> Affine {
        self.pattern_no_scale
    }

    /// Bytes held by the tile raster.
    pub fn byte_len(&self) -> usize {
        self.image.byte_len()
    }
}

/// Rasterizes one cell of a tiling pattern at device resolution.
#[derive(Clone, Copy, Debug)]
pub struct TilingPatternRenderer {
    max_tile_edge: f64,
}

impl Default for TilingPatternRenderer {
    fn default() -> Self {
        Self {
            max_tile_edge: 3000.0,
        }
    }
}

impl TilingPatternRenderer {
    /// Renderer clamping oversized cells to `max_tile_edge` on each axis.
    pub fn new(max_tile_edge: f64) -> Self {
        Self { max_tile_edge }
    }

    /// Maximum cell edge, in scaled pattern units.
    pub fn max_tile_edge(&self) -> f64 {
        self.max_tile_edge
    }

    /// Cell rectangle of `pattern` under `pattern_matrix` (pattern space to page space).
    pub fn anchor_rect(
        &self,
        pattern: &TilingPattern,
        pattern_matrix: Affine,
    ) -> CompositeResult<AnchorRect> {
        let bbox = required_bbox(pattern)?;
        let (sx, sy) = scale_factors(pattern_matrix);

        let mut x_step = pattern.x_step;
        if x_step == 0.0 {
            tracing::warn!(
                pattern = pattern.id.0,
                "tiling pattern has zero x step, using bbox width"
            );
            x_step = bbox.width();
        }
        let mut y_step = pattern.y_step;
        if y_step == 0.0 {
            tracing::warn!(
                pattern = pattern.id.0,
                "tiling pattern has zero y step, using bbox height"
            );
            y_step = bbox.height();
        }

        let mut width = x_step * sx;
        let mut height = y_step * sy;
        let max = self.max_tile_edge;
        if (width * height).abs() > max * max {
            tracing::debug!(
                pattern = pattern.id.0,
                width,
                height,
                max,
                "tiling pattern cell clamped; tile is an approximation"
            );
            width = width.abs().min(max).copysign(width);
            height = height.abs().min(max).copysign(height);
        }

        Ok(AnchorRect {
            x: bbox.x0 * sx,
            y: bbox.y0 * sy,
            width,
            height,
        })
    }

    /// Rasterize one cell of `pattern`.
    ///
    /// `initial_matrix` is the page's initial transform, `color` the paint of an uncolored
    /// pattern, and `device` the page-to-device transform whose scale fixes the tile
    /// resolution. Only the scale of the pattern matrix is applied while drawing the cell;
    /// rotation and shear are applied when the tile is sampled.
    #[tracing::instrument(skip_all, fields(pattern = pattern.id.0))]
    pub fn render(
        &self,
        pattern: &TilingPattern,
        initial_matrix: Affine,
        color: Option<Rgba8>,
        device: Affine,
    ) -> CompositeResult<PatternTile> {
        let bbox = required_bbox(pattern)?;
        let pattern_matrix = initial_matrix * pattern.matrix;
        let anchor = self.anchor_rect(pattern, pattern_matrix)?;
        let (sx, sy) = scale_factors(pattern_matrix);
        let (dsx, dsy) = scale_factors(device);
        let (width, dsx) = tile_axis(pattern.id, anchor.width, dsx.abs());
        let (height, dsy) = tile_axis(pattern.id, anchor.height, dsy.abs());

        let mut surface = RasterSurface::new(width, height)?;
        if let Some(color) = color {
            surface.set_paint(Paint::Solid(color));
        }
        let matrix = Affine::scale_non_uniform(dsx, dsy)
            * Affine::scale_non_uniform(sx.abs(), sy.abs())
            * Affine::translate((-bbox.x0, -bbox.y0));
        surface.set_transform(matrix);
        pattern.content.draw(&mut surface, matrix)?;

        let mut image = surface.into_image();
        if pattern.x_step < 0.0 {
            image.flip_horizontal();
        }
        if pattern.y_step < 0.0 {
            image.flip_vertical();
        }

        let pattern_no_scale = if sx == 0.0 || sy == 0.0 {
            pattern_matrix
        } else {
            pattern_matrix * Affine::scale_non_uniform(1.0 / sx, 1.0 / sy)
        };
        tracing::debug!(width, height, "tiling pattern tile rendered");
        Ok(PatternTile {
            image,
            anchor,
            pattern_no_scale,
        })
    }
}

fn required_bbox(pattern: &TilingPattern) -> CompositeResult<Rect> {
    pattern.bbox.ok_or_else(|| {
        CompositeError::precondition(format!(
            "tiling pattern {} has no bounding box",
            pattern.id.0
        ))
    })
}

/// Largest tile side the rasterizer can address.
const MAX_TILE_PIXELS: u32 = u16::MAX as u32;

/// Raster extent along one axis and the device scale that fits the cell into it.
fn tile_axis(pattern: PatternId, anchor_len: f64, device_scale: f64) -> (u32, f64) {
    let px = stable_ceil(anchor_len.abs() * device_scale).max(1);
    if px <= i64::from(MAX_TILE_PIXELS) {
        return (px as u32, device_scale);
    }
    tracing::debug!(
        pattern = pattern.0,
        requested = px,
        max = MAX_TILE_PIXELS,
        "tiling pattern tile side clamped; tile is an approximation"
    );
    (MAX_TILE_PIXELS, f64::from(MAX_TILE_PIXELS) / anchor_len.abs())
}

/// Paint repeating a [`PatternTile`] over the fill region.
///
/// The tile is fixed to the page: its placement comes from the device transform given at
/// construction, not from the transform of the shape being filled.
#[derive(Clone, Debug)]
pub struct TilingPaint {
    tile: Arc<PatternTile>,
    device_to_tile: Option<Affine>,
}

impl TilingPaint {
    /// Place `tile` on a surface whose page-to-device transform is `device`.
    pub fn new(tile: Arc<PatternTile>, device: Affine) -> Self {
        let device_to_tile = Self::resolve(&tile, device);
        Self {
            tile,
            device_to_tile,
        }
    }

    fn resolve(tile: &PatternTile, device: Affine) -> Option<Affine> {
        let a = tile.anchor;
        let to_device = device * tile.pattern_no_scale;
        if a.width == 0.0 || a.height == 0.0 || is_degenerate(to_device) {
            return None;
        }
        let tw = f64::from(tile.image.width());
        let th = f64::from(tile.image.height());
        Some(
            Affine::scale_non_uniform(tw / a.width.abs(), th / a.height.abs())
                * Affine::translate((-a.x, -a.y))
                * to_device.inverse(),
        )
    }

    /// The repeated tile.
    pub fn tile(&self) -> &Arc<PatternTile> {
        &self.tile
    }

    /// Device-to-tile-pixel transform, or `None` when the placement is degenerate.
    pub fn device_to_tile(&self) -> Option<Affine> {
        self.device_to_tile
    }

    pub(crate) fn sample(&self, device_to_tile: Affine, px: u32, py: u32) -> Rgba8 {
        let p = device_to_tile * pixel_center(px, py);
        let img = &self.tile.image;
        let tx = (p.x.floor() as i64).rem_euclid(i64::from(img.width()));
        let ty = (p.y.floor() as i64).rem_euclid(i64::from(img.height()));
        img.pixel(tx as u32, ty as u32)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/tiling.rs"]
mod tests;
