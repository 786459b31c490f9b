//! Paint sources sampled per device pixel by the raster pipeline.

pub(crate) mod image_paint;
pub(crate) mod mask;
pub(crate) mod soft_mask;
pub(crate) mod transfer;

use std::sync::Arc;

use crate::foundation::core::{Affine, Point, Rgba8};
use crate::foundation::math::is_degenerate;
use crate::foundation::raster::RasterImage;
use crate::pattern::tiling::TilingPaint;

pub use self::image_paint::ImagePaint;
pub use self::mask::{alpha_mask, luminosity_mask};
pub use self::soft_mask::{SoftMaskParams, SoftMaskPaint};
pub use self::transfer::{
    ExponentialTransfer, FnTransfer, IdentityTransfer, SampledTransfer, TransferFunction,
};

/// Closed set of paints a surface can draw with.
#[derive(Clone, Debug)]
pub enum Paint {
    /// A single straight-alpha color.
    Solid(Rgba8),
    /// An affine-mapped raster image.
    Image(ImagePaint),
    /// Another paint whose alpha is modulated by a soft mask.
    SoftMask(Arc<SoftMaskPaint>),
    /// A repeating pattern tile.
    Tiling(TilingPaint),
}

impl Default for Paint {
    fn default() -> Self {
        Self::Solid(Rgba8::BLACK)
    }
}

impl From<Rgba8> for Paint {
    fn from(c: Rgba8) -> Self {
        Self::Solid(c)
    }
}

impl From<SoftMaskPaint> for Paint {
    fn from(p: SoftMaskPaint) -> Self {
        Self::SoftMask(Arc::new(p))
    }
}

impl From<TilingPaint> for Paint {
    fn from(p: TilingPaint) -> Self {
        Self::Tiling(p)
    }
}

impl From<ImagePaint> for Paint {
    fn from(p: ImagePaint) -> Self {
        Self::Image(p)
    }
}

impl Paint {
    /// Whether every sample of this paint is fully opaque.
    ///
    /// Masked, image and pattern paints are always reported as translucent.
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::Solid(c) => c.a == 255,
            Self::Image(_) | Self::SoftMask(_) | Self::Tiling(_) => false,
        }
    }

    /// Color of the paint at device pixel `(px, py)` under transform `ctm`.
    ///
    /// Tiling paints carry their own placement and ignore `ctm`. Resolves the transform on
    /// every call; the raster pipeline resolves it once per draw.
    pub fn sample_at(&self, ctm: Affine, px: u32, py: u32) -> Rgba8 {
        self.sampler(ctm).sample(px, py)
    }

    /// Resolve everything that depends on the current transform once per draw call.
    pub(crate) fn sampler(&self, ctm: Affine) -> PaintSampler<'_> {
        match self {
            Self::Solid(c) => PaintSampler::Solid(*c),
            Self::Image(p) => {
                let to_device = ctm * p.transform();
                if is_degenerate(to_device) {
                    return PaintSampler::Transparent;
                }
                PaintSampler::Image {
                    image: p.image(),
                    inverse: to_device.inverse(),
                }
            }
            Self::Tiling(p) => match p.device_to_tile() {
                Some(inverse) => PaintSampler::Tiling { paint: p, inverse },
                None => PaintSampler::Transparent,
            },
            Self::SoftMask(m) => PaintSampler::SoftMask {
                mask: m,
                inner: Box::new(m.underlying().sampler(ctm)),
            },
        }
    }
}

/// A paint bound to one draw call's transform.
pub(crate) enum PaintSampler<'a> {
    Solid(Rgba8),
    Transparent,
    Image {
        image: &'a RasterImage,
        inverse: Affine,
    },
    Tiling {
        paint: &'a TilingPaint,
        inverse: Affine,
    },
    SoftMask {
        mask: &'a SoftMaskPaint,
        inner: Box<PaintSampler<'a>>,
    },
}

impl PaintSampler<'_> {
    pub(crate) fn sample(&self, px: u32, py: u32) -> Rgba8 {
        match self {
            Self::Solid(c) => *c,
            Self::Transparent => Rgba8::TRANSPARENT,
            Self::Image { image, inverse } => {
                let p = *inverse * pixel_center(px, py);
                image
                    .pixel_checked(p.x.floor() as i64, p.y.floor() as i64)
                    .unwrap_or(Rgba8::TRANSPARENT)
            }
            Self::Tiling { paint, inverse } => paint.sample(*inverse, px, py),
            Self::SoftMask { mask, inner } => {
                let src = inner.sample(px, py);
                mask.modulate(src, i64::from(px), i64::from(py))
            }
        }
    }
}

pub(crate) fn pixel_center(px: u32, py: u32) -> Point {
    Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5)
}

#[cfg(test)]
#[path = "../../tests/unit/paint/paint.rs"]
mod tests;
