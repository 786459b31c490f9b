use std::fmt;
use std::sync::{Arc, OnceLock};

use image::GrayImage;

use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::math::{mul_div255_u8, round_clamp_u8};
use crate::paint::Paint;
use crate::paint::transfer::TransferFunction;

/// Everything that describes a soft mask independently of the paint it modulates.
#[derive(Clone)]
pub struct SoftMaskParams {
    /// Single-channel mask raster; `0` hides, `255` shows.
    pub mask: Arc<GrayImage>,
    /// Device-space rectangle whose origin locates the mask's pixel `(0, 0)`.
    pub bbox: Rect,
    /// Backdrop color of the mask group; its luminosity applies outside the mask.
    pub backdrop: Option<Rgba8>,
    /// Optional transfer function applied to mask samples.
    pub transfer: Option<Arc<dyn TransferFunction>>,
}

impl SoftMaskParams {
    /// Mask with a black backdrop and no transfer function.
    pub fn new(mask: Arc<GrayImage>, bbox: Rect) -> Self {
        Self {
            mask,
            bbox,
            backdrop: None,
            transfer: None,
        }
    }

    /// Set the backdrop color.
    pub fn with_backdrop(mut self, backdrop: Rgba8) -> Self {
        self.backdrop = Some(backdrop);
        self
    }

    /// Set the transfer function.
    pub fn with_transfer(mut self, transfer: Arc<dyn TransferFunction>) -> Self {
        self.transfer = Some(transfer);
        self
    }
}

/// Paint whose alpha is modulated per pixel by a soft mask.
///
/// Color channels of the underlying paint pass through untouched; only alpha changes:
///
/// - inside the mask raster: `a * g / 255`, or `a * f(g / 255)` with a transfer function
/// - outside, or when `f` fails: `a * bc / 255`, with `bc` the backdrop luminosity
pub struct SoftMaskPaint {
    paint: Paint,
    mask: Arc<GrayImage>,
    bbox: Rect,
    origin: (i64, i64),
    backdrop_luminosity: u8,
    transfer: Option<Arc<dyn TransferFunction>>,
    // f(g) per mask value, computed on first use; `None` records a failed evaluation.
    transfer_memo: Box<[OnceLock<Option<f64>>; 256]>,
}

impl SoftMaskPaint {
    /// Wrap `paint` with the mask described by `params`.
    ///
    /// An identity transfer function is dropped so sampling takes the direct path.
    pub fn new(paint: Paint, params: SoftMaskParams) -> Self {
        let SoftMaskParams {
            mask,
            bbox,
            backdrop,
            transfer,
        } = params;
        let transfer = transfer.filter(|f| !f.is_identity());
        Self {
            paint,
            mask,
            bbox,
            origin: (bbox.min_x().floor() as i64, bbox.min_y().floor() as i64),
            backdrop_luminosity: backdrop.map(Rgba8::luminosity).unwrap_or(0),
            transfer,
            transfer_memo: Box::new(std::array::from_fn(|_| OnceLock::new())),
        }
    }

    /// The paint being masked.
    pub fn underlying(&self) -> &Paint {
        &self.paint
    }

    /// Device-space bounding rectangle of the mask.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Luminosity used for samples outside the mask, `0..=255`.
    pub fn backdrop_luminosity(&self) -> u8 {
        self.backdrop_luminosity
    }

    /// Whether a non-identity transfer function is applied.
    pub fn has_transfer(&self) -> bool {
        self.transfer.is_some()
    }

    /// A soft-masked paint is never opaque.
    pub fn is_opaque(&self) -> bool {
        false
    }

    /// Mask value at device pixel `(px, py)`, or `None` outside the mask raster.
    pub fn mask_value(&self, px: i64, py: i64) -> Option<u8> {
        let mx = px - self.origin.0;
        let my = py - self.origin.1;
        if mx < 0
            || my < 0
            || mx >= i64::from(self.mask.width())
            || my >= i64::from(self.mask.height())
        {
            return None;
        }
        Some(self.mask.get_pixel(mx as u32, my as u32).0[0])
    }

    /// Apply the mask to `src`, the unmasked paint sample at device pixel `(px, py)`.
    pub fn modulate(&self, src: Rgba8, px: i64, py: i64) -> Rgba8 {
        let bc = u16::from(self.backdrop_luminosity);
        let sa = u16::from(src.a);
        let a = match self.mask_value(px, py) {
            Some(g) if self.transfer.is_some() => match self.transfer_value(g) {
                Some(f) => round_clamp_u8(f64::from(src.a) * f),
                None => mul_div255_u8(sa, bc),
            },
            Some(g) => mul_div255_u8(sa, u16::from(g)),
            None => mul_div255_u8(sa, bc),
        };
        src.with_alpha(a)
    }

    fn transfer_value(&self, g: u8) -> Option<f64> {
        let transfer = self.transfer.as_ref()?;
        *self.transfer_memo[usize::from(g)].get_or_init(|| {
            match transfer.eval(f64::from(g) / 255.0) {
                Ok(v) if v.is_finite() => Some(v.clamp(0.0, 1.0)),
                Ok(v) => {
                    tracing::warn!(
                        sample = g,
                        value = v,
                        "soft mask transfer function returned a non-finite value"
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!(sample = g, error = %e, "soft mask transfer function failed");
                    None
                }
            }
        })
    }
}

impl fmt::Debug for SoftMaskPaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftMaskPaint")
            .field("paint", &self.paint)
            .field("mask_size", &self.mask.dimensions())
            .field("bbox", &self.bbox)
            .field("backdrop_luminosity", &self.backdrop_luminosity)
            .field("has_transfer", &self.transfer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/soft_mask.rs"]
mod tests;
