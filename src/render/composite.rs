use crate::foundation::core::Rgba8;
use crate::foundation::error::{CompositeError, CompositeResult};
use crate::foundation::math::{mul_div255_u8, round_clamp_u8};
use crate::foundation::raster::RasterImage;

/// PDF separable blend modes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum BlendMode {
    /// Source replaces backdrop (plain source-over).
    #[default]
    Normal,
    /// `Cb * Cs`.
    Multiply,
    /// `Cb + Cs - Cb * Cs`.
    Screen,
    /// Hard light with source and backdrop swapped.
    Overlay,
    /// `min(Cb, Cs)`.
    Darken,
    /// `max(Cb, Cs)`.
    Lighten,
    /// Brighten the backdrop towards the source.
    ColorDodge,
    /// Darken the backdrop towards the source.
    ColorBurn,
    /// Multiply or screen depending on the source.
    HardLight,
    /// Soft variant of hard light.
    SoftLight,
    /// `|Cb - Cs|`.
    Difference,
    /// `Cb + Cs - 2 Cb Cs`.
    Exclusion,
}

impl BlendMode {
    /// Return `true` for any mode other than [`BlendMode::Normal`].
    pub fn is_blending(self) -> bool {
        self != Self::Normal
    }

    /// Blend one normalized channel, `cb` backdrop and `cs` source, both in `[0, 1]`.
    pub fn blend_channel(self, cb: f64, cs: f64) -> f64 {
        match self {
            Self::Normal => cs,
            Self::Multiply => cb * cs,
            Self::Screen => screen(cb, cs),
            Self::Overlay => hard_light(cs, cb),
            Self::Darken => cb.min(cs),
            Self::Lighten => cb.max(cs),
            Self::ColorDodge => {
                if cb <= 0.0 {
                    0.0
                } else if cs >= 1.0 {
                    1.0
                } else {
                    (cb / (1.0 - cs)).min(1.0)
                }
            }
            Self::ColorBurn => {
                if cb >= 1.0 {
                    1.0
                } else if cs <= 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - cb) / cs).min(1.0)
                }
            }
            Self::HardLight => hard_light(cb, cs),
            Self::SoftLight => {
                if cs <= 0.5 {
                    cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
                } else {
                    let d = if cb <= 0.25 {
                        ((16.0 * cb - 12.0) * cb + 4.0) * cb
                    } else {
                        cb.sqrt()
                    };
                    cb + (2.0 * cs - 1.0) * (d - cb)
                }
            }
            Self::Difference => (cb - cs).abs(),
            Self::Exclusion => cb + cs - 2.0 * cb * cs,
        }
    }
}

fn screen(cb: f64, cs: f64) -> f64 {
    cb + cs - cb * cs
}

fn hard_light(cb: f64, cs: f64) -> f64 {
    if cs <= 0.5 {
        cb * (2.0 * cs)
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

/// Composite `src`, attenuated by `coverage`, onto `dst` (both straight alpha).
///
/// Uses the general PDF compositing formula
/// `C = (1 - as/ar) Cb + (as/ar) ((1 - ab) Cs + ab B(Cb, Cs))`, `ar = as + ab - as ab`.
pub fn composite_pixel(dst: Rgba8, src: Rgba8, coverage: u8, mode: BlendMode) -> Rgba8 {
    let sa8 = mul_div255_u8(u16::from(src.a), u16::from(coverage));
    if sa8 == 0 {
        return dst;
    }
    if sa8 == 255 && (mode == BlendMode::Normal || dst.a == 0) {
        return src.with_alpha(255);
    }

    let sa = f64::from(sa8) / 255.0;
    let ba = f64::from(dst.a) / 255.0;
    let ra = sa + ba - sa * ba;
    let t = sa / ra;

    let channel = |cb: u8, cs: u8| -> u8 {
        let cb = f64::from(cb) / 255.0;
        let cs = f64::from(cs) / 255.0;
        let mixed = (1.0 - ba) * cs + ba * mode.blend_channel(cb, cs);
        round_clamp_u8(((1.0 - t) * cb + t * mixed) * 255.0)
    };

    Rgba8::new(
        channel(dst.r, src.r),
        channel(dst.g, src.g),
        channel(dst.b, src.b),
        round_clamp_u8(ra * 255.0),
    )
}

/// Plain source-over at full coverage.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    composite_pixel(dst, src, 255, BlendMode::Normal)
}

/// Composite `src` onto `dst` with its origin placed at `(offset_x, offset_y)`.
///
/// `opacity` is a constant alpha multiplier in `[0, 1]`; pixels of `src` that fall outside
/// `dst` are dropped.
pub fn composite_image(
    dst: &mut RasterImage,
    src: &RasterImage,
    offset_x: i64,
    offset_y: i64,
    mode: BlendMode,
    opacity: f32,
) -> CompositeResult<()> {
    if !opacity.is_finite() {
        return Err(CompositeError::validation("composite opacity must be finite"));
    }
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u8;
    if op == 0 {
        return Ok(());
    }

    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    for y in 0..src.height() {
        let dy = offset_y + i64::from(y);
        if dy < 0 || dy >= dh {
            continue;
        }
        for x in 0..src.width() {
            let dx = offset_x + i64::from(x);
            if dx < 0 || dx >= dw {
                continue;
            }
            let s = src.pixel(x, y);
            if s.a == 0 {
                continue;
            }
            let d = dst.pixel(dx as u32, dy as u32);
            dst.set_pixel(dx as u32, dy as u32, composite_pixel(d, s, op, mode));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
