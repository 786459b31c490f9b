use kurbo::Affine;

/// Round-half-up `x * y / 255` for 8-bit operands.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Clamp to `[0, 255]` and round to the nearest integer.
pub(crate) fn round_clamp_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Ceiling that first rounds to 5 decimal places.
///
/// `10.000000001` is `10`, not `11`: floating-point noise in `step * scale` products must not
/// grow a tile by one pixel, which shows up as seams between adjacent tiles.
pub(crate) fn stable_ceil(v: f64) -> i64 {
    if !v.is_finite() {
        return 0;
    }
    let scaled = (v * 100_000.0).round() as i64;
    scaled.div_euclid(100_000) + i64::from(scaled.rem_euclid(100_000) != 0)
}

/// Per-axis scale factors of an affine transform.
///
/// Unrotated matrices report the signed diagonal entry so that mirrored patterns keep their
/// orientation; otherwise the length of the transformed unit vector is used.
pub(crate) fn scale_factors(m: Affine) -> (f64, f64) {
    let [a, b, c, d, _, _] = m.as_coeffs();
    let sx = if b != 0.0 { a.hypot(b) } else { a };
    let sy = if c != 0.0 { c.hypot(d) } else { d };
    (sx, sy)
}

/// Bit pattern of a float suitable for `Eq`/`Hash`; `-0.0` folds into `0.0`, NaNs into one value.
pub(crate) fn f64_key_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

pub(crate) fn affine_key_bits(m: Affine) -> [u64; 6] {
    m.as_coeffs().map(f64_key_bits)
}

/// Rec. 601 luma of an 8-bit RGB triple, rounded.
pub(crate) fn luminosity(r: u8, g: u8, b: u8) -> u8 {
    round_clamp_u8(0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b))
}

pub(crate) fn is_degenerate(m: Affine) -> bool {
    let det = m.determinant();
    !det.is_finite() || det.abs() < 1e-12
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
