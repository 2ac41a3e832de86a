//! Pure colour math for the renderer.
//!
//! Everything here is a stateless function over integer or byte inputs so the
//! render paths stay deterministic and unit-testable. The HSV conversion and
//! the three-segment wheel are kept bit-compatible with the badge's original
//! visual tuning — do not "fix" the integer truncation.

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Convert HSV to RGB.
///
/// Hue is a 0–255 wheel scaled to 360°, saturation and value are 0–255
/// fractions. Standard six-sector conversion; adjacent hues differ by a
/// bounded small delta, so sweeps stay continuous.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> Rgb {
    let hf = f32::from(h) / 255.0 * 360.0;
    let sf = f32::from(s) / 255.0;
    let vf = f32::from(v) / 255.0;

    let sector = ((hf / 60.0).floor() as i32) % 6;
    let f = hf / 60.0 - (hf / 60.0).floor();
    let p = vf * (1.0 - sf);
    let q = vf * (1.0 - f * sf);
    let t = vf * (1.0 - (1.0 - f) * sf);

    let (r, g, b) = match sector {
        0 => (vf, t, p),
        1 => (q, vf, p),
        2 => (p, vf, t),
        3 => (p, q, vf),
        4 => (t, p, vf),
        _ => (vf, p, q),
    };

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Three-segment hue wheel (red→green→blue→red), `pos` in [0, 255].
///
/// Used by the legacy/simple render paths (VU meter). Fully saturated and
/// full value; scale the result externally.
pub fn wheel(pos: u8) -> Rgb {
    if pos < 85 {
        (pos * 3, 255 - pos * 3, 0)
    } else if pos < 170 {
        let pos = pos - 85;
        (255 - pos * 3, 0, pos * 3)
    } else {
        let pos = pos - 170;
        (0, pos * 3, 255 - pos * 3)
    }
}

/// Integer linear remap of `x` from [in_lo, in_hi] to [out_lo, out_hi].
///
/// Division truncates toward zero. Callers that need the round-trip
/// `map_linear(map_linear(x, a, b, c, d), c, d, a, b) ≈ x` property rely on
/// exactly this truncation, so it must not be replaced with rounding.
pub fn map_linear(x: i32, in_lo: i32, in_hi: i32, out_lo: i32, out_hi: i32) -> i32 {
    if in_hi == in_lo {
        return out_lo;
    }
    (x - in_lo) * (out_hi - out_lo) / (in_hi - in_lo) + out_lo
}

/// Saturating 8-bit add, clamped to 255.
pub fn sat_add8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Saturating 8-bit subtract, clamped to 0.
pub fn sat_sub8(a: u8, b: u8) -> u8 {
    a.saturating_sub(b)
}
