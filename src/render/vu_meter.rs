//! VU meter overlay — the sound level as a needle up the heart outline.
//!
//! Shares the gauge fill order with the battery overlay, but colours come
//! from the active genome's hue rotation rather than a fixed gradient. The
//! needle height follows the asymmetric-smoothed sound scalar (jumps on
//! transients, falls gracefully); the lit intensity follows the
//! brightness-modulation scalar.

use crate::color::wheel;
use crate::genome::Genome;
use crate::render::{set_pixel, FrameBuffer, FILL_LEVELS, FILL_ORDER};

/// Intensity clamp for the smoothed sound scalar.
const LEVEL_FLOOR: f32 = 0.2;
const LEVEL_CEILING: f32 = 1.0;

/// Per-level brightness ramp: 70 % at the bottom up to 100 % at the top.
const RAMP_BASE: f32 = 0.7;
const RAMP_SPAN: f32 = 0.3;

/// `needle` is the asymmetric-smoothed display scalar driving how many
/// levels light; `intensity` is the brightness-modulation scalar scaling how
/// hard they light.
pub fn render(frame: &mut FrameBuffer, genome: &Genome, needle: f32, intensity: f32, brightness: u8) {
    let lit_levels = (needle.clamp(0.0, 1.0) * FILL_LEVELS as f32).ceil() as usize;
    let intensity = intensity.clamp(LEVEL_FLOOR, LEVEL_CEILING);

    for (lvl, &(left, right)) in FILL_ORDER.iter().enumerate() {
        let (r, g, b) = if lvl < lit_levels {
            let hue = genome
                .hue_base
                .wrapping_add((lvl as u8).wrapping_mul(genome.hue_rate));
            let (wr, wg, wb) = wheel(hue);
            let ramp = RAMP_BASE + RAMP_SPAN * lvl as f32 / (FILL_LEVELS - 1) as f32;
            let scale =
                f32::from(genome.sat) / 255.0 * ramp * intensity * f32::from(brightness) / 255.0;
            (
                (f32::from(wr) * scale) as u8,
                (f32::from(wg) * scale) as u8,
                (f32::from(wb) * scale) as u8,
            )
        } else {
            (0, 0, 0)
        };
        set_pixel(frame, left, r, g, b);
        if right != left {
            set_pixel(frame, right, r, g, b);
        }
    }
}
