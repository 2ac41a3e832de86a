//! The primary genome-driven animation, including the sound-reactive slot.
//!
//! Per LED: a travelling/standing sinusoidal brightness wave across the strip
//! (spatial frequency `cd_period`, temporal phase from the wall clock and τ),
//! and a hue taken from a triangular lookup table sampled at the LED's wheel
//! position plus the rotating offset, then squeezed into the genome's hue
//! span. The triangular table gives narrow-span genomes a smooth travelling
//! wave instead of a hard sawtooth seam.

use core::f32::consts::TAU;

use crate::color::{hsv_to_rgb, map_linear};
use crate::genome::{Genome, GenomeTraits};
use crate::pins::LED_COUNT;
use crate::render::{set_pixel, FrameBuffer};

/// Brightness floor for the sound-reactive slot, so sound troughs dim the
/// strip instead of blacking it out.
const SOUND_FLOOR: f32 = 0.2;

/// Triangular hue-position table: one full up/down sweep across 24 entries.
const TRI_TABLE: [u8; 24] = [
    0, 21, 42, 63, 85, 106, 127, 148, 170, 191, 212, 233, 255, 233, 212, 191, 170, 148, 127, 106,
    85, 63, 42, 21,
];

/// Sample the triangular table at wheel position `pos` (0–255) with linear
/// interpolation between adjacent entries.
fn tri_sample(pos: u8) -> u8 {
    let scaled = usize::from(pos) * TRI_TABLE.len(); // 8.8 fixed point
    let idx = scaled / 256;
    let frac = (scaled % 256) as i32;
    let a = i32::from(TRI_TABLE[idx]);
    let b = i32::from(TRI_TABLE[(idx + 1) % TRI_TABLE.len()]);
    (a + (b - a) * frac / 256) as u8
}

/// Render one frame of the genome animation.
///
/// Pure with respect to its inputs: identical arguments produce a
/// byte-identical frame.
#[allow(clippy::too_many_arguments)]
pub fn render(
    frame: &mut FrameBuffer,
    genome: &Genome,
    traits: &GenomeTraits,
    sound_reactive: bool,
    smooth_sound_level: f32,
    brightness: u8,
    loop_counter: u8,
    now_ms: u32,
) {
    let period = traits.period_ms.max(1);
    let anim = TAU * (now_ms % period) as f32 / period as f32;

    // Hue rotation offset, mod-256 by construction.
    let rot = loop_counter.wrapping_mul(genome.hue_rate);

    // Single-LED strips must not divide by zero in the spatial term.
    let spatial_denom = (LED_COUNT - 1).max(1) as f32;

    for i in 0..LED_COUNT {
        // Wheel position: linear around the strip, rotated over time.
        let base_pos = (i * 256 / LED_COUNT) as u8;
        let pos = if traits.reverse_hue_rotation {
            base_pos.wrapping_sub(rot)
        } else {
            base_pos.wrapping_add(rot)
        };
        let tri = tri_sample(pos);
        let hue = map_linear(
            i32::from(tri),
            0,
            255,
            i32::from(genome.hue_base),
            i32::from(genome.hue_bound),
        ) as u8;

        // Standing/travelling sinusoidal brightness wave.
        let spatial = TAU * f32::from(genome.cd_period) * i as f32 / spatial_denom;
        let phase = if traits.reverse_direction {
            spatial - anim
        } else {
            spatial + anim
        };
        let mut value = (127.0 * (1.0 + phase.cos())) as u32;

        if traits.quadratic_gamma {
            value = value * value / 256;
        }

        let v = if sound_reactive {
            (smooth_sound_level.max(SOUND_FLOOR) * f32::from(brightness) * value as f32 / 255.0)
                as u8
        } else {
            (value * u32::from(brightness) / 255) as u8
        };

        let (r, g, b) = hsv_to_rgb(hue, genome.sat, v);
        set_pixel(frame, i, r, g, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_genome() -> Genome {
        Genome {
            cd_period: 2,
            cd_rate: 100,
            cd_dir: 0,
            sat: 200,
            hue_base: 30,
            hue_bound: 120,
            hue_rate: 3,
            hue_dir: 0,
            nonlin: 0,
            name: heapless::String::new(),
        }
    }

    #[test]
    fn render_is_deterministic() {
        let g = test_genome();
        let t = GenomeTraits::derive(&g);
        let mut a = [0u8; LED_COUNT * 3];
        let mut b = [0u8; LED_COUNT * 3];
        render(&mut a, &g, &t, false, 0.0, 191, 42, 123_456);
        render(&mut b, &g, &t, false, 0.0, 191, 42, 123_456);
        assert_eq!(a, b);
    }

    #[test]
    fn hue_stays_inside_genome_span() {
        // With zero saturation the RGB channels equal the value, so check the
        // hue path directly through tri_sample + map_linear instead.
        let g = test_genome();
        for pos in 0u8..=255 {
            let tri = tri_sample(pos);
            let hue = map_linear(
                i32::from(tri),
                0,
                255,
                i32::from(g.hue_base),
                i32::from(g.hue_bound),
            );
            assert!(
                (i32::from(g.hue_base)..=i32::from(g.hue_bound)).contains(&hue),
                "hue {hue} escaped span"
            );
        }
    }

    #[test]
    fn tri_table_is_continuous() {
        for pos in 0u8..255 {
            let a = i32::from(tri_sample(pos));
            let b = i32::from(tri_sample(pos + 1));
            assert!((a - b).abs() <= 2, "tri jump at {pos}: {a} -> {b}");
        }
        // Wrap seam.
        let last = i32::from(tri_sample(255));
        let first = i32::from(tri_sample(0));
        assert!((last - first).abs() <= 22);
    }

    #[test]
    fn quadratic_gamma_darkens_midtones() {
        let mut g = test_genome();
        g.sat = 0; // grey output: channels carry the raw value
        let t = GenomeTraits::derive(&g);
        let mut plain = [0u8; LED_COUNT * 3];
        render(&mut plain, &g, &t, false, 0.0, 255, 0, 500);

        g.nonlin = 200;
        let t = GenomeTraits::derive(&g);
        let mut gamma = [0u8; LED_COUNT * 3];
        render(&mut gamma, &g, &t, false, 0.0, 255, 0, 500);

        for i in 0..LED_COUNT * 3 {
            assert!(gamma[i] <= plain[i], "gamma brightened byte {i}");
        }
    }

    #[test]
    fn sound_reactive_floor_prevents_blackout() {
        let g = test_genome();
        let t = GenomeTraits::derive(&g);
        let mut silent = [0u8; LED_COUNT * 3];
        let mut floored = [0u8; LED_COUNT * 3];
        // A dead-silent smooth level and the floor value must render
        // identically: the floor is the effective minimum.
        render(&mut silent, &g, &t, true, 0.0, 255, 7, 1000);
        render(&mut floored, &g, &t, true, SOUND_FLOOR, 255, 7, 1000);
        assert_eq!(silent, floored);
    }

    #[test]
    fn reverse_direction_mirrors_animation() {
        let mut g = test_genome();
        let fwd = GenomeTraits::derive(&g);
        g.cd_dir = 200;
        let rev = GenomeTraits::derive(&g);
        assert!(!fwd.reverse_direction);
        assert!(rev.reverse_direction);

        let mut a = [0u8; LED_COUNT * 3];
        let mut b = [0u8; LED_COUNT * 3];
        // At anim phase 0 the temporal term vanishes, so both directions
        // agree; later they diverge.
        render(&mut a, &g, &fwd, false, 0.0, 255, 0, 0);
        render(&mut b, &g, &rev, false, 0.0, 255, 0, 0);
        assert_eq!(a, b);

        render(&mut a, &g, &fwd, false, 0.0, 255, 0, 900);
        render(&mut b, &g, &rev, false, 0.0, 255, 0, 900);
        assert_ne!(a, b);
    }
}
