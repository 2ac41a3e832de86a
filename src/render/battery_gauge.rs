//! Battery-level fill gauge overlay.
//!
//! Shows the charge as a red→green gauge filling up the heart outline: the
//! fill animates from empty to the charge fraction over the animation window,
//! then holds until the overlay expires. Colour comes from the fill position,
//! not the active genome.

use crate::color::hsv_to_rgb;
use crate::render::{set_pixel, FrameBuffer, FILL_LEVELS, FILL_ORDER};

/// Hue at the top of a full gauge (green); the bottom is 0 (red).
const FULL_HUE: f32 = 85.0;

/// Charge fraction in [0, 1] relative to the usable voltage window.
pub fn charge_fraction(mv: u16, off_mv: u16, max_mv: u16) -> f32 {
    if max_mv <= off_mv {
        return 0.0;
    }
    (f32::from(mv.saturating_sub(off_mv)) / f32::from(max_mv - off_mv)).clamp(0.0, 1.0)
}

pub fn render(
    frame: &mut FrameBuffer,
    mv: u16,
    off_mv: u16,
    max_mv: u16,
    elapsed_ms: u32,
    fill_anim_ms: u32,
    brightness: u8,
) {
    let target = charge_fraction(mv, off_mv, max_mv);

    // Animate the fill for the first window, then hold.
    let fill_progress = if elapsed_ms < fill_anim_ms {
        target * elapsed_ms as f32 / fill_anim_ms as f32
    } else {
        target
    };

    for (lvl, &(left, right)) in FILL_ORDER.iter().enumerate() {
        let level_start = lvl as f32 / FILL_LEVELS as f32;
        let (h, v) = if fill_progress >= level_start {
            let frac = lvl as f32 / (FILL_LEVELS - 1) as f32;
            ((frac * FULL_HUE) as u8, brightness)
        } else {
            (0, 0)
        };
        let (r, g, b) = hsv_to_rgb(h, 255, v);
        set_pixel(frame, left, r, g, b);
        if right != left {
            set_pixel(frame, right, r, g, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::LED_COUNT;

    #[test]
    fn charge_fraction_clamps() {
        assert_eq!(charge_fraction(3330, 3330, 4200), 0.0);
        assert_eq!(charge_fraction(3000, 3330, 4200), 0.0);
        assert_eq!(charge_fraction(4200, 3330, 4200), 1.0);
        assert_eq!(charge_fraction(5000, 3330, 4200), 1.0);
        let mid = charge_fraction(3765, 3330, 4200);
        assert!((mid - 0.5).abs() < 0.01);
        // Degenerate window never divides by zero.
        assert_eq!(charge_fraction(3500, 4200, 4200), 0.0);
    }

    #[test]
    fn full_battery_lights_every_level_after_animation() {
        let mut frame = [0u8; LED_COUNT * 3];
        render(&mut frame, 4200, 3330, 4200, 10_000, 2000, 255);
        for &(left, right) in &FILL_ORDER {
            let lit = |i: usize| {
                frame[i * 3] != 0 || frame[i * 3 + 1] != 0 || frame[i * 3 + 2] != 0
            };
            assert!(lit(left) && lit(right));
        }
    }

    #[test]
    fn fill_animates_from_empty() {
        let mut frame = [0u8; LED_COUNT * 3];
        // At the very start of the animation nothing above the bottom pair
        // is lit, even on a full battery.
        render(&mut frame, 4200, 3330, 4200, 0, 2000, 255);
        let (top_l, _) = FILL_ORDER[FILL_LEVELS - 1];
        assert_eq!(
            &frame[top_l * 3..top_l * 3 + 3],
            &[0, 0, 0],
            "top level lit at t=0"
        );
    }

    #[test]
    fn bottom_is_red_top_is_green() {
        let mut frame = [0u8; LED_COUNT * 3];
        render(&mut frame, 4200, 3330, 4200, 10_000, 2000, 255);
        let (bottom, _) = FILL_ORDER[0];
        let (top, _) = FILL_ORDER[FILL_LEVELS - 1];
        // GRB layout: index 0 green, 1 red.
        assert!(frame[bottom * 3 + 1] > frame[bottom * 3]);
        assert!(frame[top * 3] > frame[top * 3 + 1]);
    }

    #[test]
    fn half_charge_lights_half_the_levels() {
        let mut frame = [0u8; LED_COUNT * 3];
        render(&mut frame, 3765, 3330, 4200, 10_000, 2000, 255);
        let lit_levels = FILL_ORDER
            .iter()
            .filter(|&&(l, _)| frame[l * 3] != 0 || frame[l * 3 + 1] != 0 || frame[l * 3 + 2] != 0)
            .count();
        assert!((6..=8).contains(&lit_levels), "lit {lit_levels} levels");
    }
}
