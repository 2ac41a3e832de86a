//! Firework notification overlay.
//!
//! Played when the radio transport flags an incoming firework. Two phases:
//! a white swell over the first second, then strobing random-looking rainbow
//! sparkles fading out over the remainder. The per-LED sparkle choice is a
//! deterministic hash of LED index and strobe count, so the overlay is
//! reproducible frame-for-frame while still reading as random.

use crate::color::hsv_to_rgb;
use crate::pins::LED_COUNT;
use crate::render::{set_pixel, FrameBuffer};

/// White swell duration.
const SWELL_MS: u32 = 1000;
/// Duration of one strobe phase.
const STROBE_PHASE_MS: u32 = 60;

/// Stable per-(LED, strobe) pseudo-random word.
fn sparkle_hash(led: usize, strobe_count: u32) -> u32 {
    (led as u32)
        .wrapping_mul(167)
        .wrapping_add(strobe_count.wrapping_mul(73))
        ^ strobe_count.wrapping_mul(311)
}

pub fn render(frame: &mut FrameBuffer, elapsed_ms: u32, total_ms: u32) {
    // Phase 1: white swell.
    if elapsed_ms < SWELL_MS {
        let bright = (elapsed_ms * 255 / SWELL_MS) as u8;
        for i in 0..LED_COUNT {
            set_pixel(frame, i, bright, bright, bright);
        }
        return;
    }

    // Phase 2: strobing sparkles, fading out.
    let fade_time = total_ms.saturating_sub(SWELL_MS).max(1);
    let fade_elapsed = elapsed_ms - SWELL_MS;
    let fade = (1.0 - fade_elapsed as f32 / fade_time as f32).max(0.0);

    let strobe_count = fade_elapsed / STROBE_PHASE_MS;
    let strobe_on = strobe_count % 2 == 0;

    for i in 0..LED_COUNT {
        let prand = sparkle_hash(i, strobe_count);
        // 1-in-3 of the LEDs sparkle during an "on" phase.
        if strobe_on && prand % 3 == 0 {
            let hue = (prand % 255) as u8;
            let (r, g, b) = hsv_to_rgb(hue, 255, (fade * 255.0) as u8);
            set_pixel(frame, i, r, g, b);
        } else {
            set_pixel(frame, i, 0, 0, 0);
        }
    }
}
