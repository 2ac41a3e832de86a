//! Safety warning pattern — slow red pulse sweeping the strip in quarters.
//!
//! Shown whenever the battery supervisor forces safety mode. Unmistakably
//! different from every genome pattern: red only, one quarter segment lit at
//! a time, advancing through four phases as the pulse breathes.

use core::f32::consts::TAU;

use crate::pins::LED_COUNT;
use crate::render::{set_pixel, FrameBuffer};

/// Number of sweep segments (and phases).
const SEGMENTS: usize = 4;

pub fn render(frame: &mut FrameBuffer, loop_counter: u8, brightness: u8) {
    // One full pulse per 256-count animation loop; the active quarter
    // advances every 64 counts.
    let pulse = 127.0 * (1.0 + (TAU * f32::from(loop_counter) / 256.0).cos());
    let active_segment = usize::from(loop_counter / 64) % SEGMENTS;
    let red = (pulse * f32::from(brightness) / 255.0) as u8;

    for i in 0..LED_COUNT {
        let segment = i * SEGMENTS / LED_COUNT;
        let v = if segment == active_segment { red } else { 0 };
        set_pixel(frame, i, v, 0, 0);
    }
}
