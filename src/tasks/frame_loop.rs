//! Frame loop — fixed ~50 Hz render cadence.
//!
//! Reads the shared-state snapshot, asks the compositor to fill the frame
//! buffer, pushes it to the strip, and advances the animation loop counter
//! (wraps at 256). A strip error is logged and the frame dropped; the loop
//! itself must never die — a dead frame loop is a badge stuck on its last
//! frame with no off switch rendered.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::adapters::time::BadgeClock;
use crate::config::BadgeConfig;
use crate::drivers::strip::StripDriver;
use crate::genome::PatternBank;
use crate::pins::LED_COUNT;
use crate::render::{Compositor, FrameBuffer, RenderMode};
use crate::state::SharedState;

pub fn run(
    shared: Arc<SharedState>,
    bank: Arc<Mutex<PatternBank>>,
    mut strip: StripDriver,
    clock: BadgeClock,
    config: &BadgeConfig,
) -> ! {
    info!("Frame loop started");
    let compositor = Compositor::new(config);
    let interval = Duration::from_millis(u64::from(config.frame_interval_ms));

    let mut frame: FrameBuffer = [0; LED_COUNT * 3];
    let mut loop_counter: u8 = 0;
    let mut last_mode: Option<RenderMode> = None;

    loop {
        let tick_start = Instant::now();
        let now_ms = clock.now_ms();

        let mode = {
            let bank = bank.lock().unwrap();
            compositor.compose(&mut frame, &bank, &shared, loop_counter, now_ms)
        };
        if last_mode != Some(mode) {
            debug!("Render mode -> {mode:?}");
            last_mode = Some(mode);
        }

        if let Err(e) = strip.push_frame(&frame) {
            warn!("Frame dropped: {e}");
        }

        loop_counter = loop_counter.wrapping_add(1);

        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
