//! Sound sampler task — 100 ms cadence.
//!
//! Sole writer of the sound scalars in [`SharedState`]. Feeds each dB
//! reading through the analyzer and publishes both shaped outputs. A failed
//! capture skips the frame's sound contribution rather than poisoning the
//! history.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::BadgeConfig;
use crate::sensors::microphone::Microphone;
use crate::sound::SoundAnalyzer;
use crate::state::SharedState;

pub fn run(shared: Arc<SharedState>, config: &BadgeConfig, mut mic: Microphone) -> ! {
    info!("Sound task started");
    let mut analyzer = SoundAnalyzer::new(config.sound_band_floor, config.sound_band_ceiling);
    let interval = Duration::from_millis(u64::from(config.sound_poll_interval_ms));

    loop {
        let tick_start = Instant::now();

        match mic.read_db() {
            Ok(db) => {
                analyzer.ingest(db);
                shared.publish_sound(analyzer.brightness_level(), analyzer.smooth_level());
            }
            Err(e) => {
                warn!("Microphone read failed: {e}");
            }
        }

        // The I2S capture itself takes a chunk of the interval; sleep only
        // the remainder to hold the cadence.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
