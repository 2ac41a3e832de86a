//! Touch handler task — 100 ms scan cadence.
//!
//! Sole writer of the user-selection fields in [`SharedState`] and sole
//! owner of the NVS store and the pattern bank's write side after boot.
//!
//! ## Gesture bindings
//!
//! | Pad | Gesture | Action                                   |
//! |-----|---------|------------------------------------------|
//! | 0   | short   | next pattern, persist settings           |
//! | 1   | short   | next brightness level, persist settings  |
//! | 2   | long    | regenerate current genome, flash feedback|
//! | 3   | long    | power off                                |
//! | 4   | short   | show battery meter overlay               |

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::adapters::storage::{NvsStore, Settings};
use crate::adapters::time::BadgeClock;
use crate::config::BadgeConfig;
use crate::drivers::power::PowerLatch;
use crate::genome::{PatternBank, NUM_PATTERNS};
use crate::render::BRIGHTNESS_LEVELS;
use crate::sensors::touch::{TouchEvent, TouchPads};
use crate::state::SharedState;

pub struct TouchTask {
    shared: Arc<SharedState>,
    bank: Arc<Mutex<PatternBank>>,
    store: NvsStore,
    clock: BadgeClock,
    power: PowerLatch,
    pads: TouchPads,
    flash_ms: u32,
    poll_interval: Duration,
}

impl TouchTask {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shared: Arc<SharedState>,
        bank: Arc<Mutex<PatternBank>>,
        store: NvsStore,
        clock: BadgeClock,
        power: PowerLatch,
        pads: TouchPads,
        config: &BadgeConfig,
    ) -> Self {
        Self {
            shared,
            bank,
            store,
            clock,
            power,
            pads,
            flash_ms: config.flash_ms,
            poll_interval: Duration::from_millis(u64::from(config.touch_poll_interval_ms)),
        }
    }

    pub fn run(mut self) -> ! {
        info!("Touch task started");
        loop {
            if let Some((pad, event)) = self.pads.scan() {
                self.handle(pad, event);
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Apply one classified gesture. Split out of `run` so integration tests
    /// can drive gestures without a thread.
    pub fn handle(&mut self, pad: usize, event: TouchEvent) {
        match (pad, event) {
            (0, TouchEvent::Short) => {
                let next = (self.shared.pattern_index() + 1) % NUM_PATTERNS as u8;
                self.shared.set_pattern_index(next);
                info!("Touch: pattern -> {next}");
                self.persist_settings();
            }
            (1, TouchEvent::Short) => {
                let next = (self.shared.brightness_index() + 1) % BRIGHTNESS_LEVELS.len() as u8;
                self.shared.set_brightness_index(next);
                info!("Touch: brightness -> {next}");
                self.persist_settings();
            }
            (2, TouchEvent::Long) => {
                let slot = usize::from(self.shared.pattern_index()) % NUM_PATTERNS;
                let mut bank = self.bank.lock().unwrap();
                bank.regenerate(slot);
                info!("Touch: regenerated slot {slot} -> '{}'", bank.genome(slot).name);
                if let Err(e) = self.store.save_genomes(bank.genomes()) {
                    warn!("Genome save failed: {e}");
                }
                drop(bank);
                let now = self.clock.now_ms();
                self.shared.trigger_flash(now.wrapping_add(self.flash_ms));
            }
            (3, TouchEvent::Long) => {
                info!("Touch: power off requested");
                self.power.cut_power();
            }
            (4, TouchEvent::Short) => {
                info!("Touch: battery meter");
                self.shared.trigger_battery_meter(self.clock.now_ms());
            }
            _ => {}
        }
    }

    fn persist_settings(&self) {
        let settings = Settings {
            pattern_id: self.shared.pattern_index(),
            brightness_index: self.shared.brightness_index(),
        };
        if let Err(e) = self.store.save_settings(&settings) {
            warn!("Settings save failed: {e}");
        }
    }
}
