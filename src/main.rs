//! Heartbadge Firmware — Main Entry Point
//!
//! Boot sequence: hold the power latch, bring up logging and NVS, load (or
//! generate) the genomes and settings, construct the sensor and strip
//! drivers, then hand each producer its own thread and run the frame loop on
//! the main task.
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │ battery task │ │  sound task  │ │  touch task  │
//! │    (30 s)    │ │   (100 ms)   │ │   (100 ms)   │
//! └──────┬───────┘ └──────┬───────┘ └──────┬───────┘
//!        │ atomics        │ atomics        │ atomics + bank mutex
//!        ▼                ▼                ▼
//! ┌────────────────────────────────────────────────┐
//! │                 SharedState                    │
//! └──────────────────────┬─────────────────────────┘
//!                        │ read-only snapshot
//!                        ▼
//!            ┌───────────────────────┐
//!            │ frame loop (20 ms)    │──▶ WS2812 strip
//!            └───────────────────────┘
//! ```

#![deny(unused_must_use)]

use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result};
use log::info;

use heartbadge::adapters::storage::NvsStore;
use heartbadge::adapters::time::BadgeClock;
use heartbadge::config::BadgeConfig;
use heartbadge::drivers::power::PowerLatch;
use heartbadge::drivers::strip::StripDriver;
use heartbadge::sensors::battery::BatterySensor;
use heartbadge::sensors::microphone::Microphone;
use heartbadge::sensors::touch::TouchPads;
use heartbadge::state::SharedState;
use heartbadge::tasks;
use heartbadge::tasks::touch::TouchTask;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Heartbadge v{}", env!("CARGO_PKG_VERSION"));

    // Keep the supply on before anything can go wrong.
    let power = PowerLatch::hold();

    // ── 2. Persistence + configuration ────────────────────────
    let store = NvsStore::new().context("NVS init failed")?;
    let config = BadgeConfig::default();
    config.validate().map_err(anyhow::Error::msg)?;

    let bank = Arc::new(Mutex::new(store.load_genomes_or_init()));
    let settings = store.load_settings_or_init();

    let shared = Arc::new(SharedState::new());
    shared.set_pattern_index(settings.pattern_id);
    shared.set_brightness_index(settings.brightness_index);

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let strip = StripDriver::new(
        peripherals.rmt.channel0,
        peripherals.pins.gpio2.downgrade_output(),
    )?;

    let battery_sensor = BatterySensor::new(config.battery_settle_ms)?;
    let microphone = Microphone::new()?;
    let touch_pads = TouchPads::new(config.touch_poll_interval_ms)?;

    let clock = BadgeClock::new();

    // ── 4. Producer tasks ─────────────────────────────────────
    {
        let shared = Arc::clone(&shared);
        let cfg = config.clone();
        let power = power.clone();
        thread::Builder::new()
            .name("battery".into())
            .stack_size(4096)
            .spawn(move || tasks::battery::run(shared, &cfg, battery_sensor, power))
            .context("battery task spawn failed")?;
    }
    {
        let shared = Arc::clone(&shared);
        let cfg = config.clone();
        thread::Builder::new()
            .name("sound".into())
            .stack_size(6144)
            .spawn(move || tasks::sound::run(shared, &cfg, microphone))
            .context("sound task spawn failed")?;
    }
    {
        let touch_task = TouchTask::new(
            Arc::clone(&shared),
            Arc::clone(&bank),
            store,
            clock.clone(),
            power,
            touch_pads,
            &config,
        );
        thread::Builder::new()
            .name("touch".into())
            .stack_size(6144)
            .spawn(move || touch_task.run())
            .context("touch task spawn failed")?;
    }

    // ── 5. Frame loop on the main task ────────────────────────
    info!("System ready. Entering frame loop.");
    tasks::frame_loop::run(shared, bank, strip, clock, &config)
}
