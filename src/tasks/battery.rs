//! Battery sampler task — 30 s cadence.
//!
//! Sole writer of the battery fields in [`SharedState`]. Each poll runs the
//! raw reading through the supervisor state machine and publishes the
//! resulting flags. A failed read is logged and retried next cycle; the
//! supervisor only ever sees real samples.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::battery::{BatteryStateMachine, PowerVerdict};
use crate::config::BadgeConfig;
use crate::drivers::power::PowerLatch;
use crate::sensors::battery::BatterySensor;
use crate::state::SharedState;

pub fn run(
    shared: Arc<SharedState>,
    config: &BadgeConfig,
    mut sensor: BatterySensor,
    power: PowerLatch,
) -> ! {
    info!("Battery task started");
    let mut supervisor = BatteryStateMachine::new(config);
    let interval = Duration::from_millis(u64::from(config.battery_poll_interval_ms));

    loop {
        match sensor.read_mv() {
            Ok(mv) => {
                let verdict = supervisor.update(mv);
                shared.publish_battery(
                    mv,
                    supervisor.brightness_limited(),
                    supervisor.safety_forced(),
                );
                if verdict == PowerVerdict::PowerOff {
                    warn!("Battery exhausted ({mv} mV sustained) — powering off");
                    power.cut_power();
                }
            }
            Err(e) => {
                // Transient sensor trouble: keep the previous flags, try
                // again next poll.
                warn!("Battery read failed: {e}");
            }
        }

        thread::sleep(interval);
    }
}
