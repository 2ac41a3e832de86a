//! Frame rendering and overlay arbitration.
//!
//! Each frame the compositor decides which visual mode owns the strip and
//! fills the frame buffer accordingly. Priority, highest first:
//!
//! 1. **Flash feedback** — brief dim-white full-strip flash after a user
//!    action (genome regeneration).
//! 2. **Safety pattern** — slow red pulse sweep while the battery supervisor
//!    forces safety mode.
//! 3. **Battery gauge** — time-bounded fill overlay after the battery-check
//!    touch gesture.
//! 4. **Firework notification** — time-bounded overlay triggered by the
//!    radio transport.
//! 5. **Patterns** — the VU meter slot, the sound-reactive slot, or the
//!    plain genome animation.
//!
//! All render paths are pure functions of their explicit inputs plus the
//! shared-state snapshot taken at the top of the frame, so a frame is fully
//! reproducible in tests.

pub mod battery_gauge;
pub mod genome_pattern;
pub mod notification;
pub mod safety;
pub mod vu_meter;

use crate::config::BadgeConfig;
use crate::genome::{PatternBank, NUM_PATTERNS, SOUND_REACTIVE_SLOT, VU_METER_SLOT};
use crate::pins::LED_COUNT;
use crate::state::SharedState;

/// One frame: 3 bytes per LED, wire order (green, red, blue).
pub type FrameBuffer = [u8; LED_COUNT * 3];

/// Number of symmetric fill levels up the heart outline.
pub const FILL_LEVELS: usize = 13;

/// Fill order for the gauge-style overlays: bottom tip first, then up both
/// sides in lockstep to the top centre. Entries are (left LED, right LED);
/// the two ends of the chain meet, so the first and last pairs repeat an
/// index.
pub const FILL_ORDER: [(usize, usize); FILL_LEVELS] = [
    (0, 0),
    (1, 23),
    (2, 22),
    (3, 21),
    (4, 20),
    (5, 19),
    (6, 18),
    (7, 17),
    (8, 16),
    (9, 15),
    (10, 14),
    (11, 13),
    (12, 12),
];

/// User-selectable brightness levels: 10 / 20 / 50 / 75 / 100 % of full.
pub const BRIGHTNESS_LEVELS: [u8; 5] = [25, 51, 127, 191, 255];

/// Dim-white flash level — feedback, not a torch.
const FLASH_WHITE: u8 = 80;

/// Write one LED's colour into the frame buffer (GRB wire order).
pub fn set_pixel(frame: &mut FrameBuffer, index: usize, r: u8, g: u8, b: u8) {
    frame[index * 3] = g;
    frame[index * 3 + 1] = r;
    frame[index * 3 + 2] = b;
}

/// The brightness actually applied: the lowest configured level while the
/// battery supervisor limits, else the user's selection.
pub fn effective_brightness(shared: &SharedState) -> u8 {
    if shared.brightness_limited() {
        BRIGHTNESS_LEVELS[0]
    } else {
        BRIGHTNESS_LEVELS[shared.brightness_index() as usize % BRIGHTNESS_LEVELS.len()]
    }
}

/// Which mode produced the frame. Reported for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Flash,
    Safety,
    BatteryMeter,
    Firework,
    VuMeter,
    SoundReactive,
    Pattern,
}

/// Per-frame overlay arbitration.
pub struct Compositor {
    battery_fill_anim_ms: u32,
    battery_total_ms: u32,
    firework_total_ms: u32,
    off_mv: u16,
    max_battery_mv: u16,
}

impl Compositor {
    pub fn new(config: &BadgeConfig) -> Self {
        Self {
            battery_fill_anim_ms: config.battery_fill_anim_ms,
            battery_total_ms: config.battery_fill_anim_ms + config.battery_hold_ms,
            firework_total_ms: config.firework_total_ms,
            off_mv: config.off_mv,
            max_battery_mv: config.max_battery_mv,
        }
    }

    /// Fill `frame` for this instant and report which mode rendered.
    ///
    /// Expired one-shot overlays are cleared here: the frame loop is the only
    /// consumer that knows an overlay's total duration has passed.
    pub fn compose(
        &self,
        frame: &mut FrameBuffer,
        bank: &PatternBank,
        shared: &SharedState,
        loop_counter: u8,
        now_ms: u32,
    ) -> RenderMode {
        let brightness = effective_brightness(shared);

        if now_ms < shared.flash_until_ms() {
            for i in 0..LED_COUNT {
                set_pixel(frame, i, FLASH_WHITE, FLASH_WHITE, FLASH_WHITE);
            }
            return RenderMode::Flash;
        }

        if shared.safety_forced() {
            safety::render(frame, loop_counter, brightness);
            return RenderMode::Safety;
        }

        if let Some(start_ms) = shared.battery_meter() {
            let elapsed = now_ms.wrapping_sub(start_ms);
            if elapsed < self.battery_total_ms {
                battery_gauge::render(
                    frame,
                    shared.battery_mv(),
                    self.off_mv,
                    self.max_battery_mv,
                    elapsed,
                    self.battery_fill_anim_ms,
                    brightness,
                );
                return RenderMode::BatteryMeter;
            }
            shared.clear_battery_meter();
        }

        if let Some(start_ms) = shared.firework() {
            let elapsed = now_ms.wrapping_sub(start_ms);
            if elapsed < self.firework_total_ms {
                notification::render(frame, elapsed, self.firework_total_ms);
                return RenderMode::Firework;
            }
            shared.clear_firework();
        }

        let slot = shared.pattern_index() as usize % NUM_PATTERNS;
        if slot == VU_METER_SLOT {
            vu_meter::render(
                frame,
                bank.genome(slot),
                shared.vu_level(),
                shared.sound_modulation(),
                brightness,
            );
            return RenderMode::VuMeter;
        }

        let sound_reactive = slot == SOUND_REACTIVE_SLOT;
        genome_pattern::render(
            frame,
            bank.genome(slot),
            bank.traits(slot),
            sound_reactive,
            shared.vu_level(),
            brightness,
            loop_counter,
            now_ms,
        );
        if sound_reactive {
            RenderMode::SoundReactive
        } else {
            RenderMode::Pattern
        }
    }
}
