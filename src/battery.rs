//! Battery supervisor — hysteretic brightness/safety flags and the 3-strike
//! power-off debounce.
//!
//! The battery task calls [`BatteryStateMachine::update`] once per poll with
//! the latest millivolt reading and publishes the resulting flags to shared
//! state. Each flag is independently hysteretic: recovery requires more
//! headroom than entry, so a cell hovering at a threshold cannot chatter the
//! strip between modes.
//!
//! ## Power-off debounce
//!
//! A single low reading during a high-current LED flash is common and must
//! not shut the badge down. Only three *consecutive* sub-threshold polls
//! (≈90 s at the 30 s cadence) are trusted; any poll at or above the
//! threshold resets the counter. The third strike is terminal: the caller
//! must latch both flags and cut the supply. That action never returns, so
//! it lives behind a diverging function on the power driver, not here.

use log::{info, warn};

use crate::config::BadgeConfig;

/// Consecutive sub-threshold polls required before power-off.
const OFF_STRIKES: u8 = 3;

/// Outcome of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerVerdict {
    /// Keep running; flags may have changed.
    Continue,
    /// Third consecutive strike — cut the supply now.
    PowerOff,
}

pub struct BatteryStateMachine {
    brightness_limit_mv: u16,
    brightness_recovery_mv: u16,
    safety_mv: u16,
    safety_recovery_mv: u16,
    off_mv: u16,

    brightness_limited: bool,
    safety_forced: bool,
    off_strikes: u8,
    last_mv: u16,
}

impl BatteryStateMachine {
    pub fn new(config: &BadgeConfig) -> Self {
        Self {
            brightness_limit_mv: config.brightness_limit_mv,
            brightness_recovery_mv: config.brightness_recovery_mv,
            safety_mv: config.safety_mv,
            safety_recovery_mv: config.safety_recovery_mv,
            off_mv: config.off_mv,
            brightness_limited: false,
            safety_forced: false,
            off_strikes: 0,
            last_mv: 0,
        }
    }

    /// Evaluate one voltage sample. Returns [`PowerVerdict::PowerOff`] on the
    /// third consecutive strike; the caller owns the actual power cut.
    pub fn update(&mut self, mv: u16) -> PowerVerdict {
        self.last_mv = mv;

        // Brightness limiting, hysteretic.
        if !self.brightness_limited && mv < self.brightness_limit_mv {
            info!("Battery {mv} mV — limiting brightness");
            self.brightness_limited = true;
        } else if self.brightness_limited && mv > self.brightness_recovery_mv {
            info!("Battery {mv} mV — brightness limit released");
            self.brightness_limited = false;
        }

        // Safety mode, hysteretic. Entering also forces limiting on.
        if !self.safety_forced && mv < self.safety_mv {
            warn!("Battery {mv} mV — forcing safety pattern");
            self.safety_forced = true;
            self.brightness_limited = true;
        } else if self.safety_forced && mv > self.safety_recovery_mv {
            info!("Battery {mv} mV — safety pattern released");
            self.safety_forced = false;
        }

        // Power-off debounce.
        if mv < self.off_mv {
            self.off_strikes += 1;
            warn!(
                "Battery {mv} mV below off threshold (strike {}/{})",
                self.off_strikes, OFF_STRIKES
            );
            if self.off_strikes >= OFF_STRIKES {
                self.brightness_limited = true;
                self.safety_forced = true;
                return PowerVerdict::PowerOff;
            }
        } else {
            self.off_strikes = 0;
        }

        PowerVerdict::Continue
    }

    pub fn brightness_limited(&self) -> bool {
        self.brightness_limited
    }

    pub fn safety_forced(&self) -> bool {
        self.safety_forced
    }

    pub fn last_mv(&self) -> u16 {
        self.last_mv
    }

    /// Current strike count, for diagnostics.
    pub fn off_strikes(&self) -> u8 {
        self.off_strikes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> BatteryStateMachine {
        BatteryStateMachine::new(&BadgeConfig::default())
    }

    #[test]
    fn scripted_discharge_sequence() {
        let mut sm = machine();

        assert_eq!(sm.update(3600), PowerVerdict::Continue);
        assert!(!sm.brightness_limited() && !sm.safety_forced());

        // 3500 < 3550 — limiting enters.
        assert_eq!(sm.update(3500), PowerVerdict::Continue);
        assert!(sm.brightness_limited());
        assert!(!sm.safety_forced());

        // 3400 < 3470 — safety enters; limiting stays (never reached 3700).
        assert_eq!(sm.update(3400), PowerVerdict::Continue);
        assert!(sm.brightness_limited());
        assert!(sm.safety_forced());

        // 3300 < 3330 — first strike only, no power-off.
        assert_eq!(sm.update(3300), PowerVerdict::Continue);
        assert_eq!(sm.off_strikes(), 1);

        assert_eq!(sm.update(3200), PowerVerdict::Continue);
        assert_eq!(sm.off_strikes(), 2);
        assert!(sm.brightness_limited() && sm.safety_forced());
    }

    #[test]
    fn three_consecutive_strikes_power_off() {
        let mut sm = machine();
        assert_eq!(sm.update(3300), PowerVerdict::Continue);
        assert_eq!(sm.update(3310), PowerVerdict::Continue);
        assert_eq!(sm.update(3320), PowerVerdict::PowerOff);
        // Terminal action latches both flags.
        assert!(sm.brightness_limited() && sm.safety_forced());
    }

    #[test]
    fn interleaved_good_reading_resets_strikes() {
        let mut sm = machine();
        assert_eq!(sm.update(3300), PowerVerdict::Continue);
        assert_eq!(sm.update(3330), PowerVerdict::Continue); // at threshold — resets
        assert_eq!(sm.off_strikes(), 0);
        assert_eq!(sm.update(3300), PowerVerdict::Continue);
        assert_eq!(sm.update(3300), PowerVerdict::Continue);
        assert_eq!(sm.update(3300), PowerVerdict::PowerOff);
    }

    #[test]
    fn brightness_limit_needs_recovery_headroom() {
        let mut sm = machine();
        sm.update(3500); // enter
        assert!(sm.brightness_limited());
        sm.update(3650); // above entry, below recovery — still limited
        assert!(sm.brightness_limited());
        sm.update(3701); // above recovery — released
        assert!(!sm.brightness_limited());
    }

    #[test]
    fn safety_entry_forces_limiting() {
        let mut sm = machine();
        sm.update(3400);
        assert!(sm.safety_forced());
        assert!(sm.brightness_limited());
        // Safety releases above 3600; limiting stays until 3700.
        sm.update(3650);
        assert!(!sm.safety_forced());
        assert!(sm.brightness_limited());
        sm.update(3750);
        assert!(!sm.brightness_limited());
    }
}
