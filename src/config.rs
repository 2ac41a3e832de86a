//! System configuration parameters
//!
//! All tunable parameters for the heart badge. Values can be overridden via
//! NVS; the compiled-in defaults match the production board.

use serde::{Deserialize, Serialize};

/// Core badge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeConfig {
    // --- Battery thresholds (millivolts) ---
    /// Below this, brightness is limited. Hysteretic with `brightness_recovery_mv`.
    pub brightness_limit_mv: u16,
    /// Brightness limiting releases only above this.
    pub brightness_recovery_mv: u16,
    /// Below this, the safety pattern takes over the strip.
    pub safety_mv: u16,
    /// Safety mode releases only above this.
    pub safety_recovery_mv: u16,
    /// Below this for three consecutive polls, the badge powers itself off.
    pub off_mv: u16,
    /// Full-charge reference for the battery gauge.
    pub max_battery_mv: u16,

    // --- Timing ---
    /// Frame loop period (milliseconds). ~50 Hz.
    pub frame_interval_ms: u32,
    /// Battery poll interval (milliseconds).
    pub battery_poll_interval_ms: u32,
    /// Settle delay after asserting the battery sense-enable line.
    pub battery_settle_ms: u32,
    /// Sound sampling interval (milliseconds).
    pub sound_poll_interval_ms: u32,
    /// Touch scan interval (milliseconds).
    pub touch_poll_interval_ms: u32,

    // --- Overlay durations (milliseconds) ---
    /// Battery gauge fill animation window.
    pub battery_fill_anim_ms: u32,
    /// Battery gauge hold window after the fill completes.
    pub battery_hold_ms: u32,
    /// Flash feedback duration.
    pub flash_ms: u32,
    /// Firework notification total duration.
    pub firework_total_ms: u32,

    // --- Sound shaping ---
    /// Lower edge of the sound brightness-modulation band.
    pub sound_band_floor: f32,
    /// Upper edge of the sound brightness-modulation band.
    pub sound_band_ceiling: f32,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            // Battery: LiPo single cell through the sense divider
            brightness_limit_mv: 3550,
            brightness_recovery_mv: 3700,
            safety_mv: 3470,
            safety_recovery_mv: 3600,
            off_mv: 3330,
            max_battery_mv: 4200,

            // Timing
            frame_interval_ms: 20,          // 50 Hz
            battery_poll_interval_ms: 30_000,
            battery_settle_ms: 50,
            sound_poll_interval_ms: 100,
            touch_poll_interval_ms: 100,

            // Overlays
            battery_fill_anim_ms: 2000,
            battery_hold_ms: 3000,
            flash_ms: 100,
            firework_total_ms: 5000,

            // Sound
            sound_band_floor: 0.05,
            sound_band_ceiling: 0.8,
        }
    }
}

impl BadgeConfig {
    /// Range-check every field. Called before persisting a config received
    /// from outside (NVS blob or future provisioning path).
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.brightness_recovery_mv <= self.brightness_limit_mv {
            return Err("brightness_recovery_mv must be above brightness_limit_mv");
        }
        if self.safety_recovery_mv <= self.safety_mv {
            return Err("safety_recovery_mv must be above safety_mv");
        }
        if self.safety_mv >= self.brightness_limit_mv {
            return Err("safety_mv must be below brightness_limit_mv");
        }
        if self.off_mv >= self.safety_mv {
            return Err("off_mv must be below safety_mv");
        }
        if self.max_battery_mv <= self.brightness_recovery_mv {
            return Err("max_battery_mv must be above brightness_recovery_mv");
        }
        if self.frame_interval_ms == 0 || self.frame_interval_ms > 1000 {
            return Err("frame_interval_ms must be 1-1000");
        }
        if self.battery_poll_interval_ms < 1000 {
            return Err("battery_poll_interval_ms must be >= 1000");
        }
        if !(0.0..1.0).contains(&self.sound_band_floor)
            || !(self.sound_band_floor..=1.0).contains(&self.sound_band_ceiling)
        {
            return Err("sound band must satisfy 0 <= floor < ceiling <= 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = BadgeConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.frame_interval_ms < c.sound_poll_interval_ms);
        assert!(c.sound_poll_interval_ms < c.battery_poll_interval_ms);
    }

    #[test]
    fn hysteresis_pairs_are_ordered() {
        let c = BadgeConfig::default();
        assert!(
            c.brightness_recovery_mv > c.brightness_limit_mv,
            "recovery must require more headroom than entry to prevent oscillation"
        );
        assert!(c.safety_recovery_mv > c.safety_mv);
        assert!(c.off_mv < c.safety_mv && c.safety_mv < c.brightness_limit_mv);
    }

    #[test]
    fn serde_roundtrip() {
        let c = BadgeConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: BadgeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.brightness_limit_mv, c2.brightness_limit_mv);
        assert_eq!(c.battery_poll_interval_ms, c2.battery_poll_interval_ms);
        assert!((c.sound_band_ceiling - c2.sound_band_ceiling).abs() < 0.001);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = BadgeConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: BadgeConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.off_mv, c2.off_mv);
        assert_eq!(c.firework_total_ms, c2.firework_total_ms);
    }

    #[test]
    fn validation_rejects_inverted_hysteresis() {
        let mut c = BadgeConfig::default();
        c.brightness_recovery_mv = c.brightness_limit_mv;
        assert!(c.validate().is_err());
    }
}
