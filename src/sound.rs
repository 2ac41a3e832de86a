//! Sound analyzer — raw dB samples in, bounded brightness modulation out.
//!
//! The microphone task feeds one dB reading per poll. The analyzer keeps a
//! rolling history, estimates the ambient dynamic range from it (robust
//! min/max: mean of the 5 lowest / 5 highest readings), and normalizes the
//! current reading into that range. Two shaped outputs leave the module:
//!
//! - `brightness_level` — 2-tap smoothed, perceptually flattened (^1.4),
//!   remapped into a clamped operating band so the strip stays visible in a
//!   quiet room and tolerable at a concert.
//! - `smooth_level` — asymmetric attack/decay for the VU needle: rises fast
//!   on a transient, decays in slow linear steps instead of flickering.
//!
//! No failure path: non-finite or out-of-range inputs are clamped before any
//! arithmetic, and a zero-width range degrades to a fixed output.

/// Rolling history length.
const HISTORY_LEN: usize = 100;
/// Samples required before the rolling bounds replace the seeds.
const MIN_HISTORY: usize = 10;
/// How many extreme samples feed each bound estimate.
const TAIL_LEN: usize = 5;

/// Wide seed bounds used until enough history accumulates.
const SEED_LOW_DB: f32 = 30.0;
const SEED_HIGH_DB: f32 = 150.0;

/// Sanitized input range; anything outside is clamped, never rejected.
const DB_MIN: f32 = 0.0;
const DB_MAX: f32 = 180.0;

/// Output when no dynamic range has been observed (high == low).
const FLAT_RANGE_OUTPUT: f32 = 0.2;

/// Normalization floor — avoids total blackout on the quiet tail.
const NORM_FLOOR: f32 = 0.01;

/// Attack fraction per sample for `smooth_level` (fast rise).
const ATTACK: f32 = 0.7;
/// Linear decay step per sample for `smooth_level` (slow fall).
const DECAY_STEP: f32 = 0.02;

pub struct SoundAnalyzer {
    history: [f32; HISTORY_LEN],
    head: usize,
    count: usize,
    low: f32,
    high: f32,
    prev_norm: f32,
    brightness_level: f32,
    smooth_level: f32,
    band_floor: f32,
    band_ceiling: f32,
}

impl SoundAnalyzer {
    /// `band_floor`/`band_ceiling` bound the brightness-modulation output
    /// (reference: 0.05 / 0.8).
    pub fn new(band_floor: f32, band_ceiling: f32) -> Self {
        Self {
            history: [0.0; HISTORY_LEN],
            head: 0,
            count: 0,
            low: SEED_LOW_DB,
            high: SEED_HIGH_DB,
            prev_norm: 0.0,
            brightness_level: band_floor,
            smooth_level: 0.0,
            band_floor,
            band_ceiling,
        }
    }

    /// Feed one raw dB reading and update both output scalars.
    pub fn ingest(&mut self, db: f32) {
        let db = if db.is_finite() {
            db.clamp(DB_MIN, DB_MAX)
        } else {
            DB_MIN
        };

        self.history[self.head] = db;
        self.head = (self.head + 1) % HISTORY_LEN;
        if self.count < HISTORY_LEN {
            self.count += 1;
        }

        if self.count >= MIN_HISTORY {
            self.recompute_bounds();
        }

        let target = if self.high <= self.low {
            // No dynamic range observed yet — hold a fixed dim output
            // rather than dividing by zero.
            self.brightness_level = FLAT_RANGE_OUTPUT;
            FLAT_RANGE_OUTPUT
        } else {
            let norm = ((db - self.low) / (self.high - self.low))
                .clamp(0.0, 1.0)
                .max(NORM_FLOOR);
            let avg = (norm + self.prev_norm) / 2.0;
            self.prev_norm = norm;

            // Perceptual flattening, then remap into the operating band.
            let shaped = avg.powf(1.4);
            self.brightness_level =
                self.band_floor + shaped * (self.band_ceiling - self.band_floor);
            self.brightness_level
        };

        // Asymmetric smoothing for the VU needle.
        if target >= self.smooth_level {
            self.smooth_level += (target - self.smooth_level) * ATTACK;
        } else {
            self.smooth_level = (self.smooth_level - DECAY_STEP).max(target);
        }
    }

    /// Brightness-modulation scalar, inside the configured band (or the
    /// fixed flat-range output).
    pub fn brightness_level(&self) -> f32 {
        self.brightness_level
    }

    /// Asymmetric-smoothed scalar for the VU meter.
    pub fn smooth_level(&self) -> f32 {
        self.smooth_level
    }

    /// Current (low, high) dB bounds, for diagnostics.
    pub fn bounds(&self) -> (f32, f32) {
        (self.low, self.high)
    }

    fn recompute_bounds(&mut self) {
        let mut sorted = [0.0f32; HISTORY_LEN];
        sorted[..self.count].copy_from_slice(&self.history[..self.count]);
        let slice = &mut sorted[..self.count];
        // Inputs are sanitized, so total ordering holds.
        slice.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));

        let tail = TAIL_LEN.min(self.count);
        let low_sum: f32 = slice[..tail].iter().sum();
        let high_sum: f32 = slice[self.count - tail..].iter().sum();
        self.low = low_sum / tail as f32;
        self.high = high_sum / tail as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SoundAnalyzer {
        SoundAnalyzer::new(0.05, 0.8)
    }

    #[test]
    fn seeds_used_before_history_accumulates() {
        let mut a = analyzer();
        a.ingest(60.0);
        assert_eq!(a.bounds(), (SEED_LOW_DB, SEED_HIGH_DB));
    }

    #[test]
    fn constant_input_converges_to_stable_plateau() {
        let mut a = analyzer();
        for _ in 0..200 {
            a.ingest(65.0);
        }
        // With zero observed dynamic range the analyzer pins the fixed
        // flat-range output, which sits inside the operating band.
        let level = a.brightness_level();
        assert!((0.05..=0.8).contains(&level), "level {level} out of band");
        let before = a.brightness_level();
        a.ingest(65.0);
        assert!((a.brightness_level() - before).abs() < 1e-6);
    }

    #[test]
    fn varying_input_stays_inside_band() {
        let mut a = analyzer();
        for i in 0..500 {
            let db = 40.0 + 30.0 * (i % 7) as f32 / 6.0;
            a.ingest(db);
            let level = a.brightness_level();
            assert!((0.05..=0.8).contains(&level), "level {level} out of band");
        }
    }

    #[test]
    fn transient_response_is_asymmetric() {
        let mut a = analyzer();
        // Establish a quiet-to-loud range.
        for i in 0..100 {
            a.ingest(if i % 2 == 0 { 40.0 } else { 80.0 });
        }
        // Settle on quiet.
        for _ in 0..100 {
            a.ingest(40.0);
        }
        let quiet = a.smooth_level();

        // Loud transient: the needle must be most of the way up within
        // two samples.
        a.ingest(80.0);
        a.ingest(80.0);
        let peak = a.smooth_level();
        assert!(peak > quiet + (a.brightness_level() - quiet) * 0.7);

        // Back to silence: decay takes many more samples than the rise.
        let mut samples_to_fall = 0;
        while a.smooth_level() > quiet + 0.05 && samples_to_fall < 1000 {
            a.ingest(40.0);
            samples_to_fall += 1;
        }
        assert!(samples_to_fall > 5, "decayed in {samples_to_fall} samples");
    }

    #[test]
    fn non_finite_input_never_poisons_output() {
        let mut a = analyzer();
        for _ in 0..50 {
            a.ingest(f32::NAN);
            a.ingest(f32::INFINITY);
            a.ingest(-500.0);
            a.ingest(1e9);
        }
        assert!(a.brightness_level().is_finite());
        assert!(a.smooth_level().is_finite());
    }
}
