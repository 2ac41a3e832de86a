//! Shared state between the producer tasks and the frame loop.
//!
//! Single-writer / multiple-reader discipline, no locks:
//!
//! | Field group                               | Sole writer       |
//! |-------------------------------------------|-------------------|
//! | `battery_mv`, `brightness_limited`, `safety_forced` | battery task |
//! | `pattern_index`, `brightness_index`       | touch task        |
//! | `show_battery_meter` + start timestamp    | touch task        |
//! | `flash_until_ms`                          | touch task        |
//! | `sound_modulation`, `vu_level`            | sound task        |
//! | `show_firework` + start timestamp         | radio transport   |
//!
//! Readers (the frame loop, mostly) tolerate values stale by one producer
//! interval, but never torn ones — every multi-byte field is a single atomic.
//! Flag + timestamp pairs are published timestamp-first with Release so a
//! reader that observes the flag also observes its start time.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, Ordering};

pub struct SharedState {
    // Battery task.
    battery_mv: AtomicU16,
    brightness_limited: AtomicBool,
    safety_forced: AtomicBool,

    // Touch task.
    pattern_index: AtomicU8,
    brightness_index: AtomicU8,
    show_battery_meter: AtomicBool,
    battery_meter_start_ms: AtomicU32,
    flash_until_ms: AtomicU32,

    // Sound task. f32 published as bit patterns.
    sound_modulation: AtomicU32,
    vu_level: AtomicU32,

    // Radio transport (external collaborator).
    show_firework: AtomicBool,
    firework_start_ms: AtomicU32,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            battery_mv: AtomicU16::new(0),
            brightness_limited: AtomicBool::new(false),
            safety_forced: AtomicBool::new(false),
            pattern_index: AtomicU8::new(0),
            brightness_index: AtomicU8::new(0),
            show_battery_meter: AtomicBool::new(false),
            battery_meter_start_ms: AtomicU32::new(0),
            flash_until_ms: AtomicU32::new(0),
            sound_modulation: AtomicU32::new(0),
            vu_level: AtomicU32::new(0),
            show_firework: AtomicBool::new(false),
            firework_start_ms: AtomicU32::new(0),
        }
    }

    // ── Battery task (writer) ─────────────────────────────────

    pub fn publish_battery(&self, mv: u16, limited: bool, safety: bool) {
        self.battery_mv.store(mv, Ordering::Relaxed);
        self.brightness_limited.store(limited, Ordering::Relaxed);
        self.safety_forced.store(safety, Ordering::Release);
    }

    pub fn battery_mv(&self) -> u16 {
        self.battery_mv.load(Ordering::Relaxed)
    }

    pub fn brightness_limited(&self) -> bool {
        self.brightness_limited.load(Ordering::Relaxed)
    }

    pub fn safety_forced(&self) -> bool {
        self.safety_forced.load(Ordering::Acquire)
    }

    // ── Touch task (writer) ───────────────────────────────────

    pub fn set_pattern_index(&self, index: u8) {
        self.pattern_index.store(index, Ordering::Relaxed);
    }

    pub fn pattern_index(&self) -> u8 {
        self.pattern_index.load(Ordering::Relaxed)
    }

    pub fn set_brightness_index(&self, index: u8) {
        self.brightness_index.store(index, Ordering::Relaxed);
    }

    pub fn brightness_index(&self) -> u8 {
        self.brightness_index.load(Ordering::Relaxed)
    }

    pub fn trigger_battery_meter(&self, now_ms: u32) {
        self.battery_meter_start_ms.store(now_ms, Ordering::Relaxed);
        self.show_battery_meter.store(true, Ordering::Release);
    }

    /// Clear the meter once expired. Called from the frame loop, which is the
    /// only place that knows the overlay's total duration has elapsed.
    pub fn clear_battery_meter(&self) {
        self.show_battery_meter.store(false, Ordering::Release);
    }

    pub fn battery_meter(&self) -> Option<u32> {
        if self.show_battery_meter.load(Ordering::Acquire) {
            Some(self.battery_meter_start_ms.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    pub fn trigger_flash(&self, until_ms: u32) {
        self.flash_until_ms.store(until_ms, Ordering::Release);
    }

    pub fn flash_until_ms(&self) -> u32 {
        self.flash_until_ms.load(Ordering::Acquire)
    }

    // ── Sound task (writer) ───────────────────────────────────

    pub fn publish_sound(&self, modulation: f32, vu: f32) {
        self.sound_modulation
            .store(modulation.to_bits(), Ordering::Relaxed);
        self.vu_level.store(vu.to_bits(), Ordering::Relaxed);
    }

    pub fn sound_modulation(&self) -> f32 {
        f32::from_bits(self.sound_modulation.load(Ordering::Relaxed))
    }

    pub fn vu_level(&self) -> f32 {
        f32::from_bits(self.vu_level.load(Ordering::Relaxed))
    }

    // ── Radio transport (external writer) ─────────────────────

    pub fn trigger_firework(&self, now_ms: u32) {
        self.firework_start_ms.store(now_ms, Ordering::Relaxed);
        self.show_firework.store(true, Ordering::Release);
    }

    pub fn clear_firework(&self) {
        self.show_firework.store(false, Ordering::Release);
    }

    pub fn firework(&self) -> Option<u32> {
        if self.show_firework.load(Ordering::Acquire) {
            Some(self.firework_start_ms.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}
