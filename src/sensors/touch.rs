//! Capacitive touch pads with press-duration classification.
//!
//! The touch task calls [`TouchPads::scan`] once per poll interval. Each pad
//! runs an independent press-duration state machine: a press shorter than
//! the debounce window is ignored, crossing the debounce window fires
//! `Short` once, and continuing to hold past the long-press window fires
//! `Long` once. Calibration heuristics live in the touch controller, not
//! here — this module only classifies durations.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw counts from the touch controller, touched = count below
//! threshold. On host/test: per-pad injected raw values.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::error::SensorError;
use crate::pins::NUM_TOUCH_PADS;
#[cfg(target_os = "espidf")]
use crate::pins::TOUCH_PAD_CHANNELS;

/// Raw counts below this read as "touched".
const TOUCH_THRESHOLD: u16 = 300;
/// Press shorter than this is noise.
const DEBOUNCE_MS: u32 = 50;
/// Hold longer than this is a long press.
const LONG_PRESS_MS: u32 = 1000;

/// Untouched simulation default, comfortably above the threshold.
const SIM_IDLE: u16 = 1000;

static SIM_TOUCH_RAW: [AtomicU16; NUM_TOUCH_PADS] = [
    AtomicU16::new(SIM_IDLE),
    AtomicU16::new(SIM_IDLE),
    AtomicU16::new(SIM_IDLE),
    AtomicU16::new(SIM_IDLE),
    AtomicU16::new(SIM_IDLE),
    AtomicU16::new(SIM_IDLE),
];

/// Inject a simulated raw touch count (host/test only). Values below the
/// threshold read as touched.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_touch_raw(pad: usize, raw: u16) {
    SIM_TOUCH_RAW[pad].store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, Default)]
struct PadState {
    held_ms: u32,
    pressed: bool,
    short_fired: bool,
    long_fired: bool,
}

pub struct TouchPads {
    poll_interval_ms: u32,
    pads: [PadState; NUM_TOUCH_PADS],
}

impl TouchPads {
    /// Initialise the touch controller. `poll_interval_ms` must match the
    /// task's scan cadence — durations are counted in polls.
    pub fn new(poll_interval_ms: u32) -> Result<Self, SensorError> {
        #[cfg(target_os = "espidf")]
        {
            use esp_idf_sys::*;

            // SAFETY: one-time controller init before the touch task runs.
            unsafe {
                if touch_pad_init() != ESP_OK {
                    return Err(SensorError::TouchReadFailed);
                }
                for &channel in &TOUCH_PAD_CHANNELS {
                    touch_pad_config(channel);
                }
                touch_pad_set_fsm_mode(touch_fsm_mode_t_TOUCH_FSM_MODE_TIMER);
                touch_pad_fsm_start();
            }
        }

        Ok(Self {
            poll_interval_ms,
            pads: [PadState::default(); NUM_TOUCH_PADS],
        })
    }

    /// Scan every pad once and return the first classified event, if any.
    pub fn scan(&mut self) -> Option<(usize, TouchEvent)> {
        for pad in 0..NUM_TOUCH_PADS {
            let touched = match self.read_raw(pad) {
                Ok(raw) => raw < TOUCH_THRESHOLD,
                Err(_) => false, // flaky read counts as release
            };

            let state = &mut self.pads[pad];
            if touched {
                if !state.pressed {
                    *state = PadState {
                        pressed: true,
                        ..PadState::default()
                    };
                }
                state.held_ms = state.held_ms.saturating_add(self.poll_interval_ms);

                if state.held_ms >= LONG_PRESS_MS && !state.long_fired {
                    state.long_fired = true;
                    return Some((pad, TouchEvent::Long));
                }
                if state.held_ms >= DEBOUNCE_MS
                    && state.held_ms < LONG_PRESS_MS
                    && !state.short_fired
                {
                    state.short_fired = true;
                    return Some((pad, TouchEvent::Short));
                }
            } else {
                *state = PadState::default();
            }
        }
        None
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self, pad: usize) -> Result<u16, SensorError> {
        use esp_idf_sys::*;

        let mut raw: u32 = 0;
        // SAFETY: channel was configured in new().
        let ret = unsafe { touch_pad_read_raw_data(TOUCH_PAD_CHANNELS[pad], &mut raw) };
        if ret != ESP_OK {
            return Err(SensorError::TouchReadFailed);
        }
        Ok(raw.min(u32::from(u16::MAX)) as u16)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self, pad: usize) -> Result<u16, SensorError> {
        Ok(SIM_TOUCH_RAW[pad].load(Ordering::Relaxed))
    }
}
