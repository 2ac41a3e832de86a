//! GPIO / peripheral pin assignments for the heart badge main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// LED strip (WS2812B, RMT-driven)
// ---------------------------------------------------------------------------

/// Data line for the addressable strip.
pub const LED_DATA_GPIO: i32 = 2;
/// Number of LEDs around the heart outline.
pub const LED_COUNT: usize = 24;

// ---------------------------------------------------------------------------
// Battery monitoring (ADC1)
// ---------------------------------------------------------------------------

/// Battery sense voltage divider output. ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const BATTERY_ADC_GPIO: i32 = 9;
/// Digital output: enables the sense-divider transistor while sampling.
/// Held low between polls so the divider does not drain the cell.
pub const BATTERY_SENSE_ENABLE_GPIO: i32 = 46;
/// Divider ratio for the 10 kΩ / 22 kΩ pair.
pub const BATTERY_DIVIDER_RATIO: f32 = 1.4545;

// ---------------------------------------------------------------------------
// Power latch
// ---------------------------------------------------------------------------

/// Gate of the high-side MOSFET keeping the badge powered. Driving it low
/// cuts the supply — there is no way back from software.
pub const POWER_LATCH_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// Microphone (I2S MEMS, RX only)
// ---------------------------------------------------------------------------

pub const I2S_SCK_GPIO: i32 = 40;
pub const I2S_WS_GPIO: i32 = 39;
pub const I2S_DIN_GPIO: i32 = 38;
/// I2S sample rate in Hz.
pub const I2S_SAMPLE_RATE_HZ: u32 = 16_000;

// ---------------------------------------------------------------------------
// Capacitive touch pads
// ---------------------------------------------------------------------------

/// Number of touch pads wired on the badge.
pub const NUM_TOUCH_PADS: usize = 6;

/// Touch controller channel per pad, in gesture-binding order:
/// next-pattern, brightness, regenerate, power-off, battery-check, spare.
pub const TOUCH_PAD_CHANNELS: [u32; NUM_TOUCH_PADS] = [5, 6, 3, 4, 7, 8];
