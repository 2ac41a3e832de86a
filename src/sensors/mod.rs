//! Sensor drivers — battery voltage, microphone level, touch pads.
//!
//! ## Dual-target design
//!
//! On ESP-IDF each driver talks to the real peripheral (oneshot ADC, legacy
//! I2S, capacitive touch controller). On host/test targets the raw reading
//! comes from a static atomic that tests inject into, keeping every consumer
//! of these drivers exercisable off-hardware.

pub mod battery;
pub mod microphone;
pub mod touch;
