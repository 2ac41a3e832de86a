//! Power latch driver.
//!
//! The badge stays powered because the firmware holds a MOSFET gate high.
//! [`PowerLatch::cut_power`] drops the gate and never returns: once the
//! supply collapses there is nothing left to return to. The diverging type
//! makes that contract visible at every call site — power-off cannot be
//! mistaken for a recoverable state.

use log::warn;

#[cfg(target_os = "espidf")]
use crate::pins;

#[derive(Clone)]
pub struct PowerLatch {
    _private: (),
}

impl PowerLatch {
    /// Claim the latch pin and hold the supply on.
    pub fn hold() -> Self {
        #[cfg(target_os = "espidf")]
        // SAFETY: one-time GPIO setup at boot, before any task runs.
        unsafe {
            esp_idf_sys::gpio_set_direction(
                pins::POWER_LATCH_GPIO,
                esp_idf_sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            );
            esp_idf_sys::gpio_set_level(pins::POWER_LATCH_GPIO, 1);
        }
        Self { _private: () }
    }

    /// Drop the latch and halt. Never returns.
    ///
    /// The supply takes a few milliseconds to collapse after the gate drops;
    /// the trailing loop covers that window.
    pub fn cut_power(&self) -> ! {
        warn!("Cutting power latch");

        #[cfg(target_os = "espidf")]
        // SAFETY: level write on the pin claimed in hold().
        unsafe {
            esp_idf_sys::gpio_set_level(pins::POWER_LATCH_GPIO, 0);
        }

        loop {
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
    }
}
