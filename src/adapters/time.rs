//! Monotonic time adapter.
//!
//! Every timestamp in the firmware is milliseconds-since-boot as a `u32`
//! (wraps after ~49 days; all comparisons use wrapping subtraction).
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.

#[derive(Clone)]
pub struct BadgeClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for BadgeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BadgeClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic, wraps at `u32::MAX`).
    #[cfg(target_os = "espidf")]
    pub fn now_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }

    /// Milliseconds since boot (monotonic, wraps at `u32::MAX`).
    #[cfg(not(target_os = "espidf"))]
    pub fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic() {
        let clock = BadgeClock::new();
        let a = clock.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
