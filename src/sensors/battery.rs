//! Battery voltage sensor.
//!
//! Reads the cell voltage through a transistor-gated resistor divider on
//! ADC1. The divider is only powered while sampling: the sense-enable line is
//! asserted, allowed to settle, sampled, then released, so the divider does
//! not drain the cell between the 30-second polls.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: oneshot ADC read via `esp_idf_sys`. On host/test: reads from a
//! static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_BATTERY_MV: AtomicU16 = AtomicU16::new(0);

/// Inject a simulated battery reading (host/test only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_battery_mv(mv: u16) {
    SIM_BATTERY_MV.store(mv, Ordering::Relaxed);
}

pub struct BatterySensor {
    settle_ms: u32,
    #[cfg(target_os = "espidf")]
    adc_handle: esp_idf_sys::adc_oneshot_unit_handle_t,
}

// SAFETY: the ADC handle is only ever used from the battery task after
// construction in main.
#[cfg(target_os = "espidf")]
unsafe impl Send for BatterySensor {}

impl BatterySensor {
    /// Set up the ADC channel and the sense-enable GPIO.
    pub fn new(settle_ms: u32) -> Result<Self, SensorError> {
        #[cfg(target_os = "espidf")]
        {
            use esp_idf_sys::*;

            let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
            // SAFETY: one-time peripheral setup before the battery task runs.
            unsafe {
                let unit_cfg = adc_oneshot_unit_init_cfg_t {
                    unit_id: adc_unit_t_ADC_UNIT_1,
                    ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                    ..core::mem::zeroed()
                };
                if adc_oneshot_new_unit(&unit_cfg, &mut handle) != ESP_OK {
                    return Err(SensorError::AdcReadFailed);
                }

                let chan_cfg = adc_oneshot_chan_cfg_t {
                    atten: adc_atten_t_ADC_ATTEN_DB_11,
                    bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
                };
                if adc_oneshot_config_channel(handle, adc_channel_t_ADC_CHANNEL_8, &chan_cfg)
                    != ESP_OK
                {
                    return Err(SensorError::AdcReadFailed);
                }

                gpio_set_direction(
                    pins::BATTERY_SENSE_ENABLE_GPIO,
                    gpio_mode_t_GPIO_MODE_OUTPUT,
                );
                gpio_set_level(pins::BATTERY_SENSE_ENABLE_GPIO, 0);
            }

            Ok(Self {
                settle_ms,
                adc_handle: handle,
            })
        }

        #[cfg(not(target_os = "espidf"))]
        Ok(Self { settle_ms })
    }

    /// Enable the divider, settle, sample, release. Returns millivolts at the
    /// cell.
    pub fn read_mv(&mut self) -> Result<u16, SensorError> {
        #[cfg(target_os = "espidf")]
        {
            use esp_idf_sys::*;

            // SAFETY: handle was initialised in new(); GPIO calls are
            // idempotent level writes.
            unsafe {
                gpio_set_level(pins::BATTERY_SENSE_ENABLE_GPIO, 1);
            }
            std::thread::sleep(std::time::Duration::from_millis(u64::from(self.settle_ms)));

            let mut raw: i32 = 0;
            let ret = unsafe {
                adc_oneshot_read(self.adc_handle, adc_channel_t_ADC_CHANNEL_8, &mut raw)
            };
            unsafe {
                gpio_set_level(pins::BATTERY_SENSE_ENABLE_GPIO, 0);
            }
            if ret != ESP_OK {
                return Err(SensorError::AdcReadFailed);
            }

            let adc_mv = raw as f32 / 4095.0 * 3300.0;
            let mv = adc_mv * pins::BATTERY_DIVIDER_RATIO;
            if !(0.0..=6000.0).contains(&mv) {
                return Err(SensorError::OutOfRange);
            }
            Ok(mv as u16)
        }

        #[cfg(not(target_os = "espidf"))]
        {
            // Same settle cadence as hardware so task timing stays faithful.
            std::thread::sleep(std::time::Duration::from_millis(u64::from(self.settle_ms)));
            Ok(SIM_BATTERY_MV.load(Ordering::Relaxed))
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn sim_injection_roundtrip() {
        let mut sensor = BatterySensor::new(0).unwrap();
        sim_set_battery_mv(3720);
        assert_eq!(sensor.read_mv().unwrap(), 3720);
        sim_set_battery_mv(3305);
        assert_eq!(sensor.read_mv().unwrap(), 3305);
    }
}
