//! MEMS microphone driver (I2S, RX only).
//!
//! Captures a window of 16-bit samples and reduces it to a single RMS dB
//! figure per poll. Silence reads as 0 dB and a full-scale square wave as
//! ~90 dB, which the sound analyzer then normalizes against its rolling
//! ambient range — absolute calibration is irrelevant downstream.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: legacy I2S driver, bounded 1 s read timeout. On host/test:
//! reads from a static `AtomicU32` (f32 bit pattern) for injection.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Samples per capture window.
#[cfg(target_os = "espidf")]
const WINDOW_SAMPLES: usize = 512;

static SIM_SOUND_DB: AtomicU32 = AtomicU32::new(0);

/// Inject a simulated dB reading (host/test only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_sound_db(db: f32) {
    SIM_SOUND_DB.store(db.to_bits(), Ordering::Relaxed);
}

pub struct Microphone {
    _private: (),
}

impl Microphone {
    /// Install and configure the I2S driver.
    pub fn new() -> Result<Self, SensorError> {
        #[cfg(target_os = "espidf")]
        {
            use esp_idf_sys::*;

            // SAFETY: one-time driver install before the sound task runs.
            unsafe {
                let i2s_config = i2s_config_t {
                    mode: i2s_mode_t_I2S_MODE_MASTER | i2s_mode_t_I2S_MODE_RX,
                    sample_rate: pins::I2S_SAMPLE_RATE_HZ,
                    bits_per_sample: i2s_bits_per_sample_t_I2S_BITS_PER_SAMPLE_16BIT,
                    channel_format: i2s_channel_fmt_t_I2S_CHANNEL_FMT_ONLY_LEFT,
                    communication_format: i2s_comm_format_t_I2S_COMM_FORMAT_STAND_I2S,
                    intr_alloc_flags: ESP_INTR_FLAG_LEVEL1 as i32,
                    dma_buf_count: 2,
                    dma_buf_len: 1024,
                    ..core::mem::zeroed()
                };
                if i2s_driver_install(i2s_port_t_I2S_NUM_0, &i2s_config, 0, core::ptr::null_mut())
                    != ESP_OK
                {
                    return Err(SensorError::I2sReadFailed);
                }

                let pin_config = i2s_pin_config_t {
                    mck_io_num: I2S_PIN_NO_CHANGE,
                    bck_io_num: pins::I2S_SCK_GPIO,
                    ws_io_num: pins::I2S_WS_GPIO,
                    data_out_num: I2S_PIN_NO_CHANGE,
                    data_in_num: pins::I2S_DIN_GPIO,
                };
                if i2s_set_pin(i2s_port_t_I2S_NUM_0, &pin_config) != ESP_OK {
                    return Err(SensorError::I2sReadFailed);
                }
            }
        }

        Ok(Self { _private: () })
    }

    /// Capture one window and return its RMS level in dB (>= 0).
    pub fn read_db(&mut self) -> Result<f32, SensorError> {
        #[cfg(target_os = "espidf")]
        {
            use esp_idf_sys::*;

            let mut buffer = [0i16; WINDOW_SAMPLES];
            let mut bytes_read: usize = 0;
            // Bounded wait: a stalled DMA must not wedge the sound task.
            let timeout_ticks = 1000 / u32::from(portTICK_PERIOD_MS);
            let ret = unsafe {
                i2s_read(
                    i2s_port_t_I2S_NUM_0,
                    buffer.as_mut_ptr().cast(),
                    core::mem::size_of_val(&buffer),
                    &mut bytes_read,
                    timeout_ticks,
                )
            };
            if ret != ESP_OK || bytes_read == 0 {
                return Err(SensorError::I2sReadFailed);
            }

            let samples = bytes_read / core::mem::size_of::<i16>();
            let sum_squares: i64 = buffer[..samples]
                .iter()
                .map(|&s| i64::from(s) * i64::from(s))
                .sum();
            let rms = (sum_squares as f32 / samples as f32).sqrt();

            // Silence floor: rms < 1 LSB reads as 0 dB rather than -inf.
            if rms < 1.0 {
                return Ok(0.0);
            }
            Ok(20.0 * rms.log10())
        }

        #[cfg(not(target_os = "espidf"))]
        Ok(f32::from_bits(SIM_SOUND_DB.load(Ordering::Relaxed)))
    }
}
