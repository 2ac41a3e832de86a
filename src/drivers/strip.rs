//! WS2812B strip driver over RMT.
//!
//! Takes the renderer's frame buffer (GRB per LED, matching the WS2812 wire
//! order) and clocks it out. The frame loop is the only caller.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: an RMT TX channel encodes each bit as a high/low pulse pair.
//! On host/test: the last pushed frame is recorded for assertions.

#[cfg(target_os = "espidf")]
use crate::error::Error;
use crate::pins::LED_COUNT;
use crate::render::FrameBuffer;

#[cfg(target_os = "espidf")]
mod timing {
    use core::time::Duration;

    // WS2812B bit timing.
    pub const T0H: Duration = Duration::from_nanos(350);
    pub const T0L: Duration = Duration::from_nanos(800);
    pub const T1H: Duration = Duration::from_nanos(700);
    pub const T1L: Duration = Duration::from_nanos(600);
}

pub struct StripDriver {
    #[cfg(target_os = "espidf")]
    tx: esp_idf_hal::rmt::TxRmtDriver<'static>,
    #[cfg(not(target_os = "espidf"))]
    last_frame: FrameBuffer,
}

impl StripDriver {
    #[cfg(target_os = "espidf")]
    pub fn new(
        channel: esp_idf_hal::rmt::CHANNEL0,
        pin: esp_idf_hal::gpio::AnyOutputPin,
    ) -> crate::error::Result<Self> {
        use esp_idf_hal::rmt::config::TransmitConfig;
        use esp_idf_hal::rmt::TxRmtDriver;

        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config)
            .map_err(|_| Error::Init("RMT channel init failed"))?;
        Ok(Self { tx })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> crate::error::Result<Self> {
        Ok(Self {
            last_frame: [0; LED_COUNT * 3],
        })
    }

    /// Push one frame to the strip. The buffer is already in wire order.
    pub fn push_frame(&mut self, frame: &FrameBuffer) -> crate::error::Result<()> {
        #[cfg(target_os = "espidf")]
        {
            use esp_idf_hal::rmt::{PinState, Pulse, VariableLengthSignal};

            let ticks_hz = self
                .tx
                .counter_clock()
                .map_err(|_| Error::Strip("counter clock query failed"))?;
            let t0h = Pulse::new_with_duration(ticks_hz, PinState::High, &timing::T0H)
                .map_err(|_| Error::Strip("pulse encode failed"))?;
            let t0l = Pulse::new_with_duration(ticks_hz, PinState::Low, &timing::T0L)
                .map_err(|_| Error::Strip("pulse encode failed"))?;
            let t1h = Pulse::new_with_duration(ticks_hz, PinState::High, &timing::T1H)
                .map_err(|_| Error::Strip("pulse encode failed"))?;
            let t1l = Pulse::new_with_duration(ticks_hz, PinState::Low, &timing::T1L)
                .map_err(|_| Error::Strip("pulse encode failed"))?;

            let mut signal = VariableLengthSignal::with_capacity(frame.len() * 8);
            for &byte in frame.iter() {
                for bit in (0..8).rev() {
                    let one = byte >> bit & 1 == 1;
                    let (high, low) = if one { (t1h, t1l) } else { (t0h, t0l) };
                    signal
                        .push([&high, &low])
                        .map_err(|_| Error::Strip("signal build failed"))?;
                }
            }
            self.tx
                .start_blocking(&signal)
                .map_err(|_| Error::Strip("RMT transmit failed"))?;
            Ok(())
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.last_frame.copy_from_slice(frame);
            Ok(())
        }
    }

    /// Last frame pushed (host/test only).
    #[cfg(not(target_os = "espidf"))]
    pub fn last_frame(&self) -> &FrameBuffer {
        &self.last_frame
    }
}
