//! The two WS2812 bars, driven through RMT.
//!
//! Hardware order runs counter-clockwise from the bottom right: indices
//! 0..5 are the right bar bottom to top, 5..10 the left bar top to bottom.

use alloc::vec::Vec;

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::{
    Blocking,
    gpio::Level,
    rmt::{
        Channel,
        PulseCode,
        Rmt,
        Tx,
        TxChannelConfig,
        TxChannelCreator as _,
    },
    time::Rate,
};
use palette::Srgb;

use super::LedResources;
use crate::{
    drivers::{
        BAR_COUNT,
        BarColors,
        LedBar,
    },
    error::Error,
};

pub const LED_COUNT: usize = 2 * BAR_COUNT;

pub struct Leds<'a> {
    channel: Option<Channel<'a, Blocking, Tx>>,
    framebuffer: [Srgb<u8>; LED_COUNT],
}

impl<'a> Leds<'a> {
    pub const fn new(channel: Channel<'a, Blocking, Tx>) -> Self {
        Self {
            channel: Some(channel),
            framebuffer: [Srgb::new(0, 0, 0); LED_COUNT],
        }
    }

    fn set_bars(&mut self, left: &BarColors, right: &BarColors) {
        self.framebuffer[..BAR_COUNT].copy_from_slice(right);
        for (slot, color) in self.framebuffer[BAR_COUNT..].iter_mut().zip(left.iter().rev()) {
            *slot = *color;
        }
    }

    async fn flush(&mut self) -> Result<(), Error> {
        let Some(channel) = self.channel.take() else {
            debug!("RMT channel lost during previous transmission");
            return Err(Error::Bus);
        };

        // WS2812 wants GRB.
        let pulses: Vec<PulseCode> = self
            .framebuffer
            .iter()
            .flat_map(|c| [c.green, c.red, c.blue])
            .flat_map(byte_to_pulses)
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect();

        let transaction = channel.transmit(&pulses).map_err(|e| {
            debug!("RMT transmit failed: {}", e);
            Error::Bus
        })?;
        let result = match transaction.wait() {
            Ok(channel) => {
                self.channel = Some(channel);
                Ok(())
            }
            Err((e, channel)) => {
                debug!("RMT transaction failed: {}", e);
                self.channel = Some(channel);
                Err(Error::Bus)
            }
        };

        // Latch.
        Timer::after(Duration::from_micros(50)).await;
        result
    }
}

impl LedBar for Leds<'_> {
    async fn show(&mut self, left: &BarColors, right: &BarColors) -> Result<(), Error> {
        self.set_bars(left, right);
        self.flush().await
    }
}

impl From<LedResources<'static>> for Leds<'static> {
    fn from(res: LedResources<'static>) -> Self {
        let rmt = Rmt::new(res.rmt, Rate::from_mhz(40)).expect("RMT clock");
        let config = TxChannelConfig::default().with_clk_divider(1);
        Self::new(rmt.channel0.configure_tx(res.io, config).expect("RMT channel"))
    }
}

/// Bit timing at the 40 MHz RMT clock.
const fn bit_to_pulse(bit: bool) -> PulseCode {
    if bit {
        // 0.8 µs high, 0.45 µs low
        PulseCode::new(Level::High, 32, Level::Low, 18)
    } else {
        // 0.4 µs high, 0.85 µs low
        PulseCode::new(Level::High, 16, Level::Low, 34)
    }
}

fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
    core::array::from_fn(|i| bit_to_pulse(byte >> (7 - i) & 1 != 0))
}
