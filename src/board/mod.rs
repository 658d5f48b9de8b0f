//! ESP32-S3 board support: pin assignment, clock bring-up and the drivers
//! behind the [`drivers`](crate::drivers) traits.
//!
//! The factory board carries the ST7789 panel, two WS2812 bars, an I2S
//! microphone, the buttons, the backlight and the vibration motor. It has no
//! IMU, fuel gauge, touch controller or secure element; those tabs get
//! [`NotFitted`](crate::drivers::NotFitted) and their tasks stay unspawned.

mod buttons;
mod display;
mod leds;
mod microphone;
mod rails;

pub use buttons::Buttons;
pub use display::Panel;
use esp_hal::{
    assign_resources,
    clock::{
        Clock,
        CpuClock,
    },
    rom,
};
pub use leds::{
    LED_COUNT,
    Leds,
};
pub use microphone::BoardMicrophone;
pub use rails::BoardRails;

/// Moves a value into a `static` exactly once.
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

assign_resources! {
    pub Resources<'d> {
        display: DisplayResources<'d> {
            dc: GPIO15,
            rst: GPIO7,
            sck: GPIO4,
            cs: GPIO6,
            miso: GPIO16,
            mosi: GPIO5,
            spi: SPI2,
            dma: DMA_CH0,
        },
        buttons: ButtonResources<'d> {
            up: GPIO11,
            down: GPIO1,
            left: GPIO21,
            right: GPIO2,
            a: GPIO13,
            b: GPIO38,
            start: GPIO12,
        },
        leds: LedResources<'d> {
            io: GPIO18,
            rmt: RMT,
        },
        // Supplies switched from the power tab.
        rails: RailResources<'d> {
            led_power: GPIO17,
            backlight: GPIO19,
            motor: GPIO20,
        },
        mic: MicResources<'d> {
            ws: GPIO8,
            sd: GPIO3,
            dio: GPIO46,
            i2s: I2S0,
            dma: DMA_CH1,
        }
    }
}

/// The ESP32-S3 has to pass through an intermediate frequency before the
/// target CPU clock.
fn set_cpu_clock(cpu_clock_speed: CpuClock) {
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .sysclk_conf()
        .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .cpu_per_conf()
        .modify(|_, w| unsafe {
            let _ = w.pll_freq_sel().set_bit();
            w.cpuperiod_sel().bits(match cpu_clock_speed {
                CpuClock::_80MHz => 0,
                CpuClock::_160MHz => 1,
                CpuClock::_240MHz => 2,
                _ => panic!("Unsupported CPU clock speed"),
            })
        });

    rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
}

/// Bring up clocks and return the raw peripherals. Call once, first thing in
/// `main`, then break them up with [`split_resources!`].
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    set_cpu_clock(CpuClock::_160MHz);
    esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()))
}
