//! Driver boundary.
//!
//! Screens and tasks reach hardware only through these traits. Every call
//! reports failure through [`Error`] instead of panicking. Boards that lack
//! a part use [`NotFitted`].

use embassy_time::Instant;
use embedded_graphics::prelude::Point;
use palette::Srgb;

use crate::error::Error;

/// LEDs per bar (left or right).
pub const BAR_COUNT: usize = 5;

/// Bytes in the secure element's serial number.
pub const SERIAL_LEN: usize = 9;

/// Samples per microphone block.
pub const BLOCK_LEN: usize = 256;

pub type SampleBlock = [i16; BLOCK_LEN];

/// One bar's colours, bottom LED first.
pub type BarColors = [Srgb<u8>; BAR_COUNT];

pub trait PowerMonitor {
    /// Battery voltage in volts.
    fn battery_voltage(&mut self) -> Result<f32, Error>;
    fn is_charging(&mut self) -> Result<bool, Error>;
}

/// Switchable supplies exposed on the power tab.
pub trait PowerRails {
    fn set_led(&mut self, on: bool) -> Result<(), Error>;
    fn set_vibration(&mut self, on: bool) -> Result<(), Error>;
    /// `true` lights the display backlight, `false` turns it off.
    fn set_backlight(&mut self, full: bool) -> Result<(), Error>;
}

pub trait SecureElement {
    fn serial_number(&mut self) -> Result<[u8; SERIAL_LEN], Error>;
}

/// Acceleration in g.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

pub trait Imu {
    fn acceleration(&mut self) -> Result<Acceleration, Error>;
}

pub trait Microphone {
    fn read_block(&mut self, block: &mut SampleBlock) -> Result<(), Error>;
}

pub trait TouchPanel {
    /// The current touch, or `None` when nothing touches the panel.
    fn touch_point(&mut self) -> Result<Option<Point>, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
}

impl WifiState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
        }
    }
}

pub trait WifiStatus {
    fn state(&mut self) -> Result<WifiState, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

pub trait Rtc {
    fn now(&mut self) -> Result<TimeOfDay, Error>;
}

pub trait LedBar {
    async fn show(&mut self, left: &BarColors, right: &BarColors) -> Result<(), Error>;
}

/// Stand-in for a part the board does not have.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFitted;

impl PowerMonitor for NotFitted {
    fn battery_voltage(&mut self) -> Result<f32, Error> {
        Err(Error::NotFitted)
    }

    fn is_charging(&mut self) -> Result<bool, Error> {
        Err(Error::NotFitted)
    }
}

impl SecureElement for NotFitted {
    fn serial_number(&mut self) -> Result<[u8; SERIAL_LEN], Error> {
        Err(Error::NotFitted)
    }
}

impl Imu for NotFitted {
    fn acceleration(&mut self) -> Result<Acceleration, Error> {
        Err(Error::NotFitted)
    }
}

impl TouchPanel for NotFitted {
    fn touch_point(&mut self) -> Result<Option<Point>, Error> {
        Err(Error::NotFitted)
    }
}

impl WifiStatus for NotFitted {
    fn state(&mut self) -> Result<WifiState, Error> {
        Err(Error::NotFitted)
    }
}

/// Wall clock derived from uptime, for boards without an RTC.
pub struct UptimeClock {
    boot: TimeOfDay,
}

impl UptimeClock {
    /// A clock that read `boot` when the system started.
    pub const fn new(boot: TimeOfDay) -> Self {
        Self { boot }
    }

    /// Time of day `elapsed_secs` after boot.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn at(&self, elapsed_secs: u64) -> TimeOfDay {
        let boot_minutes = self.boot.hour as u64 * 60 + self.boot.minute as u64;
        let minutes = (boot_minutes + elapsed_secs / 60) % (24 * 60);
        TimeOfDay {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        }
    }
}

impl Rtc for UptimeClock {
    fn now(&mut self) -> Result<TimeOfDay, Error> {
        Ok(self.at(Instant::now().as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_zero_padded() {
        assert_eq!(TimeOfDay { hour: 7, minute: 5 }.to_string(), "07:05");
    }

    #[test]
    fn uptime_clock_wraps_at_midnight() {
        let clock = UptimeClock::new(TimeOfDay { hour: 23, minute: 58 });
        assert_eq!(clock.at(0), TimeOfDay { hour: 23, minute: 58 });
        assert_eq!(clock.at(119), TimeOfDay { hour: 23, minute: 59 });
        assert_eq!(clock.at(180), TimeOfDay { hour: 0, minute: 1 });
    }

    #[test]
    fn missing_parts_report_not_fitted() {
        assert_eq!(SecureElement::serial_number(&mut NotFitted), Err(Error::NotFitted));
        assert_eq!(Imu::acceleration(&mut NotFitted), Err(Error::NotFitted));
        assert_eq!(WifiStatus::state(&mut NotFitted), Err(Error::NotFitted));
    }
}
