use esp_hal::gpio::{
    Level,
    Output,
    OutputConfig,
};

use super::RailResources;
use crate::{
    drivers::PowerRails,
    error::Error,
};

/// GPIO-switched supplies: WS2812 power, backlight and vibration motor.
pub struct BoardRails {
    led_power: Output<'static>,
    backlight: Output<'static>,
    motor: Output<'static>,
}

impl From<RailResources<'static>> for BoardRails {
    fn from(res: RailResources<'static>) -> Self {
        // Matches the power tab's initial button states.
        Self {
            led_power: Output::new(res.led_power, Level::High, OutputConfig::default()),
            backlight: Output::new(res.backlight, Level::High, OutputConfig::default()),
            motor: Output::new(res.motor, Level::Low, OutputConfig::default()),
        }
    }
}

impl PowerRails for BoardRails {
    fn set_led(&mut self, on: bool) -> Result<(), Error> {
        self.led_power.set_level(Level::from(on));
        Ok(())
    }

    fn set_vibration(&mut self, on: bool) -> Result<(), Error> {
        self.motor.set_level(Level::from(on));
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Error> {
        self.backlight.set_level(Level::from(on));
        Ok(())
    }
}
