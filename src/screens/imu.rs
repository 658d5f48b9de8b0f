use alloc::format;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use super::{
    body,
    label,
    panel,
    rgb,
};
use crate::{
    display_lock::DisplayLock,
    drivers::{
        Acceleration,
        Imu,
    },
    error::Error,
    tabs::Tab,
    task::{
        Poll,
        TaskId,
    },
    ui::{
        Align,
        Style,
        Surface,
        WidgetId,
    },
};

pub async fn display_imu_tab<S: Surface>(display: &DisplayLock<S>) -> WidgetId {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Imu.name());
            let bg = panel(surface, tab, rgb(186, 191, 16), "MPU6886 6-Axis IMU");
            body(surface, bg, "Tilt the board to move the readings.");
            label(
                surface,
                bg,
                "X: --\nY: --\nZ: --",
                Style::body(Rgb565::BLACK),
                Align::TopLeft,
                Point::new(16, 64),
            )
        })
        .await
}

pub fn readout(a: Acceleration) -> alloc::string::String {
    format!("X: {:.2} g\nY: {:.2} g\nZ: {:.2} g", a.x, a.y, a.z)
}

/// Polls the IMU while its tab is focused.
pub struct ImuTask<I> {
    imu: I,
    readout: WidgetId,
}

impl<I> ImuTask<I> {
    pub const fn new(imu: I, readout: WidgetId) -> Self {
        Self { imu, readout }
    }
}

impl<S: Surface, I: Imu> Poll<S> for ImuTask<I> {
    const NAME: &'static str = TaskId::Imu.name();

    async fn poll(&mut self, display: &DisplayLock<S>) -> Result<(), Error> {
        let text = readout(self.imu.acceleration()?);
        let widget = self.readout;
        display.with(|surface| surface.set_text(widget, &text)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_has_two_decimals() {
        let text = readout(Acceleration {
            x: 0.0,
            y: -0.5,
            z: 1.0,
        });
        assert_eq!(text, "X: 0.00 g\nY: -0.50 g\nZ: 1.00 g");
    }
}
