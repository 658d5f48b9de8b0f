//! Power tab: supply toggles, plus the battery indicator that sits in the
//! screen's top-right corner on every tab.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use super::{
    body,
    panel,
    rgb,
};
use crate::{
    config::BATTERY_PERIOD,
    display_lock::DisplayLock,
    drivers::{
        PowerMonitor,
        PowerRails,
    },
    error::Error,
    tabs::Tab,
    task::{
        PeripheralTask,
        Poll,
        RunGate,
    },
    ui::{
        Align,
        Style,
        Surface,
        WidgetId,
        WidgetKind,
    },
};

/// Battery indicator state, picked from the cell voltage alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryIcon {
    Full,
    High,
    Medium,
    Low,
    Empty,
}

impl BatteryIcon {
    pub fn from_voltage(volts: f32) -> Self {
        if volts >= 4.10 {
            Self::Full
        } else if volts >= 3.95 {
            Self::High
        } else if volts >= 3.80 {
            Self::Medium
        } else if volts >= 3.25 {
            Self::Low
        } else {
            Self::Empty
        }
    }

    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Full => "[####]",
            Self::High => "[### ]",
            Self::Medium => "[##  ]",
            Self::Low => "[#   ]",
            Self::Empty => "[    ]",
        }
    }

    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Full | Self::High => rgb(0x0a, 0xb3, 0x00),
            Self::Medium => rgb(0xff, 0x99, 0x00),
            Self::Low | Self::Empty => rgb(0xff, 0x00, 0x00),
        }
    }
}

pub const CHARGE_GLYPH: &str = "+";
pub const CHARGE_COLOR: Rgb565 = rgb(0x00, 0x00, 0xcc);

/// Text of the charge indicator drawn over the battery glyph.
pub const fn charge_glyph(charging: bool) -> &'static str {
    if charging { CHARGE_GLYPH } else { "" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryWidgets {
    pub icon: WidgetId,
    pub charge: WidgetId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerControl {
    Led,
    Motor,
    Screen,
}

impl PowerControl {
    pub const ALL: [Self; 3] = [Self::Led, Self::Motor, Self::Screen];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Led => "LED",
            Self::Motor => "Motor",
            Self::Screen => "Screen",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// The three toggle buttons and what they last switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerControls {
    buttons: [WidgetId; 3],
    checked: [bool; 3],
}

impl PowerControls {
    pub const fn button(&self, control: PowerControl) -> WidgetId {
        self.buttons[control.index()]
    }

    pub const fn is_on(&self, control: PowerControl) -> bool {
        self.checked[control.index()]
    }

    /// Flip one supply. The button only changes state once the rail
    /// accepted the new setting. The caller holds the display lock.
    pub fn toggle<S: Surface, R: PowerRails>(
        &mut self,
        control: PowerControl,
        surface: &mut S,
        rails: &mut R,
    ) -> Result<bool, Error> {
        let on = !self.is_on(control);
        match control {
            PowerControl::Led => rails.set_led(on),
            PowerControl::Motor => rails.set_vibration(on),
            PowerControl::Screen => rails.set_backlight(on),
        }?;
        self.checked[control.index()] = on;
        surface.set_checked(self.button(control), on);
        info!("{} state: {}", control.label(), on);
        Ok(on)
    }
}

/// Build the power tab and the battery indicator.
pub async fn display_power_tab<S: Surface>(display: &DisplayLock<S>) -> (PowerControls, BatteryWidgets) {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Power.name());
            let bg = panel(surface, tab, rgb(255, 97, 56), "Power Management");
            body(
                surface,
                bg,
                "Switch the LED bar supply, the vibration motor and the backlight.\n\n\
                 Press A, B or START to toggle:",
            );

            let checked = [true, false, true];
            let places = [
                (Align::BottomLeft, Point::new(20, -12)),
                (Align::BottomMid, Point::new(0, -12)),
                (Align::BottomRight, Point::new(-20, -12)),
            ];
            let buttons = core::array::from_fn(|i| {
                let button = surface.create(bg, WidgetKind::Button);
                surface.set_text(button, PowerControl::ALL[i].label());
                surface.set_size(button, Size::new(76, 30));
                surface.set_style(button, Style::body(Rgb565::BLACK));
                surface.align(button, places[i].0, places[i].1);
                surface.set_checked(button, checked[i]);
                button
            });

            let icon = surface.create(WidgetId::SCREEN, WidgetKind::Label);
            surface.set_text(icon, BatteryIcon::Full.glyph());
            surface.set_style(icon, Style::body(BatteryIcon::Full.color()));
            surface.align(icon, Align::TopRight, Point::new(-14, 12));
            let charge = surface.create(icon, WidgetKind::Label);
            surface.set_style(charge, Style::body(CHARGE_COLOR));
            surface.align(charge, Align::Center, Point::new(-4, 0));

            (PowerControls { buttons, checked }, BatteryWidgets { icon, charge })
        })
        .await
}

/// Keeps the battery indicator current. Runs on every tab.
pub struct BatteryMonitor<P> {
    power: P,
    widgets: BatteryWidgets,
}

impl<P> BatteryMonitor<P> {
    pub const fn new(power: P, widgets: BatteryWidgets) -> Self {
        Self { power, widgets }
    }
}

impl<P: PowerMonitor> BatteryMonitor<P> {
    /// Poll every [`BATTERY_PERIOD`] for as long as the firmware runs. No tab
    /// owns this task, so its gate never closes.
    pub async fn run<S: Surface>(self, display: &DisplayLock<S>) -> ! {
        let gate = RunGate::new_active();
        PeripheralTask::new(&gate, display, self, BATTERY_PERIOD).run().await
    }
}

impl<S: Surface, P: PowerMonitor> Poll<S> for BatteryMonitor<P> {
    const NAME: &'static str = "batteryTask";

    async fn poll(&mut self, display: &DisplayLock<S>) -> Result<(), Error> {
        let icon = BatteryIcon::from_voltage(self.power.battery_voltage()?);
        let charging = self.power.is_charging()?;
        let widgets = self.widgets;
        display
            .with(|surface| {
                surface.set_text(widgets.icon, icon.glyph());
                surface.set_style(widgets.icon, Style::body(icon.color()));
                surface.set_text(widgets.charge, charge_glyph(charging));
            })
            .await;
        Ok(())
    }
}
