use embassy_futures::block_on;
use factory_firmware::{
    DisplayLock,
    Error,
    PeripheralTask,
    TabView,
    config::BATTERY_PERIOD,
    drivers::PowerMonitor,
    screens::power::{
        BatteryIcon,
        BatteryMonitor,
        CHARGE_GLYPH,
        charge_glyph,
        display_power_tab,
    },
    task::{
        Poll,
        RunGate,
    },
    ui::Surface,
};

#[test]
fn voltage_thresholds() {
    let cases = [
        (4.20, BatteryIcon::Full),
        (4.10, BatteryIcon::Full),
        (4.099, BatteryIcon::High),
        (3.95, BatteryIcon::High),
        (3.949, BatteryIcon::Medium),
        (3.80, BatteryIcon::Medium),
        (3.799, BatteryIcon::Low),
        (3.25, BatteryIcon::Low),
        (3.249, BatteryIcon::Empty),
        (3.00, BatteryIcon::Empty),
        (0.0, BatteryIcon::Empty),
    ];
    for (volts, icon) in cases {
        assert_eq!(BatteryIcon::from_voltage(volts), icon, "{volts} V");
    }
}

#[test]
fn charge_glyph_only_while_charging() {
    assert_eq!(charge_glyph(true), CHARGE_GLYPH);
    assert_eq!(charge_glyph(false), "");
}

struct Cell {
    volts: f32,
    charging: bool,
}

impl PowerMonitor for Cell {
    fn battery_voltage(&mut self) -> Result<f32, Error> {
        Ok(self.volts)
    }

    fn is_charging(&mut self) -> Result<bool, Error> {
        Ok(self.charging)
    }
}

#[test]
fn monitor_redraws_icon_and_charge_state() {
    let display = DisplayLock::new(TabView::new(()));
    let (_, widgets) = block_on(display_power_tab(&display));
    let mut monitor = BatteryMonitor::new(
        Cell {
            volts: 3.5,
            charging: true,
        },
        widgets,
    );

    block_on(Poll::poll(&mut monitor, &display)).unwrap();

    let view = display.into_inner();
    assert_eq!(view.text(widgets.icon), Some(BatteryIcon::Low.glyph()));
    assert_eq!(view.style(widgets.icon).map(|s| s.text), Some(BatteryIcon::Low.color()));
    assert_eq!(view.text(widgets.charge), Some(CHARGE_GLYPH));
}

/// Replays one reading per cycle.
struct Gauge<'a>(&'a [Result<f32, Error>]);

impl PowerMonitor for Gauge<'_> {
    fn battery_voltage(&mut self) -> Result<f32, Error> {
        let (first, rest) = self.0.split_first().ok_or(Error::Bus)?;
        self.0 = rest;
        *first
    }

    fn is_charging(&mut self) -> Result<bool, Error> {
        Ok(false)
    }
}

#[test]
fn failed_read_keeps_the_last_icon() {
    let display = DisplayLock::new(TabView::new(()));
    let (_, widgets) = block_on(display_power_tab(&display));
    let readings = [Ok(3.5), Err(Error::Bus), Ok(4.15)];
    let gate = RunGate::new_active();
    let mut task = PeripheralTask::new(&gate, &display, BatteryMonitor::new(Gauge(&readings), widgets), BATTERY_PERIOD);
    let icon = || block_on(display.with(|view| view.text(widgets.icon).map(String::from)));

    assert!(block_on(task.step()));
    assert_eq!(icon().as_deref(), Some(BatteryIcon::Low.glyph()));

    assert!(!block_on(task.step()));
    assert_eq!(icon().as_deref(), Some(BatteryIcon::Low.glyph()));

    assert!(block_on(task.step()));
    assert_eq!(icon().as_deref(), Some(BatteryIcon::Full.glyph()));
}
