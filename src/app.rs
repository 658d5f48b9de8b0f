//! Startup sequence and UI event dispatch.
//!
//! Startup shows the splash, builds every tab in display order, then hands
//! the task gates to the focus coordinator. After that the UI runs on
//! button events: previous/next move between tabs, the power buttons flip
//! supplies while the power tab is focused.

use embassy_time::Timer;
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::{
    config::{
        RENDER_PERIOD,
        SPLASH_DURATION,
    },
    coordinator::{
        FocusCoordinator,
        FocusHooks,
    },
    display_lock::DisplayLock,
    drivers::{
        PowerRails,
        Rtc,
        SecureElement,
    },
    screens::{
        clock::{
            self,
            ClockWidgets,
        },
        crypto,
        cta,
        home,
        imu,
        led_bar,
        mic::{
            self,
            MicWidgets,
        },
        power::{
            self,
            BatteryWidgets,
            PowerControl,
            PowerControls,
        },
        touch::{
            self,
            TouchWidgets,
        },
        wifi,
    },
    tabs::{
        Tab,
        TabRegistry,
    },
    task::{
        TaskRegistry,
        TaskSet,
    },
    ui::{
        Surface,
        TabView,
        WidgetId,
    },
};

/// Boot logo, a 24-bit BMP.
pub const SPLASH_LOGO: &[u8] = include_bytes!("../assets/splash.bmp");

/// Show the boot logo for [`SPLASH_DURATION`], then reveal the tabs.
pub async fn show_splash<S: Surface>(display: &DisplayLock<S>) {
    display.with(|surface| surface.set_splash(Some(SPLASH_LOGO))).await;
    Timer::after(SPLASH_DURATION).await;
    display.with(|surface| surface.set_splash(None)).await;
}

/// Widgets the running firmware keeps updating after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screens {
    pub clock: ClockWidgets,
    pub imu: WidgetId,
    pub mic: MicWidgets,
    pub power: PowerControls,
    pub battery: BatteryWidgets,
    pub touch: TouchWidgets,
    /// `None` when the secure element did not answer.
    pub crypto_serial: Option<WidgetId>,
    pub wifi: WidgetId,
}

/// Build every tab, in display order.
pub async fn build_tabs<S: Surface, E: SecureElement>(display: &DisplayLock<S>, element: &mut E) -> Screens {
    home::display_home_tab(display).await;
    let clock = clock::display_clock_tab(display).await;
    let imu = imu::display_imu_tab(display).await;
    let mic = mic::display_microphone_tab(display).await;
    led_bar::display_led_bar_tab(display).await;
    let (power, battery) = power::display_power_tab(display).await;
    let touch = touch::display_touch_tab(display).await;
    let crypto_serial = crypto::display_crypto_tab(display, element).await;
    let wifi = wifi::display_wifi_tab(display).await;
    cta::display_cta_tab(display).await;

    info!("{} tabs ready", Tab::COUNT);
    Screens {
        clock,
        imu,
        mic,
        power,
        battery,
        touch,
        crypto_serial,
        wifi,
    }
}

/// Button input, already mapped to what it means for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiEvent {
    Previous,
    Next,
    Toggle(PowerControl),
}

/// Focus actions, run with the display lock already held.
struct FocusContext<'s, S, C> {
    surface: &'s mut S,
    clock: &'s ClockWidgets,
    touch: &'s TouchWidgets,
    rtc: &'s mut C,
}

impl<S: Surface, C: Rtc> FocusHooks for FocusContext<'_, S, C> {
    fn refresh_clock(&mut self) {
        clock::update_roller_time(self.surface, self.clock, self.rtc);
    }

    fn reset_touch_background(&mut self) {
        touch::reset_touch_bg(self.surface, self.touch);
    }
}

/// Everything the UI event handler owns.
pub struct UiContext<'a, S, R, P, C> {
    display: &'a DisplayLock<S>,
    coordinator: FocusCoordinator<'a, R>,
    screens: Screens,
    rails: P,
    rtc: C,
}

impl<'a, S: Surface, R: TaskRegistry, P: PowerRails, C: Rtc> UiContext<'a, S, R, P, C> {
    pub const fn new(
        display: &'a DisplayLock<S>,
        registry: &'a TabRegistry<'a>,
        tasks: &'a R,
        screens: Screens,
        rails: P,
        rtc: C,
    ) -> Self {
        Self {
            display,
            coordinator: FocusCoordinator::new(registry, tasks),
            screens,
            rails,
            rtc,
        }
    }

    /// Put the tasks in the home tab's state.
    pub fn start(&mut self) -> TaskSet {
        self.coordinator.start()
    }

    pub const fn current_tab(&self) -> Tab {
        self.coordinator.current()
    }

    pub const fn screens(&self) -> &Screens {
        &self.screens
    }

    /// Handle one event under the display lock. Returns the new active task
    /// set when the focused tab changed.
    pub async fn handle(&mut self, event: UiEvent) -> Option<TaskSet> {
        let display = self.display;
        let mut surface = display.acquire().await;
        self.dispatch(&mut surface, event)
    }

    /// Event handler body. The caller holds the display lock.
    pub fn dispatch(&mut self, surface: &mut S, event: UiEvent) -> Option<TaskSet> {
        match event {
            UiEvent::Previous | UiEvent::Next => {
                let count = surface.tab_count();
                if count == 0 {
                    return None;
                }
                let current = surface.active_tab();
                let index = if event == UiEvent::Next {
                    (current + 1) % count
                } else {
                    (current + count - 1) % count
                };
                if !surface.select_tab(index) {
                    return None;
                }
                let name = surface.tab_name(index)?;

                let mut hooks = FocusContext {
                    surface,
                    clock: &self.screens.clock,
                    touch: &self.screens.touch,
                    rtc: &mut self.rtc,
                };
                self.coordinator.on_tab_name(name, &mut hooks).ok()
            }
            UiEvent::Toggle(control) => {
                if self.coordinator.current() != Tab::Power {
                    return None;
                }
                if let Err(e) = self.screens.power.toggle(control, surface, &mut self.rails) {
                    error!("{} toggle failed: {}", control.label(), e);
                }
                None
            }
        }
    }
}

/// Flush the tab view to the panel whenever something changed.
pub async fn render_loop<D: DrawTarget<Color = Rgb565>>(display: &DisplayLock<TabView<D>>) -> ! {
    loop {
        display
            .with(|view| {
                if view.render().is_err() {
                    warn!("display flush failed");
                }
            })
            .await;
        Timer::after(RENDER_PERIOD).await;
    }
}
