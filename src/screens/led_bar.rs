//! LED bar tab and the two tasks that share the bars.
//!
//! The animation runs on every tab except this one, where the solid task
//! takes over. Both reach the bars through one mutex; neither touches the
//! display.

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    mutex::Mutex,
};
use palette::{
    FromColor,
    Hsv,
    Srgb,
};

use super::{
    body,
    panel,
    rgb,
};
use crate::{
    config::ACCENT_LED,
    display_lock::DisplayLock,
    drivers::{
        BAR_COUNT,
        BarColors,
        LedBar,
    },
    error::Error,
    tabs::Tab,
    task::{
        Poll,
        TaskId,
    },
    ui::Surface,
};

pub type SharedBars<L> = Mutex<CriticalSectionRawMutex, L>;

/// Hue step between animation frames, in degrees.
const HUE_STEP: f32 = 12.0;

pub async fn display_led_bar_tab<S: Surface>(display: &DisplayLock<S>) {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::LedBar.name());
            let bg = panel(surface, tab, rgb(104, 43, 145), "LED Bars");
            body(
                surface,
                bg,
                "Ten WS2812 LEDs in two bars. They cycle through a rainbow everywhere else \
                 and hold the accent color while this tab is open.",
            );
        })
        .await;
}

/// One rainbow frame, bottom LED first.
#[allow(clippy::cast_precision_loss)]
pub fn rainbow(frame: u16) -> BarColors {
    core::array::from_fn(|i| {
        let hue = (f32::from(frame) * HUE_STEP + i as f32 * 360.0 / BAR_COUNT as f32) % 360.0;
        let hsv: Hsv = Hsv::new(hue, 1.0, 0.1);
        let rgb: Srgb = Srgb::from_color(hsv);
        rgb.into_format()
    })
}

pub struct LedAnimation<'a, L> {
    bars: &'a SharedBars<L>,
    frame: u16,
}

impl<'a, L> LedAnimation<'a, L> {
    pub const fn new(bars: &'a SharedBars<L>) -> Self {
        Self { bars, frame: 0 }
    }
}

impl<S, L: LedBar> Poll<S> for LedAnimation<'_, L> {
    const NAME: &'static str = TaskId::LedBarAnimation.name();

    async fn poll(&mut self, _display: &DisplayLock<S>) -> Result<(), Error> {
        let colors = rainbow(self.frame);
        self.frame = (self.frame + 1) % 30;
        self.bars.lock().await.show(&colors, &colors).await
    }
}

pub struct LedSolid<'a, L> {
    bars: &'a SharedBars<L>,
    color: Srgb<u8>,
}

impl<'a, L> LedSolid<'a, L> {
    pub const fn new(bars: &'a SharedBars<L>) -> Self {
        Self::with_color(bars, ACCENT_LED)
    }

    pub const fn with_color(bars: &'a SharedBars<L>, color: Srgb<u8>) -> Self {
        Self { bars, color }
    }
}

impl<S, L: LedBar> Poll<S> for LedSolid<'_, L> {
    const NAME: &'static str = TaskId::LedBarSolid.name();

    async fn poll(&mut self, _display: &DisplayLock<S>) -> Result<(), Error> {
        let colors = [self.color; BAR_COUNT];
        self.bars.lock().await.show(&colors, &colors).await
    }
}
