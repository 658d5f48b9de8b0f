//! Clock tab. Nothing polls it: the time roller is refreshed once each time
//! the tab gains focus.

use alloc::format;

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
    display_lock::DisplayLock,
    drivers::Rtc,
    tabs::Tab,
    ui::{
        Align,
        Style,
        Surface,
        WidgetId,
        WidgetKind,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockWidgets {
    pub roller: WidgetId,
}

pub async fn display_clock_tab<S: Surface>(display: &DisplayLock<S>) -> ClockWidgets {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Clock.name());
            let bg = panel(surface, tab, rgb(0, 164, 228), "Real-Time Clock");
            body(surface, bg, "Hours and minutes, read from the clock each time this tab opens.");

            let roller = surface.create(bg, WidgetKind::Label);
            surface.set_style(roller, Style::title(Rgb565::BLACK));
            surface.set_text(roller, "--:--");
            surface.align(roller, Align::BottomMid, Point::new(0, -24));
            ClockWidgets { roller }
        })
        .await
}

/// Focus action for the clock tab. The caller holds the display lock.
pub fn update_roller_time<S: Surface, R: Rtc>(surface: &mut S, widgets: &ClockWidgets, rtc: &mut R) {
    match rtc.now() {
        Ok(time) => surface.set_text(widgets.roller, &format!("{time}")),
        Err(e) => error!("clock read failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::{
        drivers::TimeOfDay,
        error::Error,
        ui::TabView,
    };

    struct FixedRtc(Result<TimeOfDay, Error>);

    impl Rtc for FixedRtc {
        fn now(&mut self) -> Result<TimeOfDay, Error> {
            self.0
        }
    }

    #[test]
    fn focus_refresh_writes_the_time() {
        let display = DisplayLock::new(TabView::new(()));
        let widgets = block_on(display_clock_tab(&display));
        let mut view = display.into_inner();
        assert_eq!(view.text(widgets.roller), Some("--:--"));

        update_roller_time(&mut view, &widgets, &mut FixedRtc(Ok(TimeOfDay { hour: 9, minute: 41 })));
        assert_eq!(view.text(widgets.roller), Some("09:41"));

        update_roller_time(&mut view, &widgets, &mut FixedRtc(Err(Error::Bus)));
        assert_eq!(view.text(widgets.roller), Some("09:41"));
    }
}
