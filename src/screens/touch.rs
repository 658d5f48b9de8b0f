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
    config::ACCENT,
    display_lock::DisplayLock,
    drivers::TouchPanel,
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
        WidgetKind,
    },
};

pub const CURSOR: &str = "+";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchWidgets {
    pub coordinates: WidgetId,
    pub cursor: WidgetId,
}

pub async fn display_touch_tab<S: Surface>(display: &DisplayLock<S>) -> TouchWidgets {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Touch.name());
            let bg = panel(surface, tab, rgb(0, 153, 102), "Touch Panel");
            body(surface, bg, "Touch anywhere on the screen.");
            let coordinates = label(
                surface,
                bg,
                "",
                Style::body(Rgb565::BLACK),
                Align::BottomMid,
                Point::new(0, -12),
            );

            // Positioned against the whole tab so touch points map directly.
            let cursor = surface.create(tab, WidgetKind::Label);
            surface.set_style(cursor, Style::title(ACCENT));
            TouchWidgets { coordinates, cursor }
        })
        .await
}

/// Focus action for the touch tab: forget the previous stroke. The caller
/// holds the display lock.
pub fn reset_touch_bg<S: Surface>(surface: &mut S, widgets: &TouchWidgets) {
    surface.set_text(widgets.cursor, "");
    surface.align(widgets.cursor, Align::TopLeft, Point::zero());
    surface.set_text(widgets.coordinates, "");
}

pub struct TouchTask<T> {
    panel: T,
    widgets: TouchWidgets,
    last: Option<Point>,
}

impl<T> TouchTask<T> {
    pub const fn new(panel: T, widgets: TouchWidgets) -> Self {
        Self {
            panel,
            widgets,
            last: None,
        }
    }
}

impl<S: Surface, T: TouchPanel> Poll<S> for TouchTask<T> {
    const NAME: &'static str = TaskId::Touch.name();

    async fn poll(&mut self, display: &DisplayLock<S>) -> Result<(), Error> {
        // Lifting the finger leaves the cursor where it was.
        let Some(point) = self.panel.touch_point()? else {
            self.last = None;
            return Ok(());
        };

        let last = self.last.replace(point);
        let widgets = self.widgets;
        display
            .with(|surface| {
                // A cleared cursor means the tab was reset since the last draw.
                if last == Some(point) && surface.text(widgets.cursor) == Some(CURSOR) {
                    return;
                }
                surface.set_text(widgets.cursor, CURSOR);
                // Centre the 10×20 glyph on the touch point.
                surface.align(widgets.cursor, Align::TopLeft, point - Point::new(5, 10));
                surface.set_text(widgets.coordinates, &format!("x {} y {}", point.x, point.y));
            })
            .await;
        Ok(())
    }
}
