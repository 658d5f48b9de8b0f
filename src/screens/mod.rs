//! Tab content: the one-shot `display_*_tab` routines and the task bodies
//! that keep each tab fresh.
//!
//! Every routine builds its widgets inside a single
//! [`DisplayLock::with`](crate::display_lock::DisplayLock::with) call, so
//! other tasks never see a half-built tab.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::ui::{
    Align,
    Style,
    Surface,
    WidgetId,
    WidgetKind,
};

pub mod clock;
pub mod crypto;
pub mod cta;
pub mod home;
pub mod imu;
pub mod led_bar;
pub mod mic;
pub mod power;
pub mod touch;
pub mod wifi;

/// Top-left corner of the body panel inside a tab.
pub const PANEL_ORIGIN: Point = Point::new(8, 8);
pub const PANEL_SIZE: Size = Size::new(304, 154);

/// Width at which body text wraps.
pub const BODY_WIDTH: u32 = 272;

/// 8-bit RGB to the panel's 5-6-5 format.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

/// Text color that stays readable on `background`.
pub fn ink_for(background: Rgb565) -> Rgb565 {
    if background.g() < 24 { Rgb565::WHITE } else { Rgb565::BLACK }
}

/// Add the colored body panel with a centered title; returns the panel.
pub fn panel<S: Surface>(surface: &mut S, tab: WidgetId, color: Rgb565, title: &str) -> WidgetId {
    let bg = surface.create(tab, WidgetKind::Panel);
    surface.align(bg, Align::TopLeft, PANEL_ORIGIN);
    surface.set_size(bg, PANEL_SIZE);
    surface.set_style(bg, Style::panel(color));

    let title_label = surface.create(bg, WidgetKind::Label);
    surface.set_style(title_label, Style::title(ink_for(color)));
    surface.set_text(title_label, title);
    surface.align(title_label, Align::TopMid, Point::new(0, 6));
    bg
}

/// Add wrapped black body text under the panel title.
pub fn body<S: Surface>(surface: &mut S, bg: WidgetId, text: &str) -> WidgetId {
    label(surface, bg, text, Style::body(Rgb565::BLACK), Align::TopLeft, Point::new(16, 32))
}

/// Add a wrapped label at the given spot.
pub fn label<S: Surface>(
    surface: &mut S,
    parent: WidgetId,
    text: &str,
    style: Style,
    align: Align,
    offset: Point,
) -> WidgetId {
    let label = surface.create(parent, WidgetKind::Label);
    surface.set_style(label, style);
    surface.set_size(label, Size::new(BODY_WIDTH, 0));
    surface.set_text(label, text);
    surface.align(label, align, offset);
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_stay_readable() {
        assert_eq!(ink_for(rgb(35, 47, 62)), Rgb565::WHITE);
        assert_eq!(ink_for(rgb(255, 153, 0)), Rgb565::BLACK);
        assert_eq!(ink_for(rgb(4, 151, 150)), Rgb565::BLACK);
    }
}
