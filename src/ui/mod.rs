//! Render boundary.
//!
//! Screens and tasks only talk to the display through [`Surface`]: create a
//! tab, create a widget under a parent, set its text, style and placement.
//! Every call must be made while holding the
//! [`DisplayLock`](crate::display_lock::DisplayLock).

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

pub mod tab_view;

pub use tab_view::TabView;

/// Handle to a widget in the retained tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WidgetId(u16);

impl WidgetId {
    /// The full-screen layer drawn above every tab.
    pub const SCREEN: Self = Self(0);

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u16)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WidgetKind {
    /// Filled rectangle that groups children.
    Panel,
    /// Text; wraps when given a width.
    Label,
    /// Checkable button with a caption.
    Button,
}

/// Placement relative to the parent's area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    TopLeft,
    TopMid,
    TopRight,
    Center,
    BottomLeft,
    BottomMid,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    Title,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub text: Rgb565,
    pub background: Option<Rgb565>,
    pub font: Font,
}

impl Style {
    pub const fn body(text: Rgb565) -> Self {
        Self {
            text,
            background: None,
            font: Font::Body,
        }
    }

    pub const fn title(text: Rgb565) -> Self {
        Self {
            text,
            background: None,
            font: Font::Title,
        }
    }

    pub const fn panel(background: Rgb565) -> Self {
        Self {
            text: Rgb565::BLACK,
            background: Some(background),
            font: Font::Body,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::body(Rgb565::WHITE)
    }
}

/// The widget toolkit as seen by screens and tasks.
pub trait Surface {
    /// Add a tab page; tabs are shown in the order they are added.
    fn add_tab(&mut self, name: &'static str) -> WidgetId;

    fn create(&mut self, parent: WidgetId, kind: WidgetKind) -> WidgetId;

    fn set_text(&mut self, widget: WidgetId, text: &str);

    /// Current text, `None` for a widget that no longer exists.
    fn text(&self, widget: WidgetId) -> Option<&str>;

    fn set_style(&mut self, widget: WidgetId, style: Style);

    fn align(&mut self, widget: WidgetId, align: Align, offset: Point);

    /// Fixed size. A label with zero height keeps the width and wraps.
    fn set_size(&mut self, widget: WidgetId, size: Size);

    fn set_checked(&mut self, widget: WidgetId, checked: bool);

    /// Remove every descendant of `widget`.
    fn clear_children(&mut self, widget: WidgetId);

    fn tab_count(&self) -> usize;

    fn tab_name(&self, index: usize) -> Option<&'static str>;

    fn active_tab(&self) -> usize;

    /// Focus another tab. Returns `false` if the index is out of range or
    /// already focused.
    fn select_tab(&mut self, index: usize) -> bool;

    /// Show a BMP logo instead of the tabs, or go back to the tabs.
    fn set_splash(&mut self, logo: Option<&'static [u8]>);
}
