//! Retained widget tree drawn with `embedded-graphics`.
//!
//! Widgets live in a flat arena; the tree is expressed through parent
//! handles. Nothing is drawn until [`TabView::render`] runs, which repaints
//! the focused tab and the screen layer whenever something changed.

// Widget geometry is at most 320×170, so the u32/i32 casts cannot wrap.
#![allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]

use alloc::{
    string::String,
    vec::Vec,
};

use embedded_graphics::{
    image::Image,
    mono_font::{
        MonoFont,
        MonoTextStyle,
        iso_8859_1::{
            FONT_6X10,
            FONT_10X20,
        },
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        PrimitiveStyle,
        Rectangle,
        RoundedRectangle,
    },
    text::{
        Alignment,
        Baseline,
        Text,
        TextStyleBuilder,
    },
};
use embedded_text::{
    TextBox,
    alignment::HorizontalAlignment,
    style::{
        HeightMode,
        TextBoxStyleBuilder,
    },
};
use tinybmp::Bmp;

use super::{
    Align,
    Font,
    Style,
    Surface,
    WidgetId,
    WidgetKind,
};
use crate::config::ACCENT;

pub const BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Fill of an unchecked button.
pub const BUTTON_IDLE: Rgb565 = Rgb565::new(10, 20, 10);

const BUTTON_PADDING: Size = Size::new(12, 10);

impl Font {
    pub const fn mono(self) -> &'static MonoFont<'static> {
        match self {
            Self::Title => &FONT_10X20,
            Self::Body => &FONT_6X10,
        }
    }
}

struct Node {
    parent: Option<WidgetId>,
    kind: WidgetKind,
    text: String,
    style: Style,
    align: Align,
    offset: Point,
    size: Option<Size>,
    checked: bool,
    live: bool,
}

impl Node {
    fn new(parent: Option<WidgetId>, kind: WidgetKind) -> Self {
        Self {
            parent,
            kind,
            text: String::new(),
            style: Style::default(),
            align: Align::TopLeft,
            offset: Point::zero(),
            size: None,
            checked: false,
            live: true,
        }
    }
}

struct Page {
    name: &'static str,
    root: WidgetId,
}

/// Tabbed view with hidden tab buttons, owning the display it draws to.
pub struct TabView<D> {
    display: D,
    nodes: Vec<Node>,
    pages: Vec<Page>,
    active: usize,
    splash: Option<&'static [u8]>,
    dirty: bool,
}

impl<D> TabView<D> {
    pub fn new(display: D) -> Self {
        let mut nodes = Vec::new();
        nodes.push(Node::new(None, WidgetKind::Panel));
        Self {
            display,
            nodes,
            pages: Vec::new(),
            active: 0,
            splash: None,
            dirty: true,
        }
    }

    pub const fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Whether the next [`render`](Self::render) will repaint.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn splash(&self) -> Option<&'static [u8]> {
        self.splash
    }

    pub fn style(&self, widget: WidgetId) -> Option<Style> {
        self.node(widget).map(|node| node.style)
    }

    pub fn is_checked(&self, widget: WidgetId) -> bool {
        self.node(widget).is_some_and(|node| node.checked)
    }

    /// Root widget of the tab at `index`.
    pub fn tab_root(&self, index: usize) -> Option<WidgetId> {
        self.pages.get(index).map(|page| page.root)
    }

    /// Non-empty texts of every live widget below `widget`, in creation order.
    pub fn texts_under(&self, widget: WidgetId) -> Vec<&str> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| {
                node.live && !node.text.is_empty() && self.is_descendant(WidgetId::new(*index), widget)
            })
            .map(|(_, node)| node.text.as_str())
            .collect()
    }

    fn node(&self, widget: WidgetId) -> Option<&Node> {
        self.nodes.get(widget.index()).filter(|node| node.live)
    }

    fn edit(&mut self, widget: WidgetId, f: impl FnOnce(&mut Node)) {
        if let Some(node) = self.nodes.get_mut(widget.index()).filter(|node| node.live) {
            f(node);
            self.dirty = true;
        }
    }

    fn push(&mut self, node: Node) -> WidgetId {
        let id = WidgetId::new(self.nodes.len());
        self.nodes.push(node);
        self.dirty = true;
        id
    }

    fn is_descendant(&self, widget: WidgetId, ancestor: WidgetId) -> bool {
        let mut cursor = self.nodes.get(widget.index()).and_then(|node| node.parent);
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.nodes.get(parent.index()).and_then(|node| node.parent);
        }
        false
    }
}

impl<D: DrawTarget<Color = Rgb565>> TabView<D> {
    /// Repaint if anything changed since the last call. Returns whether a
    /// frame was drawn.
    pub fn render(&mut self) -> Result<bool, D::Error> {
        if !self.dirty {
            return Ok(false);
        }

        let bounds = self.display.bounding_box();
        if let Some(logo) = self.splash {
            draw_splash(&mut self.display, logo)?;
        } else {
            self.display.clear(BACKGROUND)?;
            if let Some(page) = self.pages.get(self.active) {
                draw_subtree(&self.nodes, &mut self.display, page.root, bounds)?;
            }
            draw_subtree(&self.nodes, &mut self.display, WidgetId::SCREEN, bounds)?;
        }

        self.dirty = false;
        Ok(true)
    }
}

impl<D> Surface for TabView<D> {
    fn add_tab(&mut self, name: &'static str) -> WidgetId {
        let root = self.push(Node::new(None, WidgetKind::Panel));
        self.pages.push(Page { name, root });
        root
    }

    fn create(&mut self, parent: WidgetId, kind: WidgetKind) -> WidgetId {
        self.push(Node::new(Some(parent), kind))
    }

    fn set_text(&mut self, widget: WidgetId, text: &str) {
        if self.node(widget).is_some_and(|node| node.text != text) {
            self.edit(widget, |node| {
                node.text.clear();
                node.text.push_str(text);
            });
        }
    }

    fn text(&self, widget: WidgetId) -> Option<&str> {
        self.node(widget).map(|node| node.text.as_str())
    }

    fn set_style(&mut self, widget: WidgetId, style: Style) {
        if self.node(widget).is_some_and(|node| node.style != style) {
            self.edit(widget, |node| node.style = style);
        }
    }

    fn align(&mut self, widget: WidgetId, align: Align, offset: Point) {
        self.edit(widget, |node| {
            node.align = align;
            node.offset = offset;
        });
    }

    fn set_size(&mut self, widget: WidgetId, size: Size) {
        self.edit(widget, |node| node.size = Some(size));
    }

    fn set_checked(&mut self, widget: WidgetId, checked: bool) {
        if self.node(widget).is_some_and(|node| node.checked != checked) {
            self.edit(widget, |node| node.checked = checked);
        }
    }

    fn clear_children(&mut self, widget: WidgetId) {
        let doomed: Vec<usize> = (0..self.nodes.len())
            .filter(|index| self.is_descendant(WidgetId::new(*index), widget))
            .collect();
        for index in doomed {
            self.nodes[index].live = false;
        }
        self.dirty = true;
    }

    fn tab_count(&self) -> usize {
        self.pages.len()
    }

    fn tab_name(&self, index: usize) -> Option<&'static str> {
        self.pages.get(index).map(|page| page.name)
    }

    fn active_tab(&self) -> usize {
        self.active
    }

    fn select_tab(&mut self, index: usize) -> bool {
        if index >= self.pages.len() || index == self.active {
            return false;
        }
        self.active = index;
        self.dirty = true;
        true
    }

    fn set_splash(&mut self, logo: Option<&'static [u8]>) {
        self.splash = logo;
        self.dirty = true;
    }
}

fn text_size(text: &str, font: &MonoFont<'_>) -> Size {
    let columns = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    let rows = text.lines().count();
    Size::new(
        columns as u32 * font.character_size.width,
        rows as u32 * font.character_size.height,
    )
}

fn wrapped_size(text: &str, font: &'static MonoFont<'static>, width: u32) -> Size {
    let style = TextBoxStyleBuilder::new().height_mode(HeightMode::FitToText).build();
    TextBox::with_textbox_style(
        text,
        Rectangle::new(Point::zero(), Size::new(width, 0)),
        MonoTextStyle::new(font, Rgb565::WHITE),
        style,
    )
    .bounds
    .size
}

fn place(parent: Rectangle, size: Size, align: Align, offset: Point) -> Point {
    let dx = parent.size.width as i32 - size.width as i32;
    let dy = parent.size.height as i32 - size.height as i32;
    let (x, y) = match align {
        Align::TopLeft => (0, 0),
        Align::TopMid => (dx / 2, 0),
        Align::TopRight => (dx, 0),
        Align::Center => (dx / 2, dy / 2),
        Align::BottomLeft => (0, dy),
        Align::BottomMid => (dx / 2, dy),
        Align::BottomRight => (dx, dy),
    };
    parent.top_left + Point::new(x, y) + offset
}

fn layout(node: &Node, parent: Rectangle) -> Rectangle {
    let font = node.style.font.mono();
    let size = match (node.kind, node.size) {
        (WidgetKind::Label, Some(size)) if size.height == 0 => wrapped_size(&node.text, font, size.width),
        (_, Some(size)) => size,
        (WidgetKind::Panel, None) => parent.size,
        (WidgetKind::Label, None) => text_size(&node.text, font),
        (WidgetKind::Button, None) => text_size(&node.text, font) + BUTTON_PADDING * 2,
    };
    Rectangle::new(place(parent, size, node.align, node.offset), size)
}

fn draw_subtree<D: DrawTarget<Color = Rgb565>>(
    nodes: &[Node],
    display: &mut D,
    widget: WidgetId,
    parent: Rectangle,
) -> Result<(), D::Error> {
    let Some(node) = nodes.get(widget.index()).filter(|node| node.live) else {
        return Ok(());
    };
    let area = layout(node, parent);
    draw_node(node, area, display)?;

    for (index, child) in nodes.iter().enumerate() {
        if child.live && child.parent == Some(widget) {
            draw_subtree(nodes, display, WidgetId::new(index), area)?;
        }
    }
    Ok(())
}

fn draw_node<D: DrawTarget<Color = Rgb565>>(node: &Node, area: Rectangle, display: &mut D) -> Result<(), D::Error> {
    let character_style = MonoTextStyle::new(node.style.font.mono(), node.style.text);
    match node.kind {
        WidgetKind::Panel => {
            if let Some(background) = node.style.background {
                area.into_styled(PrimitiveStyle::with_fill(background))
                    .draw(display)?;
            }
        }
        WidgetKind::Label => {
            if let Some(background) = node.style.background {
                area.into_styled(PrimitiveStyle::with_fill(background))
                    .draw(display)?;
            }
            let alignment = match node.align {
                Align::TopMid | Align::Center | Align::BottomMid => HorizontalAlignment::Center,
                _ => HorizontalAlignment::Left,
            };
            let style = TextBoxStyleBuilder::new()
                .height_mode(HeightMode::FitToText)
                .alignment(alignment)
                .build();
            TextBox::with_textbox_style(&node.text, area, character_style, style).draw(display)?;
        }
        WidgetKind::Button => {
            let fill = if node.checked { ACCENT } else { BUTTON_IDLE };
            RoundedRectangle::with_equal_corners(area, Size::new(6, 6))
                .into_styled(PrimitiveStyle::with_fill(fill))
                .draw(display)?;
            let centered = TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Middle)
                .build();
            Text::with_text_style(&node.text, area.center(), character_style, centered).draw(display)?;
        }
    }
    Ok(())
}

fn draw_splash<D: DrawTarget<Color = Rgb565>>(display: &mut D, logo: &[u8]) -> Result<(), D::Error> {
    display.clear(Rgb565::WHITE)?;
    let Ok(bmp) = Bmp::<Rgb565>::from_slice(logo) else {
        warn!("splash logo is not a valid BMP");
        return Ok(());
    };
    let bounds = display.bounding_box();
    Image::new(&bmp, place(bounds, bmp.size(), Align::Center, Point::zero())).draw(display)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        vec,
        vec::Vec,
    };

    use embedded_graphics::{
        Pixel,
        pixelcolor::Rgb565,
        prelude::*,
    };

    use super::*;
    use crate::config::SCREEN_SIZE;

    struct Canvas {
        pixels: Vec<Rgb565>,
    }

    impl Canvas {
        fn new() -> Self {
            Self {
                pixels: vec![Rgb565::MAGENTA; (SCREEN_SIZE.width * SCREEN_SIZE.height) as usize],
            }
        }

        fn at(&self, x: u32, y: u32) -> Rgb565 {
            self.pixels[(y * SCREEN_SIZE.width + x) as usize]
        }
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            SCREEN_SIZE
        }
    }

    impl DrawTarget for Canvas {
        type Color = Rgb565;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y))
                    && x < SCREEN_SIZE.width
                    && y < SCREEN_SIZE.height
                {
                    self.pixels[(y * SCREEN_SIZE.width + x) as usize] = color;
                }
            }
            Ok(())
        }
    }

    fn square(view: &mut TabView<Canvas>, parent: WidgetId, at: Point, color: Rgb565) -> WidgetId {
        let panel = view.create(parent, WidgetKind::Panel);
        view.set_style(panel, Style::panel(color));
        view.align(panel, Align::TopLeft, at);
        view.set_size(panel, Size::new(20, 20));
        panel
    }

    #[test]
    fn tabs_keep_insertion_order() {
        let mut view = TabView::new(Canvas::new());
        view.add_tab("HOME");
        view.add_tab("CLOCK");
        view.add_tab("POWER");

        assert_eq!(view.tab_count(), 3);
        assert_eq!(view.tab_name(1), Some("CLOCK"));
        assert_eq!(view.tab_name(3), None);
        assert_eq!(view.active_tab(), 0);
        assert!(!view.select_tab(0));
        assert!(!view.select_tab(3));
        assert!(view.select_tab(2));
        assert_eq!(view.active_tab(), 2);
    }

    #[test]
    fn only_the_focused_tab_is_drawn() {
        let mut view = TabView::new(Canvas::new());
        let home = view.add_tab("HOME");
        let clock = view.add_tab("CLOCK");
        square(&mut view, home, Point::new(10, 10), Rgb565::GREEN);
        square(&mut view, clock, Point::new(50, 50), Rgb565::BLUE);

        assert_eq!(view.render(), Ok(true));
        assert_eq!(view.display().at(15, 15), Rgb565::GREEN);
        assert_eq!(view.display().at(55, 55), BACKGROUND);

        view.select_tab(1);
        assert_eq!(view.render(), Ok(true));
        assert_eq!(view.display().at(15, 15), BACKGROUND);
        assert_eq!(view.display().at(55, 55), Rgb565::BLUE);
    }

    #[test]
    fn screen_layer_sits_above_tabs() {
        let mut view = TabView::new(Canvas::new());
        let home = view.add_tab("HOME");
        let tab_fill = view.create(home, WidgetKind::Panel);
        view.set_style(tab_fill, Style::panel(Rgb565::GREEN));
        let corner = view.create(WidgetId::SCREEN, WidgetKind::Panel);
        view.set_style(corner, Style::panel(Rgb565::YELLOW));
        view.set_size(corner, Size::new(10, 10));
        view.align(corner, Align::TopRight, Point::zero());

        view.render().unwrap();
        assert_eq!(view.display().at(315, 5), Rgb565::YELLOW);
        assert_eq!(view.display().at(305, 5), Rgb565::GREEN);
    }

    #[test]
    fn clean_view_skips_rendering() {
        let mut view = TabView::new(Canvas::new());
        let home = view.add_tab("HOME");
        let label = view.create(home, WidgetKind::Label);
        view.set_text(label, "12:00");

        assert_eq!(view.render(), Ok(true));
        assert_eq!(view.render(), Ok(false));
        view.set_text(label, "12:00");
        assert!(!view.is_dirty());
        view.set_text(label, "12:01");
        assert!(view.is_dirty());
        assert_eq!(view.text(label), Some("12:01"));
    }

    #[test]
    fn clearing_removes_only_descendants() {
        let mut view = TabView::new(Canvas::new());
        let home = view.add_tab("HOME");
        let panel = view.create(home, WidgetKind::Panel);
        let title = view.create(panel, WidgetKind::Label);
        view.set_text(title, "Title");
        let inner = view.create(panel, WidgetKind::Panel);
        let nested = view.create(inner, WidgetKind::Label);
        view.set_text(nested, "Nested");
        assert_eq!(view.texts_under(home), ["Title", "Nested"]);

        view.clear_children(panel);
        assert!(view.texts_under(home).is_empty());
        assert_eq!(view.text(nested), None);
        view.set_text(nested, "ignored");
        assert_eq!(view.text(nested), None);
        assert!(view.style(panel).is_some());
    }

    #[test]
    fn checked_buttons_use_the_accent() {
        let mut view = TabView::new(Canvas::new());
        let home = view.add_tab("HOME");
        let button = view.create(home, WidgetKind::Button);
        view.set_text(button, "LED");
        view.set_size(button, Size::new(60, 30));
        view.align(button, Align::TopLeft, Point::new(100, 100));

        view.render().unwrap();
        assert_eq!(view.display().at(103, 115), BUTTON_IDLE);

        view.set_checked(button, true);
        assert!(view.is_checked(button));
        view.render().unwrap();
        assert_eq!(view.display().at(103, 115), ACCENT);
    }

    #[test]
    fn wrapped_labels_grow_downwards() {
        let font = Font::Body.mono();
        let one_line = wrapped_size("short", font, 120);
        let many = wrapped_size("a long sentence that cannot possibly fit on a single line", font, 120);
        assert_eq!(one_line.height, font.character_size.height);
        assert!(many.height > one_line.height);
        assert_eq!(many.width, 120);
    }

    #[test]
    fn splash_replaces_the_tabs() {
        let mut view = TabView::new(Canvas::new());
        let home = view.add_tab("HOME");
        square(&mut view, home, Point::new(0, 0), Rgb565::GREEN);
        view.set_splash(Some(crate::app::SPLASH_LOGO));

        view.render().unwrap();
        assert_eq!(view.display().at(5, 5), Rgb565::WHITE);
        assert_ne!(view.display().at(160, 85), Rgb565::WHITE);

        view.set_splash(None);
        view.render().unwrap();
        assert_eq!(view.display().at(5, 5), Rgb565::GREEN);
    }

    #[test]
    fn garbage_splash_leaves_a_white_screen() {
        static NOT_A_BMP: [u8; 4] = [1, 2, 3, 4];
        let mut view = TabView::new(Canvas::new());
        view.set_splash(Some(&NOT_A_BMP));
        assert_eq!(view.render(), Ok(true));
        assert_eq!(view.display().at(160, 85), Rgb565::WHITE);
    }
}
