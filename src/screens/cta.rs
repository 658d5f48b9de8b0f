use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use super::{
    label,
    panel,
    rgb,
};
use crate::{
    config::ACCENT,
    display_lock::DisplayLock,
    tabs::Tab,
    ui::{
        Align,
        Style,
        Surface,
    },
};

pub async fn display_cta_tab<S: Surface>(display: &DisplayLock<S>) {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::NextSteps.name());
            let bg = panel(surface, tab, rgb(35, 47, 62), "Next Steps");
            label(
                surface,
                bg,
                "Every tab here is a few dozen lines of async Rust. Add your own peripheral, \
                 give it a task and an entry in the tab table, and flash it:",
                Style::body(Rgb565::WHITE),
                Align::TopLeft,
                Point::new(16, 36),
            );
            label(
                surface,
                bg,
                "cargo run --release --features hardware",
                Style::body(ACCENT),
                Align::BottomMid,
                Point::new(0, -20),
            );
        })
        .await;
}
