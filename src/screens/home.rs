use super::{
    body,
    panel,
    rgb,
};
use crate::{
    display_lock::DisplayLock,
    tabs::Tab,
    ui::Surface,
};

pub async fn display_home_tab<S: Surface>(display: &DisplayLock<S>) {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Home.name());
            let bg = panel(surface, tab, rgb(255, 153, 0), "Factory Firmware");
            body(
                surface,
                bg,
                "Press LEFT and RIGHT to browse the peripherals on this board.\n\n\
                 Each tab wakes the task that feeds it and parks it again when you move on.",
            );
        })
        .await;
}
