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
    display_lock::DisplayLock,
    drivers::WifiStatus,
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
    },
};

pub async fn display_wifi_tab<S: Surface>(display: &DisplayLock<S>) -> WidgetId {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Wifi.name());
            let bg = panel(surface, tab, rgb(0, 102, 204), "Wi-Fi");
            body(
                surface,
                bg,
                "The ESP32-S3 radio supports 2.4 GHz 802.11 b/g/n. Connection state:",
            );
            label(
                surface,
                bg,
                "Status: --",
                Style::title(Rgb565::BLACK),
                Align::BottomMid,
                Point::new(0, -20),
            )
        })
        .await
}

pub struct WifiTask<W> {
    wifi: W,
    status: WidgetId,
}

impl<W> WifiTask<W> {
    pub const fn new(wifi: W, status: WidgetId) -> Self {
        Self { wifi, status }
    }
}

impl<S: Surface, W: WifiStatus> Poll<S> for WifiTask<W> {
    const NAME: &'static str = TaskId::Wifi.name();

    async fn poll(&mut self, display: &DisplayLock<S>) -> Result<(), Error> {
        let text = format!("Status: {}", self.wifi.state()?.label());
        let status = self.status;
        display.with(|surface| surface.set_text(status, &text)).await;
        Ok(())
    }
}
