//! Secure element tab. The serial number is read once at startup; a failed
//! read costs the serial label and nothing else.

use alloc::string::String;
use core::fmt::Write as _;

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
    drivers::{
        SERIAL_LEN,
        SecureElement,
    },
    tabs::Tab,
    ui::{
        Align,
        Style,
        Surface,
        WidgetId,
    },
};

pub const SERIAL_PREFIX: &str = "Serial # ";

/// `"Serial # "` followed by the serial as uppercase hex.
pub fn serial_label(serial: &[u8; SERIAL_LEN]) -> String {
    let mut text = String::with_capacity(SERIAL_PREFIX.len() + 2 * SERIAL_LEN);
    text.push_str(SERIAL_PREFIX);
    for byte in serial {
        let _ = write!(text, "{byte:02X}");
    }
    text
}

/// Build the crypto tab. Returns the serial label, if the element answered.
///
/// The display lock is released while the element is read.
pub async fn display_crypto_tab<S: Surface, E: SecureElement>(
    display: &DisplayLock<S>,
    element: &mut E,
) -> Option<WidgetId> {
    let bg = display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Crypto.name());
            let bg = panel(surface, tab, rgb(4, 151, 150), "ATECC608 Crypto-Auth");
            body(
                surface,
                bg,
                "The ATECC608 comes with pre-provisioned static certificates, along with \
                 Elliptic Curve Digital Signature Algorithm (ECDSA) sign/verify capability.",
            );
            bg
        })
        .await;

    let serial = match element.serial_number() {
        Ok(serial) => serial,
        Err(e) => {
            error!("Secure element failure: {}", e);
            return None;
        }
    };

    let text = serial_label(&serial);
    let widget = display
        .with(|surface| {
            label(
                surface,
                bg,
                &text,
                Style::body(Rgb565::BLACK),
                Align::BottomMid,
                Point::new(0, -14),
            )
        })
        .await;
    Some(widget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_uppercase_hex() {
        let serial = [0x01, 0x23, 0xab, 0xcd, 0xef, 0x00, 0x7f, 0x80, 0xee];
        let text = serial_label(&serial);
        assert_eq!(text, "Serial # 0123ABCDEF007F80EE");
        assert_eq!(text.len(), SERIAL_PREFIX.len() + 18);
    }
}
