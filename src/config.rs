//! Compile-time configuration.
//!
//! Timing constants live here so every task reads the same numbers. The
//! accent color can be overridden at build time:
//!
//! ```sh
//! ACCENT="00A0FF" cargo build --release --features hardware
//! ```

use embassy_time::Duration;
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};
use palette::Srgb;

/// Panel size in landscape orientation.
pub const SCREEN_SIZE: Size = Size::new(320, 170);

/// How long the splash logo stays up before the tab view slides in.
pub const SPLASH_DURATION: Duration = Duration::from_millis(1500);

/// Battery indicator refresh. The battery monitor runs on every tab, outside
/// the focus coordinator; the other periods belong to [`TaskId`](crate::task::TaskId)s.
pub const BATTERY_PERIOD: Duration = Duration::from_millis(200);
pub const IMU_PERIOD: Duration = Duration::from_millis(100);
pub const MIC_PERIOD: Duration = Duration::from_millis(50);
pub const FFT_PERIOD: Duration = Duration::from_millis(100);
pub const TOUCH_PERIOD: Duration = Duration::from_millis(30);
pub const WIFI_PERIOD: Duration = Duration::from_secs(1);
pub const LED_ANIMATION_PERIOD: Duration = Duration::from_millis(80);
pub const LED_SOLID_PERIOD: Duration = Duration::from_millis(250);

/// Interval between flushes of the widget tree to the panel.
pub const RENDER_PERIOD: Duration = Duration::from_millis(30);

/// Microphone sample rate in Hz.
pub const SAMPLE_RATE: u32 = 16_000;

const ACCENT_STR: Option<&str> = option_env!("ACCENT");

/// Accent as 8-bit sRGB, used for the solid LED bar and highlights.
pub const ACCENT_RGB: (u8, u8, u8) = match ACCENT_STR {
    Some(s) => match parse_hex_rgb(s) {
        Some(rgb) => rgb,
        None => panic!("ACCENT must be a 6-char hex RGB string"),
    },
    None => (255, 153, 0),
};

pub const ACCENT: Rgb565 = Rgb565::new(ACCENT_RGB.0 >> 3, ACCENT_RGB.1 >> 2, ACCENT_RGB.2 >> 3);

pub const ACCENT_LED: Srgb<u8> = Srgb::new(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2);

/// Parse a hex color string like "FF8800" at const time.
/// Returns None if the string is not exactly 6 hex chars.
pub const fn parse_hex_rgb(s: &str) -> Option<(u8, u8, u8)> {
    let b = s.as_bytes();
    if b.len() != 6 {
        return None;
    }
    let Some(r) = hex_byte(b[0], b[1]) else { return None };
    let Some(g) = hex_byte(b[2], b[3]) else { return None };
    let Some(b) = hex_byte(b[4], b[5]) else { return None };
    Some((r, g, b))
}

const fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

const fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    let Some(h) = hex_digit(hi) else { return None };
    let Some(l) = hex_digit(lo) else { return None };
    Some(h << 4 | l)
}
