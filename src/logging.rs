// Logging shim: `defmt` on the board, `tracing` everywhere else.
//
// Format strings must stick to bare `{}` placeholders so both backends accept
// them; arguments need `defmt::Format` and `core::fmt::Display`.

#[cfg(feature = "defmt")]
macro_rules! error {
    ($($arg:tt)*) => {{
        ::defmt::error!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($arg:tt)*) => {{
        ::defmt::warn!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($($arg:tt)*) => {{
        ::defmt::info!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => {{
        ::defmt::debug!($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! error {
    ($($arg:tt)*) => {{
        ::tracing::error!($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{
        ::tracing::warn!($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{
        ::tracing::info!($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{
        ::tracing::debug!($($arg)*);
    }};
}
