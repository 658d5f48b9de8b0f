//! Crate-wide error type.
//!
//! Driver calls report failures as values; no error ever crosses a task
//! boundary. Tasks log and carry on, one-shot renders log and skip the widget
//! that needed the value.

/// Failure reported by a peripheral driver or by the tab bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A bus transfer (I2C, SPI, I2S, RMT) to the peripheral failed.
    #[error("peripheral bus transfer failed")]
    Bus,
    /// The peripheral is not populated on this board revision.
    #[error("peripheral not fitted on this board")]
    NotFitted,
    /// The secure element answered with a non-success status code.
    #[error("secure element returned status {0}")]
    SecureElement(u8),
    /// The same tab identity appears twice in a registry table.
    #[error("tab registered twice")]
    DuplicateTab,
    /// A tab position or name that does not map to a known tab.
    #[error("unknown tab")]
    UnknownTab,
}
