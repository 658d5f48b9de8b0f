//! # factory-firmware
//!
//! Factory demonstration firmware for the ESP32-S3 badge: a tabbed UI that
//! shows off every onboard peripheral, with one background task per
//! peripheral.
//!
//! Only the task that belongs to the focused tab runs. The
//! [`FocusCoordinator`](coordinator::FocusCoordinator) parks and wakes tasks
//! when the tab changes, and every screen update goes through one
//! [`DisplayLock`](display_lock::DisplayLock).
//!
//! - **`display_lock`**: mutual exclusion around the drawing surface
//! - **`task`**: run gates and the peripheral task loop
//! - **`tabs`**: tab identities and their task overrides
//! - **`coordinator`**: the tab-change state machine
//! - **`screens`**: tab content and the task bodies that refresh it
//! - **`ui`**: widget tree drawn with `embedded-graphics`
//! - **`board`** (`hardware` feature): pin assignment and drivers
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let display = DisplayLock::new(TabView::new(panel));
//! app::show_splash(&display).await;
//! let screens = app::build_tabs(&display, &mut secure_element).await;
//! let mut ui = UiContext::new(&display, &TabRegistry::DEFAULT, &GATES, screens, rails, rtc);
//! ui.start();
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod app;
pub mod config;
pub mod coordinator;
pub mod display_lock;
pub mod drivers;
pub mod error;
pub mod screens;
pub mod tabs;
pub mod task;
pub mod ui;

#[cfg(feature = "hardware")]
pub mod board;

pub use app::{
    Screens,
    UiContext,
    UiEvent,
};
pub use display_lock::DisplayLock;
pub use error::Error;
pub use tabs::{
    Tab,
    TabRegistry,
};
pub use task::{
    PeripheralTask,
    TaskGates,
    TaskId,
};
pub use ui::TabView;
