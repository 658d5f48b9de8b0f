//! Debounced buttons, mapped to UI events.
//!
//! Left/up and right/down step through the tabs; A, B and START flip the
//! three supplies on the power tab.

use embassy_futures::select::select_array;
use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use super::ButtonResources;
use crate::{
    app::UiEvent,
    screens::power::PowerControl,
};

const DEBOUNCE: Duration = Duration::from_millis(20);

/// Event for each button, in the order they are polled.
const EVENTS: [UiEvent; 7] = [
    UiEvent::Previous,
    UiEvent::Previous,
    UiEvent::Next,
    UiEvent::Next,
    UiEvent::Toggle(PowerControl::Led),
    UiEvent::Toggle(PowerControl::Motor),
    UiEvent::Toggle(PowerControl::Screen),
];

pub struct Buttons {
    left: Input<'static>,
    up: Input<'static>,
    right: Input<'static>,
    down: Input<'static>,
    a: Input<'static>,
    b: Input<'static>,
    start: Input<'static>,
}

impl From<ButtonResources<'static>> for Buttons {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            left: Input::new(res.left, pull_up),
            up: Input::new(res.up, pull_up),
            right: Input::new(res.right, pull_up),
            down: Input::new(res.down, pull_up),
            a: Input::new(res.a, pull_up),
            b: Input::new(res.b, pull_up),
            start: Input::new(res.start, pull_up),
        }
    }
}

impl Buttons {
    /// Wait for the next debounced press.
    pub async fn next_event(&mut self) -> UiEvent {
        let (_, index) = select_array([
            debounce_press(&mut self.left),
            debounce_press(&mut self.up),
            debounce_press(&mut self.right),
            debounce_press(&mut self.down),
            debounce_press(&mut self.a),
            debounce_press(&mut self.b),
            debounce_press(&mut self.start),
        ])
        .await;
        EVENTS[index]
    }
}

/// Falling edge that is still low after the debounce delay. Buttons are
/// active low.
async fn debounce_press(button: &mut Input<'_>) {
    loop {
        button.wait_for_falling_edge().await;
        Timer::after(DEBOUNCE).await;
        if button.is_low() {
            return;
        }
    }
}
