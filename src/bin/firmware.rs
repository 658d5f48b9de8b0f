//! Factory firmware entry point.
//!
//! Spawns one embassy task per peripheral on this board, plus the renderer
//! and the UI event loop. Peripheral tasks start parked; the focus
//! coordinator wakes whichever the focused tab needs.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_sync::{
    mutex::Mutex,
    signal::Signal,
};
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    dma::DmaDescriptor,
    timer::timg::TimerGroup,
};
use esp_println as _;
use factory_firmware::{
    DisplayLock,
    PeripheralTask,
    TabRegistry,
    TabView,
    TaskGates,
    TaskId,
    UiContext,
    app,
    board::{
        self,
        BoardMicrophone,
        BoardRails,
        Buttons,
        Leds,
        Panel,
    },
    config::SAMPLE_RATE,
    drivers::{
        NotFitted,
        TimeOfDay,
        UptimeClock,
    },
    mk_static,
    screens::{
        led_bar::{
            LedAnimation,
            LedSolid,
            SharedBars,
        },
        mic::{
            FftTask,
            MicTask,
            Samples,
        },
    },
    split_resources,
    ui::WidgetId,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

type View = TabView<Panel<'static>>;
type Display = DisplayLock<View>;
type Bars = SharedBars<Leds<'static>>;
type Ui = UiContext<'static, View, TaskGates, BoardRails, UptimeClock>;

/// Run gates for every coordinated task.
static GATES: TaskGates = TaskGates::new();

/// Newest microphone block, from the capture task to the FFT task.
static SAMPLES: Samples = Signal::new();

#[embassy_executor::task]
async fn render_task(display: &'static Display) {
    app::render_loop(display).await
}

#[embassy_executor::task]
async fn mic_task(display: &'static Display, mic: BoardMicrophone<'static>, level: WidgetId) {
    let body = MicTask::new(mic, level, &SAMPLES);
    PeripheralTask::new(GATES.gate(TaskId::Microphone), display, body, TaskId::Microphone.period())
        .run()
        .await
}

#[embassy_executor::task]
async fn fft_task(display: &'static Display, bands: WidgetId) {
    let body = FftTask::new(&SAMPLES, bands);
    PeripheralTask::new(GATES.gate(TaskId::Fft), display, body, TaskId::Fft.period())
        .run()
        .await
}

#[embassy_executor::task]
async fn led_animation_task(display: &'static Display, bars: &'static Bars) {
    let body = LedAnimation::new(bars);
    PeripheralTask::new(GATES.gate(TaskId::LedBarAnimation), display, body, TaskId::LedBarAnimation.period())
        .run()
        .await
}

#[embassy_executor::task]
async fn led_solid_task(display: &'static Display, bars: &'static Bars) {
    let body = LedSolid::new(bars);
    PeripheralTask::new(GATES.gate(TaskId::LedBarSolid), display, body, TaskId::LedBarSolid.period())
        .run()
        .await
}

#[embassy_executor::task]
async fn ui_task(mut ui: Ui, mut buttons: Buttons) {
    let active = ui.start();
    info!("UI ready, {} tasks active", active.len());
    loop {
        let event = buttons.next_event().await;
        ui.handle(event).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = board::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 128 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let rails: BoardRails = resources.rails.into();
    let panel: Panel<'static> = resources.display.into();
    let display: &'static Display = mk_static!(Display, DisplayLock::new(TabView::new(panel)));
    spawner.must_spawn(render_task(display));

    app::show_splash(display).await;
    // No secure element on this board: the crypto tab logs and skips the serial.
    // No fuel gauge either, so no battery monitor; the icon stays at Full.
    let screens = app::build_tabs(display, &mut NotFitted).await;

    let bars: &'static Bars = mk_static!(Bars, Mutex::new(resources.leds.into()));
    let descriptors = mk_static!([DmaDescriptor; 8], [DmaDescriptor::EMPTY; 8]);
    let mic = BoardMicrophone::new(resources.mic, SAMPLE_RATE, descriptors);

    spawner.must_spawn(mic_task(display, mic, screens.mic.level));
    spawner.must_spawn(fft_task(display, screens.mic.bands));
    spawner.must_spawn(led_animation_task(display, bars));
    spawner.must_spawn(led_solid_task(display, bars));

    let clock = UptimeClock::new(TimeOfDay { hour: 12, minute: 0 });
    let ui = UiContext::new(display, &TabRegistry::DEFAULT, &GATES, screens, rails, clock);
    spawner.must_spawn(ui_task(ui, resources.buttons.into()));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
