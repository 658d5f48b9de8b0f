//! Microphone tab: a level meter fed by the capture task and a band
//! spectrum computed by the FFT task from the latest captured block.

use alloc::string::String;
use core::fmt::Write as _;

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    signal::Signal,
};
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
    config::SAMPLE_RATE,
    display_lock::DisplayLock,
    drivers::{
        BLOCK_LEN,
        Microphone,
        SampleBlock,
    },
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

/// Hand-off of the newest block from capture to analysis.
pub type Samples = Signal<CriticalSectionRawMutex, SampleBlock>;

/// Centre frequencies of the spectrum bands, in Hz.
pub const BANDS: [f32; 8] = [125.0, 250.0, 500.0, 1000.0, 2000.0, 3000.0, 4000.0, 6000.0];

const METER_WIDTH: usize = 24;
const BAND_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicWidgets {
    pub level: WidgetId,
    pub bands: WidgetId,
}

pub async fn display_microphone_tab<S: Surface>(display: &DisplayLock<S>) -> MicWidgets {
    display
        .with(|surface| {
            let tab = surface.add_tab(Tab::Microphone.name());
            let bg = panel(surface, tab, rgb(255, 153, 0), "Microphone");
            body(surface, bg, "Make some noise.");
            let ink = Style::body(Rgb565::BLACK);
            let level = label(surface, bg, &meter(0), ink, Align::TopLeft, Point::new(16, 46));
            let bands = label(surface, bg, "", ink, Align::TopLeft, Point::new(16, 62));
            MicWidgets { level, bands }
        })
        .await
}

/// Peak level as a text meter.
pub fn meter(peak: u16) -> String {
    let filled = usize::from(peak) * METER_WIDTH / usize::from(i16::MAX.unsigned_abs());
    let filled = filled.min(METER_WIDTH);
    let mut text = String::from("Level [");
    text.extend(core::iter::repeat_n('#', filled));
    text.extend(core::iter::repeat_n('.', METER_WIDTH - filled));
    let _ = write!(text, "] {peak}");
    text
}

/// Magnitude of one frequency in `samples`, normalised so a full-scale sine
/// at exactly that frequency reads close to 1.0.
#[allow(clippy::cast_precision_loss)]
pub fn goertzel(samples: &[i16], frequency: f32, sample_rate: f32) -> f32 {
    let n = samples.len() as f32;
    if samples.is_empty() {
        return 0.0;
    }
    let bin = libm::roundf(n * frequency / sample_rate);
    let omega = 2.0 * core::f32::consts::PI * bin / n;
    let coeff = 2.0 * libm::cosf(omega);

    let (mut s1, mut s2) = (0.0_f32, 0.0_f32);
    for &sample in samples {
        let s0 = f32::from(sample) / 32768.0 + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    let power = s1 * s1 + s2 * s2 - coeff * s1 * s2;
    libm::sqrtf(power.max(0.0)) / (n / 2.0)
}

#[allow(clippy::cast_precision_loss)]
pub fn band_magnitudes(block: &SampleBlock) -> [f32; BANDS.len()] {
    BANDS.map(|frequency| goertzel(block, frequency, SAMPLE_RATE as f32))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn spectrum(magnitudes: &[f32; BANDS.len()]) -> String {
    let mut text = String::new();
    for (frequency, magnitude) in BANDS.iter().zip(magnitudes) {
        let len = ((magnitude * (BAND_WIDTH * 2) as f32) as usize).min(BAND_WIDTH);
        let _ = write!(text, "{:>5} ", *frequency as u32);
        text.extend(core::iter::repeat_n('=', len));
        text.push('\n');
    }
    text.pop();
    text
}

/// Captures a block per cycle, shows its peak and hands it to [`FftTask`].
pub struct MicTask<'a, M> {
    mic: M,
    block: SampleBlock,
    level: WidgetId,
    samples: &'a Samples,
}

impl<'a, M> MicTask<'a, M> {
    pub const fn new(mic: M, level: WidgetId, samples: &'a Samples) -> Self {
        Self {
            mic,
            block: [0; BLOCK_LEN],
            level,
            samples,
        }
    }
}

impl<S: Surface, M: Microphone> Poll<S> for MicTask<'_, M> {
    const NAME: &'static str = TaskId::Microphone.name();

    async fn poll(&mut self, display: &DisplayLock<S>) -> Result<(), Error> {
        self.mic.read_block(&mut self.block)?;
        let peak = self.block.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        self.samples.signal(self.block);

        let text = meter(peak);
        let level = self.level;
        display.with(|surface| surface.set_text(level, &text)).await;
        Ok(())
    }
}

/// Turns the newest captured block into a band spectrum.
pub struct FftTask<'a> {
    samples: &'a Samples,
    bands: WidgetId,
}

impl<'a> FftTask<'a> {
    pub const fn new(samples: &'a Samples, bands: WidgetId) -> Self {
        Self { samples, bands }
    }
}

impl<S: Surface> Poll<S> for FftTask<'_> {
    const NAME: &'static str = TaskId::Fft.name();

    async fn poll(&mut self, display: &DisplayLock<S>) -> Result<(), Error> {
        // Nothing new since the last cycle: keep the old spectrum.
        let Some(block) = self.samples.try_take() else {
            return Ok(());
        };
        let text = spectrum(&band_magnitudes(&block));
        let bands = self.bands;
        display.with(|surface| surface.set_text(bands, &text)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::ui::TabView;

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn tone(frequency: f32, amplitude: f32) -> SampleBlock {
        core::array::from_fn(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (amplitude * 32767.0 * libm::sinf(2.0 * core::f32::consts::PI * frequency * t)) as i16
        })
    }

    struct Tone(SampleBlock);

    impl Microphone for Tone {
        fn read_block(&mut self, block: &mut SampleBlock) -> Result<(), Error> {
            *block = self.0;
            Ok(())
        }
    }

    #[test]
    fn pure_tone_peaks_in_its_band() {
        let magnitudes = band_magnitudes(&tone(1000.0, 0.5));
        let loudest = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(loudest, Some(3));
        assert!((magnitudes[3] - 0.5).abs() < 0.05, "{magnitudes:?}");
        for (i, magnitude) in magnitudes.iter().enumerate() {
            if i != 3 {
                assert!(*magnitude < 0.05, "band {i}: {magnitude}");
            }
        }
    }

    #[test]
    fn silence_is_flat() {
        assert!(band_magnitudes(&[0; BLOCK_LEN]).iter().all(|m| *m == 0.0));
        assert_eq!(goertzel(&[], 1000.0, 16_000.0), 0.0);
    }

    #[test]
    fn meter_scales_with_peak() {
        assert_eq!(meter(0), "Level [........................] 0");
        assert_eq!(meter(i16::MAX.unsigned_abs()), "Level [########################] 32767");
        assert!(meter(16_384).starts_with("Level [############......"));
    }

    #[test]
    fn capture_feeds_the_spectrum() {
        let samples = Samples::new();
        let display = DisplayLock::new(TabView::new(()));
        let widgets = block_on(display_microphone_tab(&display));

        let mut capture = MicTask::new(Tone(tone(1000.0, 0.5)), widgets.level, &samples);
        let mut fft = FftTask::new(&samples, widgets.bands);

        block_on(Poll::poll(&mut fft, &display)).unwrap();
        assert_eq!(block_on(display.with(|v| v.text(widgets.bands).map(String::from))), Some(String::new()));

        block_on(Poll::poll(&mut capture, &display)).unwrap();
        block_on(Poll::poll(&mut fft, &display)).unwrap();
        assert!(samples.try_take().is_none());

        let view = display.into_inner();
        let level = view.text(widgets.level).unwrap();
        assert!(level.starts_with("Level [##########"), "{level}");
        let spectrum = view.text(widgets.bands).unwrap();
        assert_eq!(spectrum.lines().count(), BANDS.len());
        let loud = spectrum.lines().nth(3).unwrap();
        assert!(loud.starts_with(" 1000 ") && loud.ends_with('='), "{loud}");
    }
}
