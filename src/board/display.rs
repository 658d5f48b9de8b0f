//! ST7789 panel, 320×170, over SPI with DMA.

use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    delay::Delay,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::{
        Config,
        Spi,
        SpiDmaBus,
    },
    time::Rate,
};
use mipidsi::{
    Builder,
    models::ST7789,
    options::{
        ColorInversion,
        Orientation,
        Rotation,
    },
};

use super::DisplayResources;
use crate::config::SCREEN_SIZE;

const DMA_LEN: usize = 32_000;

type SpiInterface<'a> =
    mipidsi::interface::SpiInterface<'a, ExclusiveDevice<SpiDmaBus<'a, Async>, Output<'a>, Delay>, Output<'a>>;

/// The drawing target wrapped by the UI's [`TabView`](crate::ui::TabView).
pub type Panel<'a> = mipidsi::Display<SpiInterface<'a>, ST7789, Output<'a>>;

impl From<DisplayResources<'static>> for Panel<'static> {
    fn from(res: DisplayResources<'static>) -> Self {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(DMA_LEN);
        let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer).expect("display rx buffer");
        let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).expect("display tx buffer");

        let mut delay = Delay::new();
        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
        let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
        rst.set_high();

        let spi = Spi::new(res.spi, Config::default().with_frequency(Rate::from_mhz(80)))
            .expect("display SPI config")
            .with_sck(res.sck)
            .with_mosi(res.mosi)
            .with_miso(res.miso)
            .with_dma(res.dma)
            .with_buffers(dma_rx_buf, dma_tx_buf)
            .into_async();

        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let device = ExclusiveDevice::new(spi, cs, delay).expect("display chip select");
        let buffer = crate::mk_static!([u8; DMA_LEN], [0_u8; DMA_LEN]);
        let interface = mipidsi::interface::SpiInterface::new(device, dc, buffer);

        // The panel is portrait-native; rotate into the landscape UI.
        #[allow(clippy::cast_possible_truncation)]
        Builder::new(ST7789, interface)
            .reset_pin(rst)
            .display_size(SCREEN_SIZE.height as u16, SCREEN_SIZE.width as u16)
            .invert_colors(ColorInversion::Inverted)
            .orientation(Orientation::new().rotate(Rotation::Deg90))
            .display_offset(35, 0)
            .init(&mut delay)
            .expect("ST7789 init")
    }
}
