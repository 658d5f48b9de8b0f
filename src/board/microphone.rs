//! I2S MEMS microphone: WS on GPIO8, data on GPIO3, bit clock on GPIO46.

use esp_hal::{
    Blocking,
    dma::DmaDescriptor,
    i2s::master::{
        Channels,
        Config,
        DataFormat,
        I2s,
        I2sRx,
    },
    time::Rate,
};

use super::MicResources;
use crate::{
    drivers::{
        Microphone,
        SampleBlock,
    },
    error::Error,
};

pub struct BoardMicrophone<'a> {
    rx: I2sRx<'a, Blocking>,
}

impl<'a> BoardMicrophone<'a> {
    /// `descriptors` must outlive the driver; allocate them with
    /// [`mk_static!`](crate::mk_static).
    pub fn new(res: MicResources<'a>, sample_rate: u32, descriptors: &'static mut [DmaDescriptor]) -> Self {
        let i2s = I2s::new(
            res.i2s,
            res.dma,
            Config::new_tdm_philips()
                .with_sample_rate(Rate::from_hz(sample_rate))
                .with_data_format(DataFormat::Data16Channel16)
                .with_channels(Channels::MONO),
        )
        .expect("I2S config");

        let rx = i2s
            .i2s_rx
            .with_bclk(res.dio)
            .with_ws(res.ws)
            .with_din(res.sd)
            .build(descriptors);
        Self { rx }
    }
}

impl Microphone for BoardMicrophone<'_> {
    fn read_block(&mut self, block: &mut SampleBlock) -> Result<(), Error> {
        self.rx.read_words(block).map_err(|e| {
            debug!("I2S read failed: {}", e);
            Error::Bus
        })
    }
}
