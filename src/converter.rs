use crate::{
    Accu, ClockGen, Config, Error, I2s, I2sOut, Pipeline, Process, TickInput, TickOutput,
};

/// All converter outputs for one tick
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Pins {
    /// Microphone clock
    pub pdm_clk: bool,
    /// Microphone channel/edge select
    pub pdm_sel: bool,
    /// Sample strobe gate
    pub strobe: bool,
    /// PCM output register
    pub output: TickOutput,
    /// Serialized PCM
    pub i2s: I2sOut,
}

/// PDM microphone to PCM converter
///
/// Clock and strobe adapter, CIC pipeline and I2S serializer
/// advancing together once per processing tick.
///
/// ```
/// # use pdm_cic::*;
/// let mut c = PdmToPcm::<i32, 3>::new(&Config::default()).unwrap();
/// let mut m = PdmModulator::default();
/// let mut bit = false;
/// let mut y = vec![];
/// while y.len() < 8 {
///     let p = c.tick(bit, true);
///     if p.strobe {
///         bit = m.process(1 << 30);
///     }
///     if p.output.ready {
///         y.push(p.output.sample);
///     }
/// }
/// // a quarter of full scale
/// assert_eq!(y[7], (64 * 64 * 64 / 4) >> 7);
/// ```
#[derive(Clone, Debug)]
pub struct PdmToPcm<T, const N: usize> {
    clock: ClockGen,
    pipeline: Pipeline<T, N>,
    i2s: I2s,
}

impl<T: Accu, const N: usize> PdmToPcm<T, N> {
    /// Create a stopped converter with `N` stages
    pub fn new(config: &Config) -> Result<Self, Error> {
        let clock = ClockGen::new(&config.clock)?;
        let pipeline = Pipeline::new(&config.cic)?;
        let params = pipeline.params();
        let half_period = (clock.divider() as u64 * params.rate() as u64)
            / (4 * params.width().bits() as u64);
        let i2s = u32::try_from(half_period)
            .map_err(|_| Error::BitClock)
            .and_then(|k| I2s::new(k, params.width()))
            .inspect_err(|err| log::warn!("rejecting I2S configuration: {err}"))?;
        log::debug!(
            "PDM divider={} I2S half period={half_period}",
            clock.divider()
        );
        Ok(Self {
            clock,
            pipeline,
            i2s,
        })
    }

    /// The CIC pipeline
    pub fn pipeline(&self) -> &Pipeline<T, N> {
        &self.pipeline
    }

    /// Return all state to its initial value.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.pipeline.reset();
        self.i2s.reset();
    }

    /// Advance by one processing tick.
    ///
    /// # Args
    /// * `pdm_dat`: Microphone data, sampled on the strobe
    /// * `enable`: Run enable
    pub fn tick(&mut self, pdm_dat: bool, enable: bool) -> Pins {
        let clock = self.clock.tick(enable);
        let output = self.pipeline.process(TickInput {
            bit: pdm_dat,
            enable,
            gate: clock.strobe,
        });
        let i2s = self.i2s.tick(enable, output);
        Pins {
            pdm_clk: clock.clk,
            pdm_sel: clock.sel,
            strobe: clock.strobe,
            output,
            i2s,
        }
    }
}
