use serde::{Deserialize, Serialize};

use crate::{
    Accu, CicConfig, Combs, Decimator, Error, Integrators, Mapping, Params, Process, Strobe, Width,
};

/// Signals sampled on one processing tick
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Current PDM bit
    pub bit: bool,
    /// Pipeline runs while high, all state is frozen while low
    pub enable: bool,
    /// Sample strobe gate, one tick per accepted input bit
    pub gate: bool,
}

/// Output register as seen during one processing tick
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutput {
    /// Latched PCM sample, fresh only when `ready`
    pub sample: i32,
    /// One tick pulse marking a new sample
    pub ready: bool,
}

/// Output valid aligner
///
/// Delays the decimate-enable pulse by one tick while the comb chain settles.
/// A tick with enable low drops the pending pulse.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aligner {
    pending: bool,
}

impl Process<(bool, bool), bool> for Aligner {
    /// # Args
    /// * `x`: `(decimate, enable)`
    ///
    /// # Returns
    /// Valid pulse
    fn process(&mut self, (decimate, enable): (bool, bool)) -> bool {
        let valid = self.pending && enable;
        self.pending = decimate && enable;
        valid
    }
}

/// Scale and buffer stage
///
/// Latches `y >> shift`, wrapped to the output width, on the valid pulse.
/// Output overflow wraps silently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputBuffer {
    shift: u32,
    width: Width,
    y: TickOutput,
}

impl OutputBuffer {
    /// New buffer holding zero
    pub fn new(shift: u32, width: Width) -> Self {
        Self {
            shift,
            width,
            y: TickOutput::default(),
        }
    }

    /// Current register
    pub fn get(&self) -> TickOutput {
        self.y
    }
}

impl<T: Accu> Process<(bool, T), TickOutput> for OutputBuffer {
    /// # Args
    /// * `x`: `(valid, comb output)`
    fn process(&mut self, (valid, y): (bool, T)) -> TickOutput {
        if valid {
            self.y.sample = self.width.wrap(y.signed_shr(self.shift)).as_();
        }
        self.y.ready = valid;
        self.y
    }
}

/// Tick driven PDM to PCM CIC pipeline
///
/// Strobe generator, integrator bank, decimator, comb bank, valid aligner,
/// and scale and buffer stage advancing together once per processing tick.
///
/// Timing with strobe `k` completing a decimation period:
///
/// * tick of strobe `k`: integrators update, the decimator captures the last integrator
/// * next tick: decimate-enable, the comb bank updates
/// * tick after that: `ready` with the new sample
///
/// With run-enable low all state is frozen. A decimation captured before the disable,
/// including one whose decimate-enable tick falls into the disabled span, is deferred:
/// the comb bank runs and `ready` follows once enable returns.
/// Only a `ready` pulse due on a disabled tick is dropped.
///
/// ```
/// # use pdm_cic::*;
/// let mut p = Pipeline::<i32, 3>::new(&CicConfig::default()).unwrap();
/// let mut y = vec![];
/// for i in 0..4 * 64 * 2 + 2 {
///     let y0 = p.process(TickInput { bit: true, enable: true, gate: i & 1 == 0 });
///     if y0.ready {
///         y.push((i, y0.sample));
///     }
/// }
/// assert_eq!(y.len(), 4);
/// // 64th strobe on tick 126, comb on 127, ready on 128
/// assert_eq!(y[0], (128, 45760 >> 7));
/// ```
#[derive(Clone, Debug)]
pub struct Pipeline<T, const N: usize> {
    params: Params,
    integrators: Integrators<T, N>,
    decimator: Decimator<T>,
    combs: Combs<T, N>,
    aligner: Aligner,
    output: OutputBuffer,
}

impl<T: Accu, const N: usize> Pipeline<T, N> {
    /// Create a pipeline with `N` stages and minimum register width
    pub fn new(config: &CicConfig) -> Result<Self, Error> {
        Self::from_params(Params::from_config(N as _, config)?)
    }

    /// Create a pipeline from validated parameters
    pub fn from_params(params: Params) -> Result<Self, Error> {
        params.check::<T, N>()?;
        log::debug!(
            "CIC M={} R={} nbit={} W={} shift={} {:?}",
            N,
            params.rate(),
            params.register().bits(),
            params.width().bits(),
            params.shift(),
            params.mapping()
        );
        Ok(Self {
            params,
            integrators: Integrators::new(params.register()),
            decimator: Decimator::new(params.rate()),
            combs: Combs::new(params.register()),
            aligner: Aligner::default(),
            output: OutputBuffer::new(params.shift(), params.width()),
        })
    }

    /// Return all state to its initial value.
    pub fn reset(&mut self) {
        *self = Self {
            params: self.params,
            integrators: Integrators::new(self.params.register()),
            decimator: Decimator::new(self.params.rate()),
            combs: Combs::new(self.params.register()),
            aligner: Aligner::default(),
            output: OutputBuffer::new(self.params.shift(), self.params.width()),
        };
    }

    /// Filter parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Input mapping
    pub fn mapping(&self) -> Mapping {
        self.params.mapping()
    }

    /// Integrator accumulators
    pub fn integrators(&self) -> [T; N] {
        self.integrators.state()
    }

    /// Comb delay registers
    pub fn combs(&self) -> [T; N] {
        self.combs.state()
    }

    /// Unscaled comb bank output of the most recent decimation
    pub fn raw(&self) -> T {
        self.combs.output()
    }

    /// Current output register
    pub fn output(&self) -> TickOutput {
        self.output.get()
    }
}

impl<T: Accu, const N: usize> Process<TickInput, TickOutput> for Pipeline<T, N> {
    /// Advance the pipeline by one processing tick.
    fn process(&mut self, x: TickInput) -> TickOutput {
        if !x.enable {
            self.aligner.process((false, false));
            return self.output.process((false, T::zero()));
        }
        // Back to front: each register update reads the previous tick's upstream value.
        let decimate = self.decimator.enable();
        let valid = self.aligner.process((decimate.is_some(), x.enable));
        let y = self.output.process((valid, self.combs.output()));
        if let Some(d) = decimate {
            self.combs.process(d);
        }
        if (&Strobe).process((x.gate, x.enable)) {
            let i = self.integrators.process(self.params.mapping().map(x.bit));
            self.decimator.strobe(i);
        }
        y
    }
}

#[cfg(test)]
mod test {
    use miniconf::Leaf;
    use rand::{prelude::*, rngs::StdRng};

    use super::*;
    use crate::{bit_growth, testing::reference};

    fn unscaled(order: u32, rate: u32, mapping: Mapping) -> Params {
        let nbit = bit_growth(order, rate);
        Params::new(order, rate, nbit, nbit.min(32), 0, mapping).unwrap()
    }

    /// Strobe every `period` ticks, collect (tick, sample) on ready.
    fn run<const N: usize>(
        p: &mut Pipeline<i32, N>,
        x: &[bool],
        period: usize,
    ) -> Vec<(usize, i32)> {
        let mut y = vec![];
        for i in 0..x.len() * period + 2 {
            let gate = i % period == 0 && i / period < x.len();
            let bit = x.get(i / period).copied().unwrap_or_default();
            let y0 = p.process(TickInput {
                bit,
                enable: true,
                gate,
            });
            if y0.ready {
                y.push((i, y0.sample));
            }
        }
        y
    }

    #[test]
    fn aligner() {
        let mut a = Aligner::default();
        assert!(!a.process((true, true)));
        assert!(a.process((false, true)));
        assert!(!a.process((false, true)));
        // disable on the decimate-enable tick
        assert!(!a.process((true, false)));
        assert!(!a.process((false, true)));
        // disable after the decimate-enable tick
        assert!(!a.process((true, true)));
        assert!(!a.process((false, false)));
        assert!(!a.process((false, true)));
    }

    #[test]
    fn output_buffer() {
        let mut b = OutputBuffer::new(4, Width::new(8));
        assert_eq!(b.process((false, 1000i32)), TickOutput::default());
        let y = b.process((true, 1000i32));
        assert_eq!(y, TickOutput { sample: 62, ready: true });
        let y = b.process((false, 0i32));
        assert_eq!(y, TickOutput { sample: 62, ready: false });
        // arithmetic shift
        assert_eq!(b.process((true, -1000i32)).sample, -63);
        // 3000 >> 4 = 187 wraps at 8 bits
        assert_eq!(b.process((true, 3000i32)).sample, 187 - 256);
    }

    #[test]
    fn single_decimation() {
        // M=3, R=64, nbit=19
        let p = unscaled(3, 64, Mapping::Unipolar);
        assert_eq!(p.register().bits(), 19);
        let mut cic = Pipeline::<i32, 3>::from_params(p).unwrap();
        let y = run(&mut cic, &[true; 64], 2);
        // 64th strobe on tick 126
        assert_eq!(y, [(128, 64 * 65 * 66 / 6)]);
        let want = reference(3, 64, Mapping::Unipolar, &[true; 64]);
        assert_eq!(want, [45760]);
        assert_eq!(cic.raw(), 45760);
        assert_eq!(cic.integrators(), [64, 64 * 65 / 2, 45760]);
        assert_eq!(cic.combs(), [45760, 45760, 45760]);
    }

    #[test]
    fn matches_reference() {
        let p = unscaled(4, 10, Mapping::Bipolar);
        let mut cic = Pipeline::<i32, 4>::from_params(p).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let x: Vec<bool> = (0..10 * 100).map(|_| rng.random()).collect();
        let y = run(&mut cic, &x, 3);
        let want = reference(4, 10, Mapping::Bipolar, &x);
        assert_eq!(y.len(), 100);
        for (k, ((i, y), want)) in y.iter().zip(&want).enumerate() {
            // strobe of sample 10k+9 on tick 3*(10k+9), ready two ticks later
            assert_eq!(*i, 3 * (10 * k + 9) + 2);
            assert_eq!(*y as i128, *want);
        }
    }

    #[test]
    fn valid_every_rate_strobes() {
        let rate = 7;
        let mut cic = Pipeline::<i32, 2>::new(&CicConfig {
            rate,
            width: 7,
            scale_shift: 0,
            mapping: Leaf(Mapping::Bipolar),
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut strobes = 0;
        let mut since = 0;
        let mut valids = 0;
        let mut idle = true;
        for _ in 0..100_000 {
            // strobes at least two ticks apart
            let gate = idle && rng.random_bool(0.3);
            idle = !gate;
            let y = cic.process(TickInput {
                bit: rng.random(),
                enable: true,
                gate,
            });
            if y.ready {
                assert_eq!(since, 0);
                valids += 1;
            }
            if gate {
                strobes += 1;
                since += 1;
                if since == rate {
                    since = 0;
                }
            }
        }
        // at most one decimation in flight
        assert!(strobes / rate - valids <= 1);
        assert!(valids > 1000);
    }

    #[test]
    fn never_valid_while_disabled() {
        let rate = 5;
        let mut cic = Pipeline::<i32, 3>::new(&CicConfig {
            rate,
            width: 8,
            scale_shift: 0,
            mapping: Leaf(Mapping::Unipolar),
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let mut strobes = 0;
        let mut valids = 0;
        let mut disables = 0;
        let mut enable = true;
        for i in 0..100_000 {
            if rng.random_bool(0.01) {
                enable = !enable;
                disables += !enable as u32;
            }
            let gate = i % 2 == 0;
            let y = cic.process(TickInput {
                bit: rng.random(),
                enable,
                gate,
            });
            assert!(!y.ready || enable);
            valids += y.ready as u32;
            strobes += (gate && enable) as u32;
        }
        assert!(valids <= strobes / rate);
        // one lost pulse per disable at most, one in flight
        assert!(valids + disables + 1 >= strobes / rate);
    }

    #[test]
    fn disable_freezes() {
        let mut cic = Pipeline::<i32, 3>::new(&CicConfig::default()).unwrap();
        for i in 0..1000 {
            cic.process(TickInput {
                bit: i % 3 == 0,
                enable: true,
                gate: i % 2 == 0,
            });
        }
        let (i, c, y) = (cic.integrators(), cic.combs(), cic.output());
        for _ in 0..100 {
            let y0 = cic.process(TickInput {
                bit: true,
                enable: false,
                gate: true,
            });
            assert!(!y0.ready);
            assert_eq!(y0.sample, y.sample);
        }
        assert_eq!(cic.integrators(), i);
        assert_eq!(cic.combs(), c);
    }

    #[test]
    fn disable_on_decimate_tick() {
        let p = unscaled(1, 2, Mapping::Unipolar);
        let mut cic = Pipeline::<i32, 1>::from_params(p).unwrap();
        let t = |bit, enable, gate| TickInput { bit, enable, gate };
        // second strobe captures
        assert!(!cic.process(t(true, true, true)).ready);
        assert!(!cic.process(t(false, true, false)).ready);
        assert!(!cic.process(t(false, true, true)).ready);
        // decimate-enable tick disabled: comb frozen, no valid follows
        assert!(!cic.process(t(false, false, false)).ready);
        assert_eq!(cic.raw(), 0);
        assert!(!cic.process(t(false, false, false)).ready);
        // re-enabled: comb runs, valid one tick later
        assert!(!cic.process(t(false, true, false)).ready);
        assert_eq!(cic.raw(), 1);
        let y = cic.process(t(false, true, false));
        assert_eq!(y, TickOutput { sample: 1, ready: true });

        // disabled on the valid tick: pulse dropped
        cic.reset();
        assert!(!cic.process(t(true, true, true)).ready);
        assert!(!cic.process(t(false, true, false)).ready);
        assert!(!cic.process(t(true, true, true)).ready);
        assert!(!cic.process(t(false, true, false)).ready);
        assert!(!cic.process(t(false, false, false)).ready);
        assert!(!cic.process(t(false, true, false)).ready);
        assert!(!cic.process(t(false, true, false)).ready);
    }

    #[test]
    fn full_scale_wraps() {
        // 64**3 == 1 << (19 - 1): unipolar full scale wraps to the negative extreme
        let mut cic = Pipeline::<i32, 3>::new(&CicConfig::default()).unwrap();
        let y: Vec<_> = run(&mut cic, &[true; 64 * 6], 2)
            .iter()
            .map(|(_, y)| *y)
            .collect();
        assert_eq!(y, [357, 1722, -2048, -2048, -2048, -2048]);
        assert_eq!(cic.raw(), -1 << 18);
    }

    #[test]
    fn reset_reproduces() {
        let mut cic = Pipeline::<i32, 5>::new(&CicConfig {
            rate: 50,
            width: 16,
            scale_shift: crate::scale_shift(1_000_000),
            mapping: Leaf(Mapping::Unipolar),
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let x: Vec<bool> = (0..50 * 200).map(|_| rng.random()).collect();
        let a = run(&mut cic, &x, 4);
        cic.reset();
        assert_eq!(cic.integrators(), [0; 5]);
        assert_eq!(cic.output(), TickOutput::default());
        let b = run(&mut cic, &x, 4);
        assert_eq!(a.len(), 200);
        assert_eq!(a, b);
    }
}
