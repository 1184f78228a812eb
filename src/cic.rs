use serde::{Deserialize, Serialize};

use crate::{Accu, Error, Mapping, Params, Process, Width, num::Assert};

/// Comb stage
///
/// Holds the previous input.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default, Serialize, Deserialize)]
pub struct Comb<T>(T);

impl<T: Accu> Comb<T> {
    /// Ingest a new sample into the stage and return its current output.
    #[inline]
    pub fn update(&mut self, x: T, w: Width) -> T {
        let y = w.sub(x, self.0);
        self.0 = x;
        y
    }
}

/// Integrator stage
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default, Serialize, Deserialize)]
pub struct Integrator<T>(T);

impl<T: Accu> Integrator<T> {
    /// Ingest a new sample into the stage and return its current output.
    #[inline]
    pub fn update(&mut self, x: T, w: Width) -> T {
        self.0 = w.add(self.0, x);
        self.0
    }
}

/// Integrator bank
///
/// `N` cascaded integrators wrapping at the register width.
/// Each stage ingests the output of the previous stage from the same update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrators<T, const N: usize> {
    stages: [Integrator<T>; N],
    width: Width,
}

impl<T: Accu, const N: usize> Integrators<T, N> {
    /// Zero-initialized bank with the given register width
    pub fn new(width: Width) -> Self {
        let () = Assert::<N, 0>::GREATER;
        Self {
            stages: [Integrator::default(); N],
            width,
        }
    }

    /// Last stage output
    pub fn output(&self) -> T {
        self.stages[N - 1].0
    }

    /// Stage accumulators
    pub fn state(&self) -> [T; N] {
        self.stages.map(|i| i.0)
    }
}

impl<T: Accu, const N: usize> Process<T> for Integrators<T, N> {
    fn process(&mut self, x: T) -> T {
        let w = self.width;
        self.stages.iter_mut().fold(x, |x, i| i.update(x, w))
    }
}

/// Comb bank
///
/// `N` cascaded combs wrapping at the register width.
/// Keeps the last stage output for the output buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Combs<T, const N: usize> {
    stages: [Comb<T>; N],
    width: Width,
    y: T,
}

impl<T: Accu, const N: usize> Combs<T, N> {
    /// Zero-initialized bank with the given register width
    pub fn new(width: Width) -> Self {
        let () = Assert::<N, 0>::GREATER;
        Self {
            stages: [Comb::default(); N],
            width,
            y: T::zero(),
        }
    }

    /// Last stage output of the most recent update
    pub fn output(&self) -> T {
        self.y
    }

    /// Stage delay registers
    pub fn state(&self) -> [T; N] {
        self.stages.map(|c| c.0)
    }
}

impl<T: Accu, const N: usize> Process<T> for Combs<T, N> {
    fn process(&mut self, x: T) -> T {
        let w = self.width;
        self.y = self.stages.iter_mut().fold(x, |x, c| c.update(x, w));
        self.y
    }
}

/// Decimation counter and capture register
///
/// The counter runs `0..rate` and the sample that sees it at `rate - 1`
/// completes the decimation period.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decimator<T> {
    rate: u32,
    index: u32,
    capture: Option<T>,
}

impl<T: Copy> Decimator<T> {
    /// New decimator with counter at zero and nothing captured
    pub fn new(rate: u32) -> Self {
        debug_assert!(rate > 1);
        Self {
            rate,
            index: 0,
            capture: None,
        }
    }

    /// Current counter value
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Count one input sample and return it if it completes the period.
    #[inline]
    pub fn update(&mut self, x: T) -> Option<T> {
        if self.index == self.rate - 1 {
            self.index = 0;
            Some(x)
        } else {
            self.index += 1;
            None
        }
    }

    /// Count a strobed sample and capture it for the next decimate-enable.
    #[inline]
    pub fn strobe(&mut self, x: T) {
        if let Some(x) = self.update(x) {
            self.capture = Some(x);
        }
    }

    /// Take the decimate-enable pulse and its value captured on an earlier tick.
    #[inline]
    pub fn enable(&mut self) -> Option<T> {
        self.capture.take()
    }
}

/// Cascaded integrator comb decimator.
///
/// Sample-domain filter: one call per PDM bit, no tick timing.
/// Order `N` where `N = 3` is cubic.
///
/// ```
/// # use pdm_cic::*;
/// let p = Params::from_config(3, &CicConfig::default()).unwrap();
/// let mut cic = CicDecimator::<i32, 3>::new(&p).unwrap();
/// let y: Vec<_> = (0..4 * 64).filter_map(|_| cic.process(true)).collect();
/// assert_eq!(y.len(), 4);
/// // 64 * 65 * 66 / 6
/// assert_eq!(y[0], 45760);
/// ```
#[derive(Clone, Debug)]
pub struct CicDecimator<T, const N: usize> {
    mapping: Mapping,
    integrators: Integrators<T, N>,
    decimator: Decimator<T>,
    combs: Combs<T, N>,
}

impl<T: Accu, const N: usize> CicDecimator<T, N> {
    /// Create a new zero-initialized filter.
    pub fn new(params: &Params) -> Result<Self, Error> {
        params.check::<T, N>()?;
        Ok(Self {
            mapping: params.mapping(),
            integrators: Integrators::new(params.register()),
            decimator: Decimator::new(params.rate()),
            combs: Combs::new(params.register()),
        })
    }

    /// Return the filter DC gain `R**N`
    pub fn gain(&self) -> u128 {
        (self.decimator.rate as u128).pow(N as _)
    }
}

impl<T: Accu, const N: usize> Process<bool, Option<T>> for CicDecimator<T, N> {
    /// Ingest a new PDM bit and optionally retrieve the next output.
    fn process(&mut self, x: bool) -> Option<T> {
        let x = self.integrators.process(self.mapping.map(x));
        self.decimator
            .update(x)
            .map(|x| self.combs.process(x))
    }
}
