use miniconf::{Leaf, Tree};
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::{Accu, Width, bit_growth};

/// Configuration error
///
/// All errors are detected at construction, before the first tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Zero stages
    #[error("at least one stage is required")]
    NoStages,
    /// Configured order differs from the instantiated stage count
    #[error("order {order} does not match {stages} instantiated stages")]
    Stages {
        /// Configured order
        order: u32,
        /// Instantiated stages
        stages: usize,
    },
    /// Decimation rate below 2
    #[error("decimation rate {0} is below 2")]
    Rate(u32),
    /// Register width below the bit growth bound
    #[error("register width {nbit} is below the bit growth bound {required}")]
    BitGrowth {
        /// Register width
        nbit: u32,
        /// Bit growth bound
        required: u32,
    },
    /// Register width exceeds the accumulator primitive
    #[error("register width {nbit} exceeds the {bits} bit accumulator")]
    Accumulator {
        /// Register width
        nbit: u32,
        /// Accumulator primitive width
        bits: u32,
    },
    /// Output width not in `1..=min(nbit, 32)`
    #[error("output width {width} is not in 1..={max}")]
    OutputWidth {
        /// Output width
        width: u32,
        /// Largest valid output width
        max: u32,
    },
    /// Shifted full scale register does not fit the output width
    #[error("scale shift {shift} does not fit {nbit} bit registers into {width} bits")]
    Scale {
        /// Right shift
        shift: u32,
        /// Register width
        nbit: u32,
        /// Output width
        width: u32,
    },
    /// Strobe period shorter than two ticks
    #[error("strobe period of {0} ticks is below 2")]
    StrobePeriod(u32),
    /// I2S bit clock half period rounds to zero ticks
    #[error("I2S bit clock half period is zero ticks")]
    BitClock,
}

/// PDM bit to integrator input mapping
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
pub enum Mapping {
    /// `0 -> 0`, `1 -> 1`: full scale output `0..=R**M`.
    #[default]
    Unipolar,
    /// `0 -> -1`, `1 -> 1`: full scale output `-R**M..=R**M`.
    Bipolar,
}

impl Mapping {
    /// Map a PDM bit to an integrator input value.
    ///
    /// ```
    /// # use pdm_cic::Mapping;
    /// assert_eq!(Mapping::Unipolar.map::<i32>(false), 0);
    /// assert_eq!(Mapping::Bipolar.map::<i32>(false), -1);
    /// assert_eq!(Mapping::Bipolar.map::<i64>(true), 1);
    /// ```
    #[inline]
    pub fn map<T: Zero + One + Signed>(&self, bit: bool) -> T {
        match (self, bit) {
            (_, true) => T::one(),
            (Self::Unipolar, false) => T::zero(),
            (Self::Bipolar, false) => -T::one(),
        }
    }
}

/// Which microphone clock edge carries valid data
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
pub enum Edge {
    /// Select pin low, microphone clock follows the drive
    #[default]
    Falling,
    /// Select pin high, microphone clock is the inverted drive
    Rising,
}

/// CIC decimator settings
///
/// The stage count is the const generic of the filter.
///
/// Registers are `1 + ceil(log2(R**M))` bits wide. If `R**M` is a power of two
/// (as for the default `R = 64`), a unipolar all-ones input reaches `+R**M`
/// and wraps to the most negative register value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Tree)]
pub struct CicConfig {
    /// Decimation rate `R >= 2`
    pub rate: u32,
    /// Output width `W` in bits
    pub width: u32,
    /// Output right shift, see [`crate::scale_shift()`]
    pub scale_shift: u32,
    /// PDM bit mapping
    pub mapping: Leaf<Mapping>,
}

impl Default for CicConfig {
    fn default() -> Self {
        Self {
            rate: 64,
            width: 16,
            scale_shift: 7,
            mapping: Leaf(Mapping::Unipolar),
        }
    }
}

/// Microphone clock and sample strobe settings
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Tree)]
pub struct ClockConfig {
    /// Processing clock (tick) frequency in Hz
    pub sys_clk: u32,
    /// Target PDM sample (strobe) frequency in Hz
    pub fs_in: u32,
    /// Data edge policy
    pub edge: Leaf<Edge>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            sys_clk: 100_000,
            fs_in: 1_000,
            edge: Leaf(Edge::Falling),
        }
    }
}

impl ClockConfig {
    /// Ticks per strobe period `sys_clk / fs_in`
    pub fn divider(&self) -> Result<u32, Error> {
        let n = self.sys_clk.checked_div(self.fs_in).unwrap_or(0);
        if n < 2 {
            return Err(Error::StrobePeriod(n));
        }
        Ok(n)
    }
}

/// PDM to PCM converter settings
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Tree)]
pub struct Config {
    /// Decimation filter
    pub cic: CicConfig,
    /// Microphone clock
    pub clock: ClockConfig,
}

/// Validated, immutable CIC parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Params {
    order: u32,
    rate: u32,
    register: Width,
    width: Width,
    shift: u32,
    mapping: Mapping,
}

impl Params {
    /// Validate explicit parameters.
    ///
    /// # Args
    /// * `order`: Stage count `M >= 1`
    /// * `rate`: Decimation rate `R >= 2`
    /// * `nbit`: Register width, at least [`bit_growth()`] and at most 64
    /// * `width`: Output width `1..=min(nbit, 32)`
    /// * `shift`: Output right shift, `nbit - shift <= width`
    /// * `mapping`: Input bit mapping
    pub fn new(
        order: u32,
        rate: u32,
        nbit: u32,
        width: u32,
        shift: u32,
        mapping: Mapping,
    ) -> Result<Self, Error> {
        Self::validate(order, rate, nbit, width, shift, mapping).inspect_err(|err| {
            log::warn!("rejecting CIC configuration: {err}");
        })
    }

    fn validate(
        order: u32,
        rate: u32,
        nbit: u32,
        width: u32,
        shift: u32,
        mapping: Mapping,
    ) -> Result<Self, Error> {
        if order == 0 {
            return Err(Error::NoStages);
        }
        if rate < 2 {
            return Err(Error::Rate(rate));
        }
        let required = bit_growth(order, rate);
        if nbit < required {
            return Err(Error::BitGrowth { nbit, required });
        }
        if nbit > 64 {
            return Err(Error::Accumulator { nbit, bits: 64 });
        }
        let max = nbit.min(i32::BITS);
        if width == 0 || width > max {
            return Err(Error::OutputWidth { width, max });
        }
        if shift >= nbit || nbit - shift > width {
            return Err(Error::Scale { shift, nbit, width });
        }
        Ok(Self {
            order,
            rate,
            register: Width::new(nbit),
            width: Width::new(width),
            shift,
            mapping,
        })
    }

    /// Derive parameters for `order` stages with the minimum register width.
    ///
    /// ```
    /// # use pdm_cic::*;
    /// let p = Params::from_config(5, &CicConfig {
    ///     rate: 50,
    ///     width: 16,
    ///     scale_shift: scale_shift(1_000_000),
    ///     mapping: Leaf(Mapping::Unipolar),
    /// }).unwrap();
    /// assert_eq!(p.register().bits(), 30);
    /// assert_eq!(p.gain(), 50u128.pow(5));
    /// ```
    pub fn from_config(order: u32, config: &CicConfig) -> Result<Self, Error> {
        let nbit = if config.rate < 2 {
            0
        } else {
            bit_growth(order, config.rate)
        };
        Self::new(
            order,
            config.rate,
            nbit,
            config.width,
            config.scale_shift,
            config.mapping.0,
        )
    }

    /// Check that the parameters fit a filter with `N` stages of `T` accumulators.
    pub fn check<T: Accu, const N: usize>(&self) -> Result<(), Error> {
        if self.order as usize != N {
            Err(Error::Stages {
                order: self.order,
                stages: N,
            })
        } else if self.register.bits() > T::BITS {
            Err(Error::Accumulator {
                nbit: self.register.bits(),
                bits: T::BITS,
            })
        } else {
            Ok(())
        }
    }

    /// Stage count `M`
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Decimation rate `R`
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Register width `nbit`
    pub fn register(&self) -> Width {
        self.register
    }

    /// Output width `W`
    pub fn width(&self) -> Width {
        self.width
    }

    /// Output right shift
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Input mapping
    pub fn mapping(&self) -> Mapping {
        self.mapping
    }

    /// DC gain `R**M`
    pub fn gain(&self) -> u128 {
        (self.rate as u128).pow(self.order)
    }
}
