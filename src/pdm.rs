use serde::{Deserialize, Serialize};

use crate::Process;

/// Pulse density modulator
///
/// * First order delta-sigma, one bit output
/// * Given constant input `x0`, the density of `true` bits is `x0/(1 << 32)`.
/// * The quantization noise goes up as 20 dB/decade.
///
/// Used to synthesize microphone bit streams.
///
/// ```
/// # use pdm_cic::*;
/// let mut m = PdmModulator::default();
/// let x = 0x4000_0000;
/// let n = 1 << 12;
/// let ones = (0..n).filter(|_| m.process(x)).count();
/// assert_eq!(ones, n / 4);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
pub struct PdmModulator {
    a: u32,
}

impl Process<u32, bool> for PdmModulator {
    /// Ingest input sample, emit new output bit.
    ///
    /// # Arguments
    /// * `x`: New input sample, full scale `1 << 32`
    ///
    /// # Returns
    /// Carry of the phase accumulator
    fn process(&mut self, x: u32) -> bool {
        let c;
        (self.a, c) = self.a.overflowing_add(x);
        c
    }
}
