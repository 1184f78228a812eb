use crate::Process;

/// Sample strobe generator
///
/// Turns the externally supplied gate into the single authoritative
/// "new input sample" strobe: `gate && enable`, without latency or state.
///
/// The gate must be asserted for one tick per input sample and
/// at most every other tick.
///
/// ```
/// # use pdm_cic::*;
/// assert!((&Strobe).process((true, true)));
/// assert!(!(&Strobe).process((true, false)));
/// assert!(!(&Strobe).process((false, true)));
/// ```
#[derive(Debug, Copy, Clone, Default)]
pub struct Strobe;

impl Process<(bool, bool), bool> for &Strobe {
    /// # Args
    /// * `x`: `(gate, enable)`
    fn process(&mut self, (gate, enable): (bool, bool)) -> bool {
        gate && enable
    }
}
