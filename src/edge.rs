use serde::{Deserialize, Serialize};

use crate::Process;

/// Registered edge flags
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    /// Low to high transition
    pub rising: bool,
    /// High to low transition
    pub falling: bool,
}

/// Edge detector
///
/// Two bit history of the input. The flags reflect the two previous inputs,
/// i.e. an edge is reported one tick after the input changes.
///
/// ```
/// # use pdm_cic::*;
/// let mut e = EdgeDetector::default();
/// let mut y = [Edges::default(); 4];
/// e.block(&[true, true, false, false], &mut y);
/// assert!(y[1].rising);
/// assert!(y[3].falling);
/// assert_eq!(e.process(false), Edges::default());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDetector {
    // bit 0: last input, bit 1: input before that
    history: u8,
}

impl EdgeDetector {
    /// Clear the history.
    pub fn reset(&mut self) {
        self.history = 0;
    }
}

impl Process<bool, Edges> for EdgeDetector {
    fn process(&mut self, x: bool) -> Edges {
        let edges = Edges {
            rising: self.history == 0b01,
            falling: self.history == 0b10,
        };
        self.history = ((self.history << 1) | x as u8) & 0b11;
        edges
    }
}
