use crate::{ClockConfig, Edge, Error};

/// Microphone pins and sample strobe for one tick
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockOut {
    /// Microphone clock
    pub clk: bool,
    /// Microphone channel/edge select
    pub sel: bool,
    /// Sample strobe gate
    pub strobe: bool,
}

/// Clock and strobe adapter
///
/// Divides the processing clock by `N = sys_clk / fs_in`.
/// The strobe and the rising edge of the clock drive coincide once every `N` ticks.
/// The drive falls `N/2` ticks later.
///
/// Outputs are registered: a tick returns the state from the previous tick's update.
///
/// ```
/// # use pdm_cic::*;
/// let mut c = ClockGen::new(&ClockConfig { sys_clk: 4, fs_in: 1, edge: Leaf(Edge::Falling) }).unwrap();
/// let y: Vec<_> = (0..9).map(|_| c.tick(true)).collect();
/// let strobe: Vec<_> = y.iter().map(|y| y.strobe as u8).collect();
/// let clk: Vec<_> = y.iter().map(|y| y.clk as u8).collect();
/// assert_eq!(strobe, [0, 0, 0, 0, 1, 0, 0, 0, 1]);
/// assert_eq!(clk, [0, 0, 0, 0, 1, 1, 0, 0, 1]);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockGen {
    divider: u32,
    edge: Edge,
    count: u32,
    strobe: bool,
    drive: bool,
}

impl ClockGen {
    /// Create a stopped clock generator.
    pub fn new(config: &ClockConfig) -> Result<Self, Error> {
        let divider = config.divider().inspect_err(|err| {
            log::warn!("rejecting clock configuration: {err}");
        })?;
        Ok(Self {
            divider,
            edge: config.edge.0,
            count: 0,
            strobe: false,
            drive: false,
        })
    }

    /// Ticks per strobe
    pub fn divider(&self) -> u32 {
        self.divider
    }

    /// Stop and restart the divider.
    pub fn reset(&mut self) {
        self.count = 0;
        self.strobe = false;
        self.drive = false;
    }

    /// Return the current pins and advance by one tick.
    ///
    /// With `enable` low the strobe and the drive are held low.
    /// The counter keeps its value.
    pub fn tick(&mut self, enable: bool) -> ClockOut {
        let y = ClockOut {
            clk: match self.edge {
                Edge::Falling => self.drive,
                Edge::Rising => !self.drive,
            },
            sel: self.edge == Edge::Rising,
            strobe: self.strobe,
        };
        if !enable {
            self.strobe = false;
            self.drive = false;
        } else if self.count < self.divider - 1 {
            if self.count == self.divider / 2 - 1 {
                self.drive = false;
            }
            self.count += 1;
            self.strobe = false;
        } else {
            self.count = 0;
            self.strobe = true;
            self.drive = true;
        }
        y
    }
}
