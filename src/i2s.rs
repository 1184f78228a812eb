use crate::{EdgeDetector, Error, Process, TickOutput, Width};

/// I2S pins for one tick
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct I2sOut {
    /// Bit clock
    pub sck: bool,
    /// Word select, high for the right channel
    pub ws: bool,
    /// Serial data, MSB first
    pub sd: bool,
}

/// I2S serializer
///
/// Mono: the most recent sample is sent on both channels.
/// Starts with the first ready sample and stops while disabled.
///
/// * Bit clock half period of `half_period` ticks
/// * `2 * W` bit clock edges per word select half period
/// * Serial data changes on the (registered) falling bit clock edge:
///   the word is loaded on the second falling edge after word select changes,
///   the LSB of the previous word is sent during the first bit clock period.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct I2s {
    half_period: u32,
    width: Width,
    edge: EdgeDetector,
    active: bool,
    count: u32,
    pulse: u32,
    sck: bool,
    ws: bool,
    right: bool,
    buf: [u32; 2],
}

impl I2s {
    /// Create an idle serializer.
    ///
    /// # Args
    /// * `half_period`: Bit clock half period in ticks, non-zero
    /// * `width`: Word width, at most 32 bits
    pub fn new(half_period: u32, width: Width) -> Result<Self, Error> {
        if half_period == 0 {
            return Err(Error::BitClock);
        }
        Ok(Self::idle(half_period, width))
    }

    fn idle(half_period: u32, width: Width) -> Self {
        Self {
            half_period,
            width,
            edge: EdgeDetector::default(),
            active: false,
            count: 0,
            pulse: 0,
            sck: false,
            ws: false,
            right: false,
            buf: [0; 2],
        }
    }

    /// Return to idle, clearing the shift registers.
    pub fn reset(&mut self) {
        *self = Self::idle(self.half_period, self.width);
    }

    fn mask(&self) -> u32 {
        u32::MAX >> (u32::BITS - self.width.bits())
    }

    /// Return the current pins and advance by one tick.
    ///
    /// # Args
    /// * `enable`: Run enable
    /// * `y`: Output register of the decimator
    pub fn tick(&mut self, enable: bool, y: TickOutput) -> I2sOut {
        let bits = self.width.bits();
        let out = I2sOut {
            sck: self.sck,
            ws: self.ws,
            sd: (self.buf[self.right as usize] >> (bits - 1)) & 1 == 1,
        };
        let edges = self.edge.process(self.sck);
        if !enable {
            self.active = false;
            self.edge.reset();
            return out;
        }
        if self.active {
            let (pulse, ws) = (self.pulse, self.ws);
            if self.count < self.half_period - 1 {
                self.count += 1;
            } else {
                self.count = 0;
                self.sck = !self.sck;
                if self.pulse < 2 * bits - 1 {
                    self.pulse += 1;
                } else {
                    self.pulse = 0;
                    self.ws = !self.ws;
                }
            }
            if edges.falling {
                let mask = self.mask();
                if pulse == 2 {
                    self.right = ws;
                    self.buf[ws as usize] = y.sample as u32 & mask;
                } else {
                    let b = &mut self.buf[self.right as usize];
                    *b = (*b << 1) & mask;
                }
            }
        }
        if y.ready {
            self.active = true;
        }
        out
    }
}
