//! Sample processing and composition of processing blocks.

/// Processing block
///
/// Single input, single output.
///
/// Stateful blocks implement `Process for Self`.
/// Stateless blocks implement `Process for &Self` and can be used through a shared reference.
/// Heterogeneous blocks can be cascaded in `(P0, P1)` tuples.
pub trait Process<X: Copy, Y = X> {
    /// Update the state with a new input and obtain an output
    fn process(&mut self, x: X) -> Y;

    /// Process a block of inputs into a block of outputs
    ///
    /// Input and output must be of the same size.
    fn block(&mut self, x: &[X], y: &mut [Y]) {
        debug_assert_eq!(x.len(), y.len());
        for (x, y) in x.iter().zip(y) {
            *y = self.process(*x);
        }
    }
}

impl<X: Copy, Y, T: Process<X, Y>> Process<X, Y> for &mut T {
    fn process(&mut self, x: X) -> Y {
        (*self).process(x)
    }

    fn block(&mut self, x: &[X], y: &mut [Y]) {
        (*self).block(x, y)
    }
}

/// Cascade: X->Y->Y
impl<X: Copy, Y: Copy, P0: Process<X, Y>, P1: Process<Y>> Process<X, Y> for (P0, P1) {
    fn process(&mut self, x: X) -> Y {
        self.1.process(self.0.process(x))
    }
}
