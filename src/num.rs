use core::fmt::Debug;

use num_traits::{AsPrimitive, PrimInt, Signed, WrappingAdd, WrappingSub};

/// Binary const assertions
pub(crate) struct Assert<const A: usize, const B: usize>;
impl<const A: usize, const B: usize> Assert<A, B> {
    /// Assert A>B
    pub const GREATER: () = assert!(A > B);
}

/// Signed accumulator type for integrator and comb registers
///
/// The register width `nbit` used by a filter must not exceed [`Accu::BITS`].
pub trait Accu:
    PrimInt + Signed + WrappingAdd + WrappingSub + AsPrimitive<i32> + Default + Debug + 'static
{
    /// Number of bits of the primitive
    const BITS: u32;
}

impl Accu for i32 {
    const BITS: u32 = i32::BITS;
}

impl Accu for i64 {
    const BITS: u32 = i64::BITS;
}

/// Two's complement register width
///
/// Values are kept sign extended in a wider primitive.
/// All arithmetic wraps at the register width.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Width(u32);

impl Width {
    /// Register width in bits, `1..=64`.
    pub(crate) const fn new(bits: u32) -> Self {
        debug_assert!(bits > 0 && bits <= 64);
        Self(bits)
    }

    /// Number of bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Largest representable value `(1 << bits - 1) - 1`
    pub const fn max(&self) -> i64 {
        ((1u64 << (self.0 - 1)) - 1) as i64
    }

    /// Smallest representable value `-1 << bits - 1`
    pub const fn min(&self) -> i64 {
        -self.max() - 1
    }

    /// Truncate to the register width and sign extend.
    ///
    /// ```
    /// # use pdm_cic::*;
    /// let w = Params::new(1, 4, 3, 3, 0, Mapping::Unipolar).unwrap().register();
    /// assert_eq!(w.wrap(4i32), -4);
    /// assert_eq!(w.wrap(-5i32), 3);
    /// assert_eq!(w.wrap(3i64), 3);
    /// ```
    #[inline]
    pub fn wrap<T: PrimInt>(&self, x: T) -> T {
        let s = T::zero().count_zeros() - self.0;
        x.signed_shl(s).signed_shr(s)
    }

    /// Wrapping addition at the register width
    #[inline]
    pub fn add<T: PrimInt + WrappingAdd>(&self, x: T, y: T) -> T {
        self.wrap(x.wrapping_add(&y))
    }

    /// Wrapping subtraction at the register width
    #[inline]
    pub fn sub<T: PrimInt + WrappingSub>(&self, x: T, y: T) -> T {
        self.wrap(x.wrapping_sub(&y))
    }
}

/// `ceil(log2(x))`, zero for `x <= 1`.
pub const fn log2_ceil(x: u128) -> u32 {
    if x <= 1 { 0 } else { 128 - (x - 1).leading_zeros() }
}

/// Minimum register width for a CIC with `order` stages and decimation `rate`
///
/// `1 + ceil(order * log2(rate))`, evaluated exactly as `1 + ceil(log2(rate**order))`.
/// Saturates to `u32::MAX` if `rate**order` exceeds `u128`.
///
/// ```
/// # use pdm_cic::bit_growth;
/// assert_eq!(bit_growth(3, 64), 19);
/// assert_eq!(bit_growth(5, 50), 30);
/// ```
pub const fn bit_growth(order: u32, rate: u32) -> u32 {
    match (rate as u128).checked_pow(order) {
        Some(gain) => 1 + log2_ceil(gain),
        None => u32::MAX,
    }
}

/// Right shift amount for a given output scale factor: `ceil(log2(scale_factor))`
///
/// ```
/// # use pdm_cic::scale_shift;
/// assert_eq!(scale_shift(1_000_000), 20);
/// assert_eq!(scale_shift(100), 7);
/// assert_eq!(scale_shift(1024), 10);
/// ```
pub const fn scale_shift(scale_factor: u64) -> u32 {
    log2_ceil(scale_factor as u128)
}
