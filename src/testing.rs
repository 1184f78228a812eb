//! Reference models and tools to test the decimators
#![allow(dead_code)]
use rustfft::{FftPlanner, num_complex::Complex};

use crate::Mapping;

/// Non-wrapping CIC decimator
///
/// Integrators and combs in `i128`, one output for every `rate` input bits,
/// the first after input `rate - 1`.
pub fn reference(order: usize, rate: usize, mapping: Mapping, x: &[bool]) -> Vec<i128> {
    let mut integrators = vec![0i128; order];
    let mut combs = vec![0i128; order];
    x.iter()
        .enumerate()
        .filter_map(|(k, x)| {
            let mut y: i128 = mapping.map(*x);
            for i in integrators.iter_mut() {
                *i += y;
                y = *i;
            }
            (k % rate == rate - 1).then(|| {
                for c in combs.iter_mut() {
                    let d = y - *c;
                    *c = y;
                    y = d;
                }
                y
            })
        })
        .collect()
}

/// Power spectrum of a real sequence
pub fn spectrum(x: &[f64]) -> Vec<f64> {
    let mut buf: Vec<_> = x.iter().map(|x| Complex::new(*x, 0.0)).collect();
    FftPlanner::new()
        .plan_fft_forward(buf.len())
        .process(&mut buf);
    buf.iter().map(|y| y.norm_sqr()).collect()
}

/// Power ratio in dB
pub fn db(num: f64, den: f64) -> f64 {
    10.0 * (num / den).log10()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reference_gain() {
        let y = reference(3, 64, Mapping::Unipolar, &[true; 64 * 5]);
        assert_eq!(y, [45760, 220480, 262144, 262144, 262144]);
        assert_eq!(reference(2, 4, Mapping::Bipolar, &[false; 12]), [-10, -16, -16]);
    }

    #[test]
    fn tone() {
        let n = 256;
        let x: Vec<_> = (0..n)
            .map(|i| (core::f64::consts::TAU * 5.0 * i as f64 / n as f64).cos())
            .collect();
        let p = spectrum(&x);
        assert!((p[5] - (n * n / 4) as f64).abs() < 1e-6);
        assert!(p[6] < 1e-12 && p[0] < 1e-12);
        assert!((db(100.0, 1.0) - 20.0).abs() < 1e-12);
    }
}
