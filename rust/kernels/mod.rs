//! Backend kernels and runtime dispatch.
//!
//! Kernels here trust their callers: lengths are validated by the public
//! operations in [`numerics`](crate::numerics) before dispatch.

pub(crate) mod serial;

#[cfg(target_arch = "x86_64")]
pub(crate) mod haswell;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

use crate::capabilities::{self, cap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backend {
    Serial,
    #[cfg(target_arch = "x86_64")]
    Haswell,
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl Backend {
    /// Widest backend currently enabled.
    #[inline]
    pub(crate) fn select() -> Self {
        Self::from_caps(capabilities::enabled())
    }

    /// Widest backend in `caps` that the CPU also supports.
    pub(crate) fn from_caps(caps: u64) -> Self {
        #[allow(unused_variables)]
        let caps = caps & capabilities::available();

        #[cfg(target_arch = "x86_64")]
        if caps & cap::HASWELL != 0 {
            return Backend::Haswell;
        }

        #[cfg(target_arch = "aarch64")]
        if caps & cap::NEON != 0 {
            return Backend::Neon;
        }

        Backend::Serial
    }

    /// Every backend usable on this machine, serial first.
    #[cfg(test)]
    pub(crate) fn all() -> Vec<Self> {
        let mut backends = vec![Backend::Serial];
        let widest = Self::from_caps(!0);
        if widest != Backend::Serial {
            backends.push(widest);
        }
        backends
    }

    pub(crate) fn dot_i8(self, a: &[i8], b: &[i8]) -> i64 {
        match self {
            Backend::Serial => serial::dot_i8(a, b),
            #[cfg(target_arch = "x86_64")]
            Backend::Haswell => unsafe { haswell::dot_i8(a, b) },
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => unsafe { neon::dot_i8(a, b) },
        }
    }

    pub(crate) fn sqeuclidean_i8(self, a: &[i8], b: &[i8]) -> u64 {
        match self {
            Backend::Serial => serial::sqeuclidean_i8(a, b),
            #[cfg(target_arch = "x86_64")]
            Backend::Haswell => unsafe { haswell::sqeuclidean_i8(a, b) },
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => unsafe { neon::sqeuclidean_i8(a, b) },
        }
    }

    pub(crate) fn sum_f32(self, values: &[f32]) -> f32 {
        match self {
            Backend::Serial => serial::sum_f32(values),
            #[cfg(target_arch = "x86_64")]
            Backend::Haswell => unsafe { haswell::sum_f32(values) },
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => unsafe { neon::sum_f32(values) },
        }
    }

    /// `points.len()` must be a multiple of 3.
    pub(crate) fn transform_f32(self, points: &mut [f32], rows: &[[f32; 4]; 3]) {
        match self {
            Backend::Serial => serial::transform_f32(points, rows),
            #[cfg(target_arch = "x86_64")]
            Backend::Haswell => unsafe { haswell::transform_f32(points, rows) },
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => unsafe { neon::transform_f32(points, rows) },
        }
    }

    pub(crate) fn quantize_f32_i8(self, input: &[f32], output: &mut [i8]) {
        match self {
            Backend::Serial => serial::quantize_f32_i8(input, output),
            #[cfg(target_arch = "x86_64")]
            Backend::Haswell => unsafe { haswell::quantize_f32_i8(input, output) },
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => unsafe { neon::quantize_f32_i8(input, output) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_i8(rng: &mut StdRng, len: usize) -> Vec<i8> {
        (0..len).map(|_| rng.gen()).collect()
    }

    fn random_f32(rng: &mut StdRng, len: usize, range: f32) -> Vec<f32> {
        (0..len).map(|_| rng.gen_range(-range..range)).collect()
    }

    #[test]
    fn serial_only_when_masked() {
        assert_eq!(Backend::from_caps(cap::SERIAL), Backend::Serial);
        assert_eq!(Backend::from_caps(0), Backend::Serial);
    }

    #[test]
    fn integer_kernels_match_serial() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in (0..=67).chain([1023, 4097]) {
            let a = random_i8(&mut rng, len);
            let b = random_i8(&mut rng, len);
            let dot = serial::dot_i8(&a, &b);
            let l2sq = serial::sqeuclidean_i8(&a, &b);
            for backend in Backend::all() {
                assert_eq!(backend.dot_i8(&a, &b), dot, "{backend:?} dot, len {len}");
                assert_eq!(
                    backend.sqeuclidean_i8(&a, &b),
                    l2sq,
                    "{backend:?} sqeuclidean, len {len}"
                );
            }
        }
    }

    #[test]
    fn extreme_i8_values_across_blocks() {
        // Longer than one block so per-block folding is exercised.
        let len = 16 * 4096 * 2 + 13;
        let a = vec![-128i8; len];
        let b = vec![127i8; len];
        for backend in Backend::all() {
            assert_eq!(backend.dot_i8(&a, &a), 16384 * len as i64);
            assert_eq!(backend.dot_i8(&a, &b), -16256 * len as i64);
            assert_eq!(backend.sqeuclidean_i8(&a, &b), 65025 * len as u64);
        }
    }

    #[test]
    fn sums_match_serial_within_tolerance() {
        let mut rng = StdRng::seed_from_u64(11);
        for len in 0..=67 {
            let values = random_f32(&mut rng, len, 10.0);
            let expected = serial::sum_f32(&values);
            for backend in Backend::all() {
                let got = backend.sum_f32(&values);
                assert!(
                    (got - expected).abs() <= 1e-3,
                    "{backend:?} len {len}: {got} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn transform_is_bit_identical() {
        let mut rng = StdRng::seed_from_u64(13);
        let rows = [
            [0.5, -1.25, 2.0, 3.0],
            [1.5, 0.25, -0.75, -4.0],
            [0.0, 2.5, 1.0, 0.125],
        ];
        for count in [0usize, 1, 2, 3, 5, 7, 17] {
            let original = random_f32(&mut rng, count * 3, 100.0);
            let mut expected = original.clone();
            serial::transform_f32(&mut expected, &rows);
            for backend in Backend::all() {
                let mut points = original.clone();
                backend.transform_f32(&mut points, &rows);
                assert_eq!(points, expected, "{backend:?} count {count}");
            }
        }
    }

    #[test]
    fn quantize_is_bit_identical() {
        let mut rng = StdRng::seed_from_u64(17);
        for len in (0..=67).chain([1000]) {
            let mut input = random_f32(&mut rng, len, 1.5);
            // Exact ties must round the same way on every path.
            if len > 4 {
                input[1] = 0.5 / 127.0;
                input[3] = -2.5 / 127.0;
            }
            let mut expected = vec![0i8; len];
            serial::quantize_f32_i8(&input, &mut expected);
            for backend in Backend::all() {
                let mut output = vec![0i8; len];
                backend.quantize_f32_i8(&input, &mut output);
                assert_eq!(output, expected, "{backend:?} len {len}");
            }
        }
    }
}
