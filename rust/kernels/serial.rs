//! Portable reference kernels.
//!
//! Every lane-parallel backend is validated against these. They also handle
//! the remainder elements that do not fill a whole register.

use crate::QUANTIZATION_SCALE;

pub(crate) fn dot_i8(a: &[i8], b: &[i8]) -> i64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| i64::from(x) * i64::from(y))
        .sum()
}

pub(crate) fn sqeuclidean_i8(a: &[i8], b: &[i8]) -> u64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u64
        })
        .sum()
}

/// Left-to-right sum.
pub(crate) fn sum_f32(values: &[f32]) -> f32 {
    values.iter().fold(0.0, |acc, &v| acc + v)
}

/// `((m0 * x + m1 * y) + m2 * z) + m3` per row; the SIMD kernels use the same order.
#[inline]
pub(crate) fn transform_point(rows: &[[f32; 4]; 3], point: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = point;
    let apply = |r: &[f32; 4]| r[0] * x + r[1] * y + r[2] * z + r[3];
    [apply(&rows[0]), apply(&rows[1]), apply(&rows[2])]
}

pub(crate) fn transform_f32(points: &mut [f32], rows: &[[f32; 4]; 3]) {
    debug_assert_eq!(points.len() % 3, 0);
    for p in points.chunks_exact_mut(3) {
        let out = transform_point(rows, [p[0], p[1], p[2]]);
        p.copy_from_slice(&out);
    }
}

/// Scales by 127, saturates to `[-128, 127]` and rounds half to even.
#[inline]
pub(crate) fn quantize_one(value: f32) -> i8 {
    (value * QUANTIZATION_SCALE)
        .clamp(-128.0, 127.0)
        .round_ties_even() as i8
}

pub(crate) fn quantize_f32_i8(input: &[f32], output: &mut [i8]) {
    debug_assert_eq!(input.len(), output.len());
    for (o, &v) in output.iter_mut().zip(input) {
        *o = quantize_one(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_and_saturates() {
        assert_eq!(quantize_one(0.0), 0);
        assert_eq!(quantize_one(1.0), 127);
        assert_eq!(quantize_one(-1.0), -127);
        assert_eq!(quantize_one(2.0), 127);
        assert_eq!(quantize_one(-2.0), -128);
        assert_eq!(quantize_one(f32::INFINITY), 127);
        assert_eq!(quantize_one(f32::NEG_INFINITY), -128);
        // 0.5 / 127 sits exactly between 0 and 1 after scaling.
        assert_eq!(quantize_one(0.5 / 127.0), 0);
        assert_eq!(quantize_one(1.5 / 127.0), 2);
    }

    #[test]
    fn transform_point_translation() {
        let rows = [
            [1.0, 0.0, 0.0, 10.0],
            [0.0, 1.0, 0.0, -2.0],
            [0.0, 0.0, 1.0, 0.5],
        ];
        assert_eq!(transform_point(&rows, [1.0, 2.0, 3.0]), [11.0, 0.0, 3.5]);
    }

    #[test]
    fn integer_kernels() {
        assert_eq!(dot_i8(&[1, 2, 3], &[4, 5, 6]), 32);
        assert_eq!(sqeuclidean_i8(&[1, 2, 3], &[4, 5, 6]), 27);
        assert_eq!(sqeuclidean_i8(&[-128], &[127]), 65025);
    }
}
