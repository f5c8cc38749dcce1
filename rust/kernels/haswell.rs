//! x86_64 AVX2 kernels.
//!
//! Callers must check [`cap::HASWELL`](crate::cap::HASWELL) before calling any
//! function here.

use core::arch::x86_64::*;

use super::serial;
use crate::QUANTIZATION_SCALE;

/// Elements per block of i8 kernels. Each i32 lane takes at most 4096
/// `madd` results per block, which keeps the worst case (130 050 per
/// squared-difference pair) below `i32::MAX`.
const I8_BLOCK: usize = 16 * 4096;

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn reduce_epi32(acc: __m256i) -> i64 {
    let mut lanes = [0i32; 8];
    _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, acc);
    lanes.iter().map(|&v| i64::from(v)).sum()
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn dot_i8(a: &[i8], b: &[i8]) -> i64 {
    debug_assert_eq!(a.len(), b.len());
    let mut total = 0i64;
    for (block_a, block_b) in a.chunks(I8_BLOCK).zip(b.chunks(I8_BLOCK)) {
        let bulk = block_a.len() - block_a.len() % 16;
        let mut acc = _mm256_setzero_si256();
        let mut i = 0;
        while i < bulk {
            let va = _mm_loadu_si128(block_a.as_ptr().add(i) as *const __m128i);
            let vb = _mm_loadu_si128(block_b.as_ptr().add(i) as *const __m128i);
            let wa = _mm256_cvtepi8_epi16(va);
            let wb = _mm256_cvtepi8_epi16(vb);
            acc = _mm256_add_epi32(acc, _mm256_madd_epi16(wa, wb));
            i += 16;
        }
        total += reduce_epi32(acc);
        total += serial::dot_i8(&block_a[bulk..], &block_b[bulk..]);
    }
    total
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn sqeuclidean_i8(a: &[i8], b: &[i8]) -> u64 {
    debug_assert_eq!(a.len(), b.len());
    let mut total = 0u64;
    for (block_a, block_b) in a.chunks(I8_BLOCK).zip(b.chunks(I8_BLOCK)) {
        let bulk = block_a.len() - block_a.len() % 16;
        let mut acc = _mm256_setzero_si256();
        let mut i = 0;
        while i < bulk {
            let va = _mm_loadu_si128(block_a.as_ptr().add(i) as *const __m128i);
            let vb = _mm_loadu_si128(block_b.as_ptr().add(i) as *const __m128i);
            let diff = _mm256_sub_epi16(_mm256_cvtepi8_epi16(va), _mm256_cvtepi8_epi16(vb));
            acc = _mm256_add_epi32(acc, _mm256_madd_epi16(diff, diff));
            i += 16;
        }
        total += reduce_epi32(acc) as u64;
        total += serial::sqeuclidean_i8(&block_a[bulk..], &block_b[bulk..]);
    }
    total
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn sum_f32(values: &[f32]) -> f32 {
    let bulk = values.len() - values.len() % 8;
    let mut acc = _mm256_setzero_ps();
    let mut i = 0;
    while i < bulk {
        acc = _mm256_add_ps(acc, _mm256_loadu_ps(values.as_ptr().add(i)));
        i += 8;
    }
    let mut lanes = [0f32; 8];
    _mm256_storeu_ps(lanes.as_mut_ptr(), acc);
    serial::sum_f32(&lanes) + serial::sum_f32(&values[bulk..])
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn transform_f32(points: &mut [f32], rows: &[[f32; 4]; 3]) {
    debug_assert_eq!(points.len() % 3, 0);
    // Column c holds M[0][c], M[1][c], M[2][c] in lanes 0..3.
    let column = |c: usize| _mm_setr_ps(rows[0][c], rows[1][c], rows[2][c], 0.0);
    let (c0, c1, c2, c3) = (column(0), column(1), column(2), column(3));
    let mut out = [0f32; 4];
    for p in points.chunks_exact_mut(3) {
        let mut r = _mm_mul_ps(c0, _mm_set1_ps(p[0]));
        r = _mm_add_ps(r, _mm_mul_ps(c1, _mm_set1_ps(p[1])));
        r = _mm_add_ps(r, _mm_mul_ps(c2, _mm_set1_ps(p[2])));
        r = _mm_add_ps(r, c3);
        _mm_storeu_ps(out.as_mut_ptr(), r);
        p.copy_from_slice(&out[..3]);
    }
}

/// Relies on the default MXCSR rounding mode (nearest, ties to even).
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn quantize_f32_i8(input: &[f32], output: &mut [i8]) {
    debug_assert_eq!(input.len(), output.len());
    let bulk = input.len() - input.len() % 8;
    let scale = _mm256_set1_ps(QUANTIZATION_SCALE);
    let lo = _mm256_set1_ps(-128.0);
    let hi = _mm256_set1_ps(127.0);
    let mut lanes = [0i32; 8];
    let mut i = 0;
    while i < bulk {
        let v = _mm256_mul_ps(_mm256_loadu_ps(input.as_ptr().add(i)), scale);
        let clamped = _mm256_min_ps(_mm256_max_ps(v, lo), hi);
        _mm256_storeu_si256(
            lanes.as_mut_ptr() as *mut __m256i,
            _mm256_cvtps_epi32(clamped),
        );
        for (o, &q) in output[i..i + 8].iter_mut().zip(&lanes) {
            *o = q as i8;
        }
        i += 8;
    }
    serial::quantize_f32_i8(&input[bulk..], &mut output[bulk..]);
}
