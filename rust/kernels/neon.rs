//! aarch64 NEON kernels.
//!
//! Callers must check [`cap::NEON`](crate::cap::NEON) before calling any
//! function here.

use core::arch::aarch64::*;

use super::serial;
use crate::QUANTIZATION_SCALE;

/// Elements per block of i8 kernels; bounds each i32 lane well below `i32::MAX`.
const I8_BLOCK: usize = 16 * 4096;

#[target_feature(enable = "neon")]
pub(crate) unsafe fn dot_i8(a: &[i8], b: &[i8]) -> i64 {
    debug_assert_eq!(a.len(), b.len());
    let mut total = 0i64;
    for (block_a, block_b) in a.chunks(I8_BLOCK).zip(b.chunks(I8_BLOCK)) {
        let bulk = block_a.len() - block_a.len() % 16;
        let mut acc = vdupq_n_s32(0);
        let mut i = 0;
        while i < bulk {
            let va = vld1q_s8(block_a.as_ptr().add(i));
            let vb = vld1q_s8(block_b.as_ptr().add(i));
            acc = vpadalq_s16(acc, vmull_s8(vget_low_s8(va), vget_low_s8(vb)));
            acc = vpadalq_s16(acc, vmull_high_s8(va, vb));
            i += 16;
        }
        total += vaddlvq_s32(acc);
        total += serial::dot_i8(&block_a[bulk..], &block_b[bulk..]);
    }
    total
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn sqeuclidean_i8(a: &[i8], b: &[i8]) -> u64 {
    debug_assert_eq!(a.len(), b.len());
    let mut total = 0u64;
    for (block_a, block_b) in a.chunks(I8_BLOCK).zip(b.chunks(I8_BLOCK)) {
        let bulk = block_a.len() - block_a.len() % 16;
        let mut acc = vdupq_n_s32(0);
        let mut i = 0;
        while i < bulk {
            let va = vld1q_s8(block_a.as_ptr().add(i));
            let vb = vld1q_s8(block_b.as_ptr().add(i));
            let d_lo = vsubl_s8(vget_low_s8(va), vget_low_s8(vb));
            let d_hi = vsubl_high_s8(va, vb);
            acc = vmlal_s16(acc, vget_low_s16(d_lo), vget_low_s16(d_lo));
            acc = vmlal_high_s16(acc, d_lo, d_lo);
            acc = vmlal_s16(acc, vget_low_s16(d_hi), vget_low_s16(d_hi));
            acc = vmlal_high_s16(acc, d_hi, d_hi);
            i += 16;
        }
        total += vaddlvq_s32(acc) as u64;
        total += serial::sqeuclidean_i8(&block_a[bulk..], &block_b[bulk..]);
    }
    total
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn sum_f32(values: &[f32]) -> f32 {
    let bulk = values.len() - values.len() % 4;
    let mut acc = vdupq_n_f32(0.0);
    let mut i = 0;
    while i < bulk {
        acc = vaddq_f32(acc, vld1q_f32(values.as_ptr().add(i)));
        i += 4;
    }
    let mut lanes = [0f32; 4];
    vst1q_f32(lanes.as_mut_ptr(), acc);
    serial::sum_f32(&lanes) + serial::sum_f32(&values[bulk..])
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn transform_f32(points: &mut [f32], rows: &[[f32; 4]; 3]) {
    debug_assert_eq!(points.len() % 3, 0);
    let column = |c: usize| {
        let lanes = [rows[0][c], rows[1][c], rows[2][c], 0.0];
        vld1q_f32(lanes.as_ptr())
    };
    let (c0, c1, c2, c3) = (column(0), column(1), column(2), column(3));
    let mut out = [0f32; 4];
    for p in points.chunks_exact_mut(3) {
        // Separate multiply and add: `vmlaq`/`vfmaq` could fuse and break parity.
        let mut r = vmulq_n_f32(c0, p[0]);
        r = vaddq_f32(r, vmulq_n_f32(c1, p[1]));
        r = vaddq_f32(r, vmulq_n_f32(c2, p[2]));
        r = vaddq_f32(r, c3);
        vst1q_f32(out.as_mut_ptr(), r);
        p.copy_from_slice(&out[..3]);
    }
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn quantize_f32_i8(input: &[f32], output: &mut [i8]) {
    debug_assert_eq!(input.len(), output.len());
    let bulk = input.len() - input.len() % 4;
    let lo = vdupq_n_f32(-128.0);
    let hi = vdupq_n_f32(127.0);
    let mut lanes = [0i32; 4];
    let mut i = 0;
    while i < bulk {
        let v = vmulq_n_f32(vld1q_f32(input.as_ptr().add(i)), QUANTIZATION_SCALE);
        let clamped = vminq_f32(vmaxq_f32(v, lo), hi);
        vst1q_s32(lanes.as_mut_ptr(), vcvtnq_s32_f32(clamped));
        for (o, &q) in output[i..i + 4].iter_mut().zip(&lanes) {
            *o = q as i8;
        }
        i += 4;
    }
    serial::quantize_f32_i8(&input[bulk..], &mut output[bulk..]);
}
