//! Numeric traits and implementations for kernel operations.
//!
//! This module provides hardware-accelerated implementations of:
//!
//! - **Spatial similarity** over int8 embeddings: [`Dot`], [`Angular`], [`Euclidean`]
//! - **Reductions** over row-major matrices: [`RowSums`]
//! - **Point transforms**: [`Transform`]
//! - **Quantization**: [`Quantize`], plus half-precision storage via [`quantize_f16`]
//!
//! Every function validates its arguments and returns a [`KernelError`] instead
//! of reading or writing out of bounds.

use half::f16;

use crate::error::{checked_extent, ensure_capacity, ensure_same_len, KernelError, Result};
use crate::kernels::Backend;
use crate::matrix::AffineMatrix;
use crate::QUANTIZATION_SCALE;

// region: Dot

/// Computes the exact **dot product** between two vectors.
pub trait Dot: Sized {
    type Output;

    /// Fails with [`KernelError::Overflow`] if the exact sum does not fit `Output`.
    fn dot(a: &[Self], b: &[Self]) -> Result<Self::Output>;

    /// Alias for `dot`.
    fn inner(a: &[Self], b: &[Self]) -> Result<Self::Output> {
        Self::dot(a, b)
    }
}

impl Dot for i8 {
    type Output = i32;

    /// Products are accumulated exactly in 64 bits, so overflow is detected,
    /// not wrapped. It cannot happen below 131 072 elements.
    fn dot(a: &[Self], b: &[Self]) -> Result<Self::Output> {
        ensure_same_len(a, b)?;
        let value = Backend::select().dot_i8(a, b);
        i32::try_from(value).map_err(|_| KernelError::Overflow { value })
    }
}

// endregion: Dot

// region: Angular

/// Computes **cosine similarity** and **angular distance** between two vectors.
pub trait Angular: Sized {
    /// `dot(a, b) / (|a| * |b|)`, or 0 when either vector has zero norm.
    fn cosine(a: &[Self], b: &[Self]) -> Result<f32>;

    /// `1 - cosine(a, b)`, in `[0, 2]`.
    fn angular(a: &[Self], b: &[Self]) -> Result<f32> {
        Self::cosine(a, b).map(|c| 1.0 - c)
    }
}

impl Angular for i8 {
    fn cosine(a: &[Self], b: &[Self]) -> Result<f32> {
        ensure_same_len(a, b)?;
        let backend = Backend::select();
        let ab = backend.dot_i8(a, b);
        let aa = backend.dot_i8(a, a);
        let bb = backend.dot_i8(b, b);
        Ok(cosine_from_products(ab, aa, bb))
    }
}

/// Shared by [`Angular`] and the search scan, which caches the query norm.
#[inline]
pub(crate) fn cosine_from_products(ab: i64, aa: i64, bb: i64) -> f32 {
    if aa == 0 || bb == 0 {
        return 0.0;
    }
    let cosine = ab as f64 / ((aa as f64).sqrt() * (bb as f64).sqrt());
    cosine.clamp(-1.0, 1.0) as f32
}

// endregion: Angular

// region: Euclidean

/// Computes the **Euclidean distance** (L2) between two vectors.
pub trait Euclidean: Sized {
    type SqEuclideanOutput;
    type EuclideanOutput;

    /// Squared Euclidean distance (L2²), exact for integer inputs.
    fn sqeuclidean(a: &[Self], b: &[Self]) -> Result<Self::SqEuclideanOutput>;

    /// Euclidean distance (L2). True metric distance.
    fn euclidean(a: &[Self], b: &[Self]) -> Result<Self::EuclideanOutput>;
}

impl Euclidean for i8 {
    type SqEuclideanOutput = u64;
    type EuclideanOutput = f32;

    fn sqeuclidean(a: &[Self], b: &[Self]) -> Result<Self::SqEuclideanOutput> {
        ensure_same_len(a, b)?;
        Ok(Backend::select().sqeuclidean_i8(a, b))
    }

    /// Zero exactly when `a == b`; identical on every backend.
    fn euclidean(a: &[Self], b: &[Self]) -> Result<Self::EuclideanOutput> {
        let squared = Self::sqeuclidean(a, b)?;
        Ok((squared as f64).sqrt() as f32)
    }
}

// endregion: Euclidean

// region: Reductions

/// Per-row horizontal sums of a row-major matrix.
pub trait RowSums: Sized {
    /// Sums each of `rows` rows of `cols` elements into `out[..rows]`.
    ///
    /// Elements past `rows * cols` in `matrix`, and past `rows` in `out`, are
    /// left alone.
    fn row_sums_into(matrix: &[Self], rows: usize, cols: usize, out: &mut [Self]) -> Result<()>;

    /// Allocating form of [`RowSums::row_sums_into`].
    fn row_sums(matrix: &[Self], rows: usize, cols: usize) -> Result<Vec<Self>>;
}

impl RowSums for f32 {
    fn row_sums_into(matrix: &[Self], rows: usize, cols: usize, out: &mut [Self]) -> Result<()> {
        ensure_capacity(matrix, checked_extent(rows, cols)?)?;
        ensure_capacity(out, rows)?;
        if cols == 0 {
            out[..rows].fill(0.0);
            return Ok(());
        }
        let backend = Backend::select();
        for (sum, row) in out[..rows].iter_mut().zip(matrix.chunks_exact(cols)) {
            *sum = backend.sum_f32(row);
        }
        Ok(())
    }

    fn row_sums(matrix: &[Self], rows: usize, cols: usize) -> Result<Vec<Self>> {
        // Validate before allocating `rows` outputs.
        ensure_capacity(matrix, checked_extent(rows, cols)?)?;
        let mut out = Vec::new();
        if out.try_reserve_exact(rows).is_err() {
            return Err(KernelError::InvalidCount {
                count: i64::try_from(rows).unwrap_or(i64::MAX),
                reason: "row count exceeds addressable memory",
            });
        }
        out.resize(rows, 0.0);
        Self::row_sums_into(matrix, rows, cols, &mut out)?;
        Ok(out)
    }
}

// endregion: Reductions

// region: Transform

/// In-place affine transform of packed `(x, y, z)` triples.
pub trait Transform: Sized {
    /// Transforms the first `count` points of `points`; later elements are untouched.
    ///
    /// See [`AffineMatrix`] for the matrix convention.
    fn transform_points(points: &mut [Self], matrix: &AffineMatrix, count: usize) -> Result<()>;
}

impl Transform for f32 {
    fn transform_points(points: &mut [Self], matrix: &AffineMatrix, count: usize) -> Result<()> {
        let extent = checked_extent(count, 3)?;
        ensure_capacity(points, extent)?;
        Backend::select().transform_f32(&mut points[..extent], matrix.rows());
        Ok(())
    }
}

// endregion: Transform

// region: Quantization

/// Fixed-point quantization with the shared scale of 127.
pub trait Quantize: Sized {
    type Quantized;

    /// `output[i] = saturate(round_ties_even(input[i] * 127))`.
    ///
    /// Infinities saturate; NaN fails with [`KernelError::NonFinite`] before
    /// `output` is written.
    fn quantize(input: &[Self], output: &mut [Self::Quantized]) -> Result<()>;

    /// `output[i] = input[i] / 127`.
    fn dequantize(input: &[Self::Quantized], output: &mut [Self]) -> Result<()>;
}

impl Quantize for f32 {
    type Quantized = i8;

    fn quantize(input: &[Self], output: &mut [Self::Quantized]) -> Result<()> {
        ensure_same_len(input, output)?;
        ensure_not_nan(input)?;
        Backend::select().quantize_f32_i8(input, output);
        Ok(())
    }

    fn dequantize(input: &[Self::Quantized], output: &mut [Self]) -> Result<()> {
        ensure_same_len(input, output)?;
        for (o, &q) in output.iter_mut().zip(input) {
            *o = f32::from(q) / QUANTIZATION_SCALE;
        }
        Ok(())
    }
}

/// Converts to IEEE half precision (round to nearest even).
///
/// Magnitudes beyond 65 504 become infinities; NaN is rejected.
pub fn quantize_f16(input: &[f32], output: &mut [f16]) -> Result<()> {
    ensure_same_len(input, output)?;
    ensure_not_nan(input)?;
    for (o, &v) in output.iter_mut().zip(input) {
        *o = f16::from_f32(v);
    }
    Ok(())
}

/// Widens half-precision values back to `f32`; exact.
pub fn dequantize_f16(input: &[f16], output: &mut [f32]) -> Result<()> {
    ensure_same_len(input, output)?;
    for (o, &h) in output.iter_mut().zip(input) {
        *o = h.to_f32();
    }
    Ok(())
}

fn ensure_not_nan(values: &[f32]) -> Result<()> {
    match values.iter().position(|v| v.is_nan()) {
        Some(index) => Err(KernelError::NonFinite { index }),
        None => Ok(()),
    }
}

// endregion: Quantization
