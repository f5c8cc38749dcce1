//! Entry points for a managed host.
//!
//! Hosts pass buffers with signed 32-bit counts, as JVM arrays do. These
//! functions reject negative counts and short buffers before any kernel runs,
//! log the failure at `debug` level, and never keep a reference to a buffer
//! after returning.

use crate::error::{ensure_capacity, KernelError, Result};
use crate::matrix::AffineMatrix;
use crate::numerics::{Dot, Euclidean, Quantize, RowSums, Transform};

/// Euclidean distance between two equal-length quantized vectors.
pub fn distance(v1: &[i8], v2: &[i8]) -> Result<f32> {
    reported("distance", i8::euclidean(v1, v2))
}

/// Exact integer dot product between two equal-length quantized vectors.
pub fn similarity(v1: &[i8], v2: &[i8]) -> Result<i32> {
    reported("similarity", i8::dot(v1, v2))
}

/// Transforms the first `point_count` points of `points` in place.
///
/// `matrix` holds 16 (4×4) or 12 (3×4) row-major values; see
/// [`AffineMatrix`] for the convention.
pub fn transform(points: &mut [f32], matrix: &[f32], point_count: i32) -> Result<()> {
    let result = count(point_count).and_then(|count| {
        let matrix = AffineMatrix::try_from_slice(matrix)?;
        f32::transform_points(points, &matrix, count)
    });
    reported("transform", result)
}

/// Sums each row of a `rows × cols` row-major tensor.
pub fn row_sums(tensor: &[f32], rows: i32, cols: i32) -> Result<Vec<f32>> {
    let result = count(rows)
        .and_then(|rows| count(cols).map(|cols| (rows, cols)))
        .and_then(|(rows, cols)| f32::row_sums(tensor, rows, cols));
    reported("row_sums", result)
}

/// Quantizes the first `count` values of `input` into the first `count` bytes of `output`.
pub fn quantize(input: &[f32], count: i32, output: &mut [i8]) -> Result<()> {
    let result = self::count(count).and_then(|count| {
        ensure_capacity(input, count)?;
        ensure_capacity(output, count)?;
        f32::quantize(&input[..count], &mut output[..count])
    });
    reported("quantize", result)
}

fn count(value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| KernelError::InvalidCount {
        count: i64::from(value),
        reason: "count must not be negative",
    })
}

fn reported<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(error) = &result {
        tracing::debug!(operation, kind = ?error.kind(), %error, "rejected kernel call");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn distance_and_similarity() {
        assert_eq!(similarity(&[1, 2, 3], &[4, 5, 6]), Ok(32));
        assert_eq!(distance(&[1, 2, 3], &[1, 2, 3]), Ok(0.0));
        let err = distance(&[1, 2, 3], &[1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn transform_with_host_matrix() {
        let mut matrix = AffineMatrix::IDENTITY.to_4x4();
        matrix[3] = 10.0;
        let mut points = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        transform(&mut points, &matrix, 2).unwrap();
        assert_eq!(points, vec![11.0, 2.0, 3.0, 14.0, 5.0, 6.0]);

        transform(&mut points, &matrix[..12], 0).unwrap();
        assert_eq!(points, vec![11.0, 2.0, 3.0, 14.0, 5.0, 6.0]);
    }

    #[test]
    fn transform_rejects_bad_arguments() {
        let identity = AffineMatrix::IDENTITY.to_4x4();
        let mut points = vec![0.0; 6];
        let err = transform(&mut points, &identity, -1).unwrap_err();
        assert!(matches!(err, KernelError::InvalidCount { count: -1, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            transform(&mut points, &identity, 3),
            Err(KernelError::BufferTooShort {
                required: 9,
                got: 6,
            })
        );
        assert_eq!(
            transform(&mut points, &identity[..9], 1),
            Err(KernelError::InvalidMatrix { len: 9 })
        );
    }

    #[test]
    fn row_sums_counts() {
        assert_eq!(row_sums(&[1.0, 2.0, 3.0, 4.0, 5.0], 1, 5), Ok(vec![15.0]));
        let err = row_sums(&[1.0], -2, 1).unwrap_err();
        assert!(matches!(err, KernelError::InvalidCount { count: -2, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = row_sums(&[1.0], 1, -1).unwrap_err();
        assert!(matches!(err, KernelError::InvalidCount { count: -1, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn quantize_counts() {
        let input = [1.0, -1.0, 2.0, 0.5];
        let mut output = [0i8; 4];
        quantize(&input, 3, &mut output).unwrap();
        assert_eq!(output, [127, -127, 127, 0]);

        assert_eq!(
            quantize(&input, 5, &mut output),
            Err(KernelError::BufferTooShort {
                required: 5,
                got: 4,
            })
        );
        let mut short = [0i8; 2];
        assert_eq!(
            quantize(&input, 3, &mut short),
            Err(KernelError::BufferTooShort {
                required: 3,
                got: 2,
            })
        );
        let err = quantize(&input, -3, &mut output).unwrap_err();
        assert!(matches!(err, KernelError::InvalidCount { count: -3, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn overflow_kind() {
        let v = vec![-128i8; 140_000];
        let err = similarity(&v, &v).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericOverflow);
    }
}
