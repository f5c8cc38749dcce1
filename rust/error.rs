//! Error types shared by every kernel operation.

use thiserror::Error;

/// Broad classification of a [`KernelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A precondition on lengths, counts or values was violated.
    InvalidArgument,
    /// An exact integer result does not fit the output width.
    NumericOverflow,
}

/// Error type for kernel operations.
///
/// Every operation validates its inputs before touching memory, so an error
/// always means that no output buffer was modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Two buffers that must have the same length do not.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// A buffer is shorter than the declared count requires.
    #[error("buffer too short: {required} elements required, got {got}")]
    BufferTooShort { required: usize, got: usize },

    /// A count is negative, or a product of counts overflows `usize`.
    #[error("invalid count {count}: {reason}")]
    InvalidCount { count: i64, reason: &'static str },

    /// A transform matrix has neither 16 nor 12 elements.
    #[error("invalid matrix length {len}: expected 16 (4x4) or 12 (3x4)")]
    InvalidMatrix { len: usize },

    /// An input holds NaN, or a matrix holds any non-finite entry.
    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    /// A vector argument that must not be empty is.
    #[error("empty vector")]
    EmptyVector,

    /// An exact dot product does not fit in `i32`.
    #[error("dot product {value} overflows i32")]
    Overflow { value: i64 },
}

impl KernelError {
    /// Maps the error onto the two-level taxonomy hosts report.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KernelError::Overflow { .. } => ErrorKind::NumericOverflow,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T> = core::result::Result<T, KernelError>;

/// Fails with [`KernelError::LengthMismatch`] unless `a` and `b` have equal length.
#[inline]
pub(crate) fn ensure_same_len<A, B>(a: &[A], b: &[B]) -> Result<()> {
    if a.len() != b.len() {
        return Err(KernelError::LengthMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Fails with [`KernelError::BufferTooShort`] unless `buffer` holds `required` elements.
#[inline]
pub(crate) fn ensure_capacity<T>(buffer: &[T], required: usize) -> Result<()> {
    if buffer.len() < required {
        return Err(KernelError::BufferTooShort {
            required,
            got: buffer.len(),
        });
    }
    Ok(())
}

/// Multiplies two element counts, reporting `usize` overflow as an invalid count.
#[inline]
pub(crate) fn checked_extent(count: usize, width: usize) -> Result<usize> {
    count.checked_mul(width).ok_or(KernelError::InvalidCount {
        count: i64::try_from(count).unwrap_or(i64::MAX),
        reason: "element count overflows usize",
    })
}
