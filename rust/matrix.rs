//! Affine transform matrices.
//!
//! # Convention
//!
//! Matrices are **row-major** and applied with the point as a homogeneous
//! column on the right: for a point `(x, y, z)` the output coordinate `r` is
//! `M[r][0] * x + M[r][1] * y + M[r][2] * z + M[r][3]`. The translation is
//! therefore the fourth *column*. A 4×4 input's bottom row is not read: the
//! transform is affine, with no perspective divide.

use crate::error::{KernelError, Result};
use crate::kernels::serial;

/// A validated 3×4 affine transform: a 3×3 linear part plus a translation column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMatrix {
    rows: [[f32; 4]; 3],
}

impl AffineMatrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ],
    };

    /// Builds a matrix from three rows, rejecting non-finite entries.
    pub fn from_rows(rows: [[f32; 4]; 3]) -> Result<Self> {
        if let Some(index) = rows.iter().flatten().position(|v| !v.is_finite()) {
            return Err(KernelError::NonFinite { index });
        }
        Ok(Self { rows })
    }

    /// Parses 16 (4×4) or 12 (3×4) row-major values.
    ///
    /// Only the first 12 values are used; every value must still be finite.
    pub fn try_from_slice(values: &[f32]) -> Result<Self> {
        if values.len() != 16 && values.len() != 12 {
            return Err(KernelError::InvalidMatrix { len: values.len() });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(KernelError::NonFinite { index });
        }
        let mut rows = [[0f32; 4]; 3];
        for (row, chunk) in rows.iter_mut().zip(values.chunks_exact(4)) {
            row.copy_from_slice(chunk);
        }
        Ok(Self { rows })
    }

    /// A pure translation by `(x, y, z)`.
    pub fn translation(x: f32, y: f32, z: f32) -> Result<Self> {
        let mut rows = Self::IDENTITY.rows;
        rows[0][3] = x;
        rows[1][3] = y;
        rows[2][3] = z;
        Self::from_rows(rows)
    }

    /// A uniform scale about the origin.
    pub fn scale(factor: f32) -> Result<Self> {
        let mut rows = Self::IDENTITY.rows;
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = factor;
        }
        Self::from_rows(rows)
    }

    #[inline]
    pub fn rows(&self) -> &[[f32; 4]; 3] {
        &self.rows
    }

    #[inline]
    pub fn translation_column(&self) -> [f32; 3] {
        [self.rows[0][3], self.rows[1][3], self.rows[2][3]]
    }

    /// Full 4×4 row-major form, bottom row `(0, 0, 0, 1)`.
    pub fn to_4x4(&self) -> [f32; 16] {
        let mut out = [0f32; 16];
        for (chunk, row) in out.chunks_exact_mut(4).zip(&self.rows) {
            chunk.copy_from_slice(row);
        }
        out[15] = 1.0;
        out
    }

    /// Transforms a single point; the batch kernels agree with this bit for bit.
    #[inline]
    pub fn transform_point(&self, point: [f32; 3]) -> [f32; 3] {
        serial::transform_point(&self.rows, point)
    }
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<&[f32]> for AffineMatrix {
    type Error = KernelError;

    fn try_from(values: &[f32]) -> Result<Self> {
        Self::try_from_slice(values)
    }
}
