//! # meaning-kernel - SIMD Kernels for Quantized Embeddings and 3D Points
//!
//! * Int8 embedding similarity: exact dot products, Euclidean and angular distances.
//! * Batch quantization of `f32` embeddings to int8 with saturation, plus `f16` storage.
//! * Row-wise sums of row-major matrices.
//! * In-place affine transforms of packed `(x, y, z)` point buffers.
//! * Targets x86 AVX2 and ARM NEON, with a serial fallback selected at runtime.
//!
//! Every backend produces the same result as the serial reference: integer
//! kernels are exact, point transforms and quantization are bit-identical, and
//! row sums agree within floating-point reassociation error.
//!
//! ## Quantization convention
//!
//! An int8 value `q` stands for `q / 127.0`. All vectors compared with each
//! other must use this same scale.
//!
//! # Example
//!
//! ```rust
//! use meaning_kernel::{Dot, Euclidean, Quantize};
//!
//! let a = &[0.25_f32, -0.5, 1.0];
//! let b = &[0.25_f32, 0.5, -1.0];
//!
//! let (mut qa, mut qb) = ([0i8; 3], [0i8; 3]);
//! f32::quantize(a, &mut qa).unwrap();
//! f32::quantize(b, &mut qb).unwrap();
//!
//! // Exact integer inner product
//! let similarity = i8::dot(&qa, &qb).unwrap();
//!
//! // Euclidean distance between the quantized vectors
//! let distance = i8::euclidean(&qa, &qb).unwrap();
//! assert!(distance > 0.0 && similarity < 0);
//! ```
//!
//! ## Traits
//!
//! - `dot(a, b)`: exact integer dot product, overflow reported instead of wrapped.
//! - `cosine(a, b)` / `angular(a, b)`: cosine similarity and `1 - cosine`.
//! - `sqeuclidean(a, b)` / `euclidean(a, b)`: squared and plain L2 distances.
//! - `row_sums(matrix, rows, cols)`: per-row sums of a row-major matrix.
//! - `transform_points(points, matrix, count)`: in-place affine transform.
//! - `quantize(input, output)` / `dequantize(input, output)`: int8 fixed point.
//!
//! The [`host`] module wraps the same operations with the signed counts a
//! managed host passes across its foreign-function boundary.

pub mod capabilities;
pub mod error;
pub mod host;
pub mod matrix;
pub mod numerics;
pub mod search;

mod kernels;

/// Fixed-point scale shared by every quantized vector.
pub const QUANTIZATION_SCALE: f32 = 127.0;

pub use capabilities::cap;
pub use error::{ErrorKind, KernelError};
pub use half::f16;
pub use matrix::AffineMatrix;
pub use numerics::{
    dequantize_f16, quantize_f16, Angular, Dot, Euclidean, Quantize, RowSums, Transform,
};
pub use search::{nearest, nearest_f32, Match};

/// `SpatialSimilarity` bundles spatial distance metrics: Dot, Angular, and Euclidean.
pub trait SpatialSimilarity: Dot + Angular + Euclidean {}
impl<T: Dot + Angular + Euclidean> SpatialSimilarity for T {}
