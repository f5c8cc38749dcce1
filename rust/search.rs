//! Exact nearest-neighbour scan over packed int8 embeddings.

use crate::error::{KernelError, Result};
use crate::kernels::Backend;
use crate::numerics::{cosine_from_products, Quantize};

/// A database row scoring at or above the similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Row index into the database.
    pub index: usize,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub similarity: f32,
}

/// Returns up to `k` rows of `database` most similar to `query`.
///
/// `database` holds rows of `query.len()` values back to back. Only rows with
/// cosine similarity `>= min_similarity` are returned, ordered by similarity
/// descending and then by row index.
pub fn nearest(
    query: &[i8],
    database: &[i8],
    k: usize,
    min_similarity: f32,
) -> Result<Vec<Match>> {
    let dims = query.len();
    if dims == 0 {
        return Err(KernelError::EmptyVector);
    }
    if database.len() % dims != 0 {
        return Err(KernelError::LengthMismatch {
            expected: database.len() - database.len() % dims + dims,
            got: database.len(),
        });
    }
    if min_similarity.is_nan() {
        return Err(KernelError::NonFinite { index: 0 });
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let backend = Backend::select();
    let query_norm = backend.dot_i8(query, query);
    let mut matches: Vec<Match> = database
        .chunks_exact(dims)
        .enumerate()
        .filter_map(|(index, row)| {
            let similarity = cosine_from_products(
                backend.dot_i8(query, row),
                query_norm,
                backend.dot_i8(row, row),
            );
            (similarity >= min_similarity).then_some(Match { index, similarity })
        })
        .collect();

    let candidates = matches.len();
    matches.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then(a.index.cmp(&b.index))
    });
    matches.truncate(k);

    tracing::debug!(
        rows = database.len() / dims,
        dims,
        candidates,
        returned = matches.len(),
        "nearest-neighbour scan"
    );
    Ok(matches)
}

/// Quantizes an `f32` query with the shared scale, then runs [`nearest`].
pub fn nearest_f32(
    query: &[f32],
    database: &[i8],
    k: usize,
    min_similarity: f32,
) -> Result<Vec<Match>> {
    let mut quantized = vec![0i8; query.len()];
    f32::quantize(query, &mut quantized)?;
    nearest(&quantized, database, k, min_similarity)
}
