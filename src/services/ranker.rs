use std::cmp::Ordering;

use crate::error::{AppError, AppResult};

use super::features::FeatureMatrix;
use super::tfidf::TermVector;

/// A catalog position and its similarity to the query
pub type Ranked = (usize, f64);

/// Cosine similarity with precomputed norms; zero when either vector is zero
pub fn cosine(query: &TermVector, query_norm: f64, row: &TermVector, row_norm: f64) -> f64 {
    let denominator = query_norm * row_norm;
    if denominator == 0.0 {
        return 0.0;
    }
    query.dot(row) / denominator
}

/// Descending score, then ascending catalog position
fn by_score_then_position(a: &Ranked, b: &Ranked) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(&b.0))
}

/// Scores every row against the query and returns the best `top_n`.
///
/// `top_n` larger than the matrix is clamped to its length. Equal scores keep
/// catalog order, so the result is identical to a stable descending sort.
pub fn rank(query: &TermVector, matrix: &FeatureMatrix, top_n: usize) -> AppResult<Vec<Ranked>> {
    if top_n == 0 {
        return Err(AppError::Validation("top_n must be at least 1".to_string()));
    }

    let query_norm = query.norm();
    let mut scored = Vec::with_capacity(matrix.len());
    for (position, (row, row_norm)) in matrix.rows_with_norms().enumerate() {
        if row.dim() != query.dim() {
            return Err(AppError::Computation(format!(
                "Query has {} dimensions but catalog row {} has {}",
                query.dim(),
                position,
                row.dim()
            )));
        }

        let score = cosine(query, query_norm, row, row_norm);
        if !score.is_finite() {
            return Err(AppError::Computation(format!(
                "Non-finite similarity for catalog row {}",
                position
            )));
        }
        scored.push((position, score));
    }

    let top_n = top_n.min(scored.len());
    if top_n == 0 {
        return Ok(scored);
    }
    if top_n < scored.len() {
        scored.select_nth_unstable_by(top_n - 1, by_score_then_position);
        scored.truncate(top_n);
    }
    scored.sort_by(by_score_then_position);

    Ok(scored)
}
