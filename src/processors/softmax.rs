//! Softmax normalization and label selection over classification logits.

use crate::core::{ScoreError, ScoreResult, Tensor2D};
use crate::labels::LabelTable;
use std::sync::Arc;

/// Converts a logit vector into a probability distribution.
///
/// Numerically stable: the maximum logit is subtracted before
/// exponentiation, so large values (e.g. `[1000.0, 1.0, 0.0]`) never
/// overflow to infinity. The result sums to 1 within floating-point
/// tolerance and every entry lies in `[0, 1]`.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|v| v / sum).collect()
}

/// Applies [`softmax`] to every row of a (batch, class) logits tensor.
pub fn softmax_batch(logits: &Tensor2D) -> Tensor2D {
    let mut out = logits.clone();
    for mut row in out.rows_mut() {
        let probs = softmax(&row.to_vec());
        for (dst, src) in row.iter_mut().zip(probs) {
            *dst = src;
        }
    }
    out
}

/// Selects the most probable class and maps it to its label.
///
/// Ties resolve to the lowest class index, so repeated calls with identical
/// input return identical results.
///
/// # Arguments
///
/// * `probabilities` - Probability per class, index-aligned with the table.
/// * `labels` - The label table to map the winning index through.
///
/// # Returns
///
/// The winning label, its probability, and its class index.
///
/// # Errors
///
/// Returns [`ScoreError::LabelIndex`] if the probability vector and the
/// label table have different lengths, and [`ScoreError::InvalidInput`] for
/// an empty probability vector.
pub fn top_label(
    probabilities: &[f32],
    labels: &LabelTable,
) -> ScoreResult<(Arc<str>, f32, usize)> {
    if probabilities.len() != labels.len() {
        return Err(ScoreError::label_index(probabilities.len(), labels.len()));
    }
    let (best_idx, best_prob) = probabilities
        .iter()
        .copied()
        .enumerate()
        // Strict comparison keeps the lowest index on ties.
        .fold((0usize, f32::NEG_INFINITY), |(bi, bp), (i, p)| {
            if p > bp {
                (i, p)
            } else {
                (bi, bp)
            }
        });
    let label = labels
        .get(best_idx)
        .ok_or_else(|| ScoreError::invalid_input("empty probability vector"))?;
    Ok((Arc::clone(label), best_prob, best_idx))
}

/// Returns the `k` most probable classes as `(index, probability)` pairs,
/// ordered by descending probability with ties broken by ascending index.
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    indexed.truncate(k);
    indexed
}
