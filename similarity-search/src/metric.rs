//! Distance metrics for scoring and ranking embeddings.
//!
//! This module provides the [`DistanceMetric`] trait and three strategies:
//!
//! - [`DotProduct`]: raw inner product, higher is more similar
//! - [`CosineSimilarity`]: inner product of the normalised vectors, higher is more similar
//! - [`EuclideanDistance`]: L2 distance, lower is more similar

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::topk::top_k_by;

/// A strategy for comparing two embeddings and ranking candidates.
pub trait DistanceMetric: Send + Sync {
    /// Score `b` against `a`. Vectors of different lengths are not
    /// truncated; the metric returns its worst possible score instead.
    fn distance(&self, a: &[f32], b: &[f32]) -> f32;

    /// Whether a higher score means a closer match.
    fn higher_is_better(&self) -> bool;

    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Score `query` against every candidate and return the best `k`
    /// `(score, candidate_index)` pairs, best first.
    ///
    /// Returns exactly `min(k, candidates.len())` entries. Equal scores are
    /// ordered by candidate index. A NaN score ranks as the worst possible
    /// score (infinitely far).
    fn find_nearest(&self, query: &[f32], candidates: &[&[f32]], k: usize) -> Vec<(f32, usize)> {
        let higher_is_better = self.higher_is_better();
        let worst = if higher_is_better { f32::NEG_INFINITY } else { f32::INFINITY };
        let scored = candidates.iter().enumerate().map(|(index, candidate)| {
            let score = self.distance(query, candidate);
            (if score.is_nan() { worst } else { score }, index)
        });

        top_k_by(scored, k, |a, b| {
            let by_score = if higher_is_better { b.0.total_cmp(&a.0) } else { a.0.total_cmp(&b.0) };
            by_score.then(a.1.cmp(&b.1)).is_lt()
        })
    }
}

fn lengths_match(metric: &'static str, a: &[f32], b: &[f32]) -> bool {
    if a.len() != b.len() {
        warn!(metric, left = a.len(), right = b.len(), "embeddings must have the same length");
        return false;
    }
    true
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Inner product of two vectors.
///
/// Use it when embeddings are already normalised by the model, or when
/// vector magnitude should contribute to the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotProduct;

impl DistanceMetric for DotProduct {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        if !lengths_match(self.name(), a, b) {
            return -f32::MAX;
        }
        dot(a, b)
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "dot_product"
    }
}

/// Cosine of the angle between two vectors, ignoring their magnitudes.
///
/// Returns 0.0 if either vector has zero magnitude and -1.0 on a length
/// mismatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl DistanceMetric for CosineSimilarity {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        if !lengths_match(self.name(), a, b) {
            return -1.0;
        }
        let norm_a = dot(a, a).sqrt();
        let norm_b = dot(b, b).sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot(a, b) / (norm_a * norm_b)
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "cosine"
    }
}

/// Straight-line distance between two points.
///
/// Ranks ascending: the nearest candidate has the smallest score.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceMetric for EuclideanDistance {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        if !lengths_match(self.name(), a, b) {
            return f32::MAX;
        }
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// Serializable selector for the built-in metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    DotProduct,
    #[default]
    Cosine,
    Euclidean,
}

impl MetricKind {
    /// Instantiate the metric this variant names.
    pub fn build(self) -> Arc<dyn DistanceMetric> {
        match self {
            MetricKind::DotProduct => Arc::new(DotProduct),
            MetricKind::Cosine => Arc::new(CosineSimilarity),
            MetricKind::Euclidean => Arc::new(EuclideanDistance),
        }
    }
}
