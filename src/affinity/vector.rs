//! Per-query score vectors: accumulation, combination, normalization,
//! and deterministic ranking.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// One ranked expansion hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub id: EntityId,
    pub score: f32,
}

/// Sparse map from target entity to accumulated relation score.
///
/// Built fresh per query and discarded after ranking; never stored. All
/// ordering questions are settled in [`AggregatedVector::ranked`]:
/// descending score with ascending ID as the tie-break, so equal-score
/// results never depend on hash-map iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedVector {
    scores: HashMap<EntityId, f32>,
}

impl AggregatedVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform-score vector over `ids`, used for already-selected filters
    /// that should rank at a fixed strength.
    #[must_use]
    pub fn constant(ids: &[EntityId], weight: f32) -> Self {
        Self {
            scores: ids.iter().map(|&id| (id, weight)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn get(&self, id: EntityId) -> Option<f32> {
        self.scores.get(&id).copied()
    }

    /// Accumulate `score` onto `id`, summing with anything already there.
    pub fn add(&mut self, id: EntityId, score: f32) {
        *self.scores.entry(id).or_insert(0.0) += score;
    }

    pub fn remove(&mut self, id: EntityId) {
        self.scores.remove(&id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, f32)> + '_ {
        self.scores.iter().map(|(&id, &score)| (id, score))
    }

    /// Union-of-keys addition with a missing key counting as zero, then a
    /// uniform scale by `weight`.
    #[must_use]
    pub fn combine(&self, other: &Self, weight: f32) -> Self {
        let mut scores = self.scores.clone();
        for (&id, &score) in &other.scores {
            *scores.entry(id).or_insert(0.0) += score;
        }
        if (weight - 1.0).abs() > f32::EPSILON {
            for score in scores.values_mut() {
                *score *= weight;
            }
        }
        Self { scores }
    }

    pub fn l2_norm(&self) -> f32 {
        self.scores.values().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Scale to unit L2 length, dropping zero-score entries. Empty and
    /// all-zero vectors come back unchanged; normalization never divides
    /// by zero and never invents entries.
    #[must_use]
    pub fn l2_normalized(&self) -> Self {
        let norm = self.l2_norm();
        if norm == 0.0 {
            return self.clone();
        }
        let scores = self
            .scores
            .iter()
            .filter(|&(_, &score)| score != 0.0)
            .map(|(&id, &score)| (id, score / norm))
            .collect();
        Self { scores }
    }

    /// All entries, best first: descending score, ascending ID on ties.
    #[must_use]
    pub fn ranked(&self) -> Vec<ScoredEntity> {
        self.scores
            .iter()
            .map(|(&id, &score)| ScoredEntity { id, score })
            .sorted_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }

    /// Keep only the `n` best entries under the [`ranked`] ordering.
    ///
    /// [`ranked`]: AggregatedVector::ranked
    #[must_use]
    pub fn top_n(&self, n: usize) -> Self {
        if self.scores.len() <= n {
            return self.clone();
        }
        let scores = self
            .ranked()
            .into_iter()
            .take(n)
            .map(|entry| (entry.id, entry.score))
            .collect();
        Self { scores }
    }
}

impl FromIterator<(EntityId, f32)> for AggregatedVector {
    fn from_iter<I: IntoIterator<Item = (EntityId, f32)>>(iter: I) -> Self {
        let mut vector = Self::new();
        for (id, score) in iter {
            vector.add(id, score);
        }
        vector
    }
}
