use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::error::DomainError;
use crate::models::{BestModel, LeaderboardRow, ModelMetrics};

/// Rejects scores that are NaN, infinite or outside `[0, 1]`, and repeated
/// algorithm ids.
pub fn validate_metrics(metrics: &[ModelMetrics]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for m in metrics {
        if !seen.insert(m.algorithm.as_str()) {
            return Err(DomainError::InvalidMetric {
                algorithm: m.algorithm.clone(),
                reason: "duplicate algorithm id".to_string(),
            });
        }
        for (name, score) in m.scores() {
            if !score.is_finite() || !(0.0..=1.0).contains(&score) {
                return Err(DomainError::InvalidMetric {
                    algorithm: m.algorithm.clone(),
                    reason: format!("{} = {} is outside [0, 1]", name, score),
                });
            }
        }
    }
    Ok(())
}

/// Highest `f1_score`; on a tie the earliest record wins.
pub fn select_best(metrics: &[ModelMetrics]) -> Result<Option<&ModelMetrics>, DomainError> {
    validate_metrics(metrics)?;
    let mut best: Option<&ModelMetrics> = None;
    for m in metrics {
        match best {
            Some(current) if m.f1_score <= current.f1_score => {}
            _ => best = Some(m),
        }
    }
    Ok(best)
}

/// All records by `f1_score` descending. The sort is stable, so ties keep
/// their input order.
pub fn ranked(metrics: &[ModelMetrics]) -> Result<Vec<ModelMetrics>, DomainError> {
    validate_metrics(metrics)?;
    let mut sorted = metrics.to_vec();
    // Validated above, so every score is comparable.
    sorted.sort_by(|a, b| b.f1_score.partial_cmp(&a.f1_score).unwrap_or(Ordering::Equal));
    Ok(sorted)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
    pub best: Option<ModelMetrics>,
}

impl Leaderboard {
    pub fn build(metrics: &[ModelMetrics]) -> Result<Self, DomainError> {
        let sorted = ranked(metrics)?;
        let rows = sorted
            .iter()
            .enumerate()
            .map(|(i, m)| LeaderboardRow::new(i + 1, m))
            .collect();
        Ok(Self {
            rows,
            best: sorted.into_iter().next(),
        })
    }

    pub fn best_model(&self) -> Option<BestModel> {
        self.best.as_ref().map(best_model_of)
    }
}

pub fn best_model_of(metrics: &ModelMetrics) -> BestModel {
    BestModel {
        name: metrics.algorithm.clone(),
        accuracy: metrics.accuracy,
    }
}
