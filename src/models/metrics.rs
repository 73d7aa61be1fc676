use serde::{Deserialize, Serialize};

/// Evaluation scores of one trained classifier, as served by `/model-metrics/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub algorithm: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl ModelMetrics {
    pub fn scores(&self) -> [(&'static str, f64); 4] {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
        ]
    }
}

/// Human-readable name for an algorithm id; unknown ids are shown as-is.
pub fn model_display_name(algorithm: &str) -> &str {
    match algorithm {
        "random_forest" => "Random Forest",
        "knn" => "KNN",
        "naive_bayes" => "Naive Bayes",
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub algorithm: String,
    pub display_name: String,
    pub accuracy: String,
    pub precision: String,
    pub recall: String,
    pub f1_score: String,
}

impl LeaderboardRow {
    pub fn new(rank: usize, metrics: &ModelMetrics) -> Self {
        Self {
            rank,
            algorithm: metrics.algorithm.clone(),
            display_name: model_display_name(&metrics.algorithm).to_string(),
            accuracy: percent(metrics.accuracy),
            precision: percent(metrics.precision),
            recall: percent(metrics.recall),
            f1_score: percent(metrics.f1_score),
        }
    }
}

fn percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}
