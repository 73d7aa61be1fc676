use serde::Serialize;

use crate::commands::AppContext;
use crate::models::{DashboardSummary, LeaderboardRow, ModelMetrics};
use crate::services::dashboard_engine::DashboardAggregator;

/// Stat cards of the home page. A missing value means its source failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub total_predictions: Option<usize>,
    pub clusters: Option<usize>,
    pub best_model: Option<String>,
    pub best_model_accuracy: Option<String>,
    /// Every published model, in the order the data service lists them.
    pub models: Vec<LeaderboardRow>,
}

impl DashboardView {
    pub fn new(summary: &DashboardSummary, metrics: &[ModelMetrics]) -> Self {
        Self {
            total_predictions: summary.prediction_count,
            clusters: summary.cluster_count,
            best_model: summary.best_model.as_ref().map(|b| b.name.clone()),
            best_model_accuracy: summary
                .best_model
                .as_ref()
                .map(|b| format!("{}%", b.accuracy_percent())),
            models: metrics
                .iter()
                .enumerate()
                .map(|(i, m)| LeaderboardRow::new(i + 1, m))
                .collect(),
        }
    }
}

pub async fn get_dashboard_summary(ctx: &AppContext) -> Result<DashboardView, String> {
    let aggregator = DashboardAggregator::new(ctx.transport.clone());
    let summary = aggregator.load().await;
    let metrics = aggregator.metrics_state().payload().cloned().unwrap_or_default();
    Ok(DashboardView::new(&summary, &metrics))
}
