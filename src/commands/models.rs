use serde::Serialize;

use crate::commands::{into_command_result, AppContext};
use crate::error::ConsoleError;
use crate::models::{BestModel, LeaderboardRow, VisualizationKind, VisualizationStatus};
use crate::services::dashboard_engine::fetch_metrics;
use crate::services::leaderboard::Leaderboard;
use crate::services::lifecycle::{RequestLifecycle, StartPolicy};
use crate::services::visualizations::fetch_visualizations;

const PLOTS: [VisualizationKind; 2] = [
    VisualizationKind::ModelComparison,
    VisualizationKind::FeatureImportance,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelsView {
    pub rows: Vec<LeaderboardRow>,
    pub best_model: Option<BestModel>,
    pub visualizations: Vec<VisualizationStatus>,
}

pub async fn get_model_comparison(ctx: &AppContext) -> Result<ModelsView, String> {
    let transport = ctx.transport.as_ref();
    let lifecycle = RequestLifecycle::new("models.metrics", StartPolicy::Restart);

    let (outcome, plots) = tokio::join!(
        lifecycle.run(async {
            let metrics = fetch_metrics(transport).await?;
            Ok::<_, ConsoleError>(Leaderboard::build(&metrics)?)
        }),
        fetch_visualizations(transport, &PLOTS),
    );

    let leaderboard = into_command_result(outcome)?;
    Ok(ModelsView {
        best_model: leaderboard.best_model(),
        rows: leaderboard.rows,
        visualizations: plots
            .iter()
            .map(|(kind, plot)| VisualizationStatus::of(*kind, plot.as_ref()))
            .collect(),
    })
}
