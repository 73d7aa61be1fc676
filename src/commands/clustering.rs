use serde::Serialize;

use crate::commands::{into_command_result, AppContext};
use crate::models::{ClusterOverview, VisualizationKind, VisualizationStatus};
use crate::services::dashboard_engine::fetch_clusters;
use crate::services::lifecycle::{RequestLifecycle, StartPolicy};
use crate::services::visualizations::fetch_visualization;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringView {
    pub clusters: Vec<ClusterOverview>,
    pub visualization: VisualizationStatus,
}

pub async fn get_clustering(ctx: &AppContext) -> Result<ClusteringView, String> {
    let transport = ctx.transport.as_ref();
    let lifecycle = RequestLifecycle::new("clustering", StartPolicy::Restart);

    let (outcome, plot) = tokio::join!(
        lifecycle.run(fetch_clusters(transport)),
        fetch_visualization(transport, VisualizationKind::Clustering),
    );

    let clusters = into_command_result(outcome)?;
    Ok(ClusteringView {
        clusters: clusters.iter().map(ClusterOverview::from).collect(),
        visualization: VisualizationStatus::of(VisualizationKind::Clustering, plot.as_ref()),
    })
}
