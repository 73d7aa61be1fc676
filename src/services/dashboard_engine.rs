use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ConsoleResult;
use crate::models::{validate_clusters, BestModel, ClusterResult, DashboardSummary, ModelMetrics, PredictionRecord};
use crate::services::history::check_unique_ids;
use crate::services::leaderboard::{best_model_of, select_best};
use crate::services::lifecycle::{RequestLifecycle, RequestState, RunOutcome, StartPolicy};
use crate::services::transport::{self, Endpoint, Transport};

// ─── Reducer ───

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    Predictions,
    Clusters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Metrics,
    Count(CountSource),
}

/// What one settled call adds to the summary.
#[derive(Debug, Clone, PartialEq)]
pub enum Contribution {
    BestModel(BestModel),
    Count(CountSource, usize),
    /// The source failed or has nothing to show; its field is cleared.
    Unavailable(Source),
}

pub fn merge_metrics(summary: &DashboardSummary, best: &BestModel) -> DashboardSummary {
    DashboardSummary {
        best_model: Some(best.clone()),
        ..summary.clone()
    }
}

pub fn merge_count(summary: &DashboardSummary, source: CountSource, count: usize) -> DashboardSummary {
    let mut merged = summary.clone();
    match source {
        CountSource::Predictions => merged.prediction_count = Some(count),
        CountSource::Clusters => merged.cluster_count = Some(count),
    }
    merged
}

pub fn clear(summary: &DashboardSummary, source: Source) -> DashboardSummary {
    let mut cleared = summary.clone();
    match source {
        Source::Metrics => cleared.best_model = None,
        Source::Count(CountSource::Predictions) => cleared.prediction_count = None,
        Source::Count(CountSource::Clusters) => cleared.cluster_count = None,
    }
    cleared
}

/// Each source owns exactly one field, so folding one contribution per
/// source is commutative and applying a contribution twice changes nothing.
pub fn reduce(summary: &DashboardSummary, contribution: &Contribution) -> DashboardSummary {
    match contribution {
        Contribution::BestModel(best) => merge_metrics(summary, best),
        Contribution::Count(source, count) => merge_count(summary, *source, *count),
        Contribution::Unavailable(source) => clear(summary, *source),
    }
}

// ─── Aggregator ───

pub struct DashboardAggregator {
    transport: Arc<dyn Transport>,
    metrics: RequestLifecycle<Vec<ModelMetrics>>,
    predictions: RequestLifecycle<Vec<PredictionRecord>>,
    clusters: RequestLifecycle<Vec<ClusterResult>>,
    summary: watch::Sender<DashboardSummary>,
}

impl DashboardAggregator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (summary, _) = watch::channel(DashboardSummary::default());
        Self {
            transport,
            metrics: RequestLifecycle::new("dashboard.metrics", StartPolicy::Restart),
            predictions: RequestLifecycle::new("dashboard.predictions", StartPolicy::Restart),
            clusters: RequestLifecycle::new("dashboard.clusters", StartPolicy::Restart),
            summary,
        }
    }

    pub fn summary(&self) -> DashboardSummary {
        self.summary.borrow().clone()
    }

    /// Receiver marked changed on every partial update.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSummary> {
        self.summary.subscribe()
    }

    pub fn metrics_state(&self) -> RequestState<Vec<ModelMetrics>> {
        self.metrics.state()
    }

    pub fn predictions_state(&self) -> RequestState<Vec<PredictionRecord>> {
        self.predictions.state()
    }

    pub fn clusters_state(&self) -> RequestState<Vec<ClusterResult>> {
        self.clusters.state()
    }

    /// Refreshes every field. Until a call settles its field keeps the
    /// previous value; a failed call clears only its own field. Never fails.
    pub async fn load(&self) -> DashboardSummary {
        let transport = self.transport.as_ref();

        let metrics = async {
            let contribution = match self.metrics.run(fetch_metrics(transport)).await {
                RunOutcome::Settled(Ok(list)) => match select_best(&list) {
                    Ok(Some(best)) => Contribution::BestModel(best_model_of(best)),
                    Ok(None) => {
                        log::info!("no model metrics published yet");
                        Contribution::Unavailable(Source::Metrics)
                    }
                    Err(e) => {
                        log::warn!("best model unavailable: {}", e);
                        Contribution::Unavailable(Source::Metrics)
                    }
                },
                RunOutcome::Settled(Err(_)) => Contribution::Unavailable(Source::Metrics),
                _ => return,
            };
            self.apply(contribution);
        };

        let predictions = async {
            let settled = self.predictions.run(fetch_history(transport)).await.settled();
            self.apply_count(CountSource::Predictions, settled.map(|r| r.map(|records| records.len())));
        };

        let clusters = async {
            let settled = self.clusters.run(fetch_clusters(transport)).await.settled();
            self.apply_count(CountSource::Clusters, settled.map(|r| r.map(|clusters| clusters.len())));
        };

        futures_util::join!(metrics, predictions, clusters);

        let summary = self.summary();
        log::info!(
            "dashboard loaded: predictions={:?} clusters={:?} best_model={:?}",
            summary.prediction_count,
            summary.cluster_count,
            summary.best_model.as_ref().map(|b| b.name.as_str())
        );
        summary
    }

    /// Abandons in-flight calls; their late results are discarded.
    pub fn leave(&self) {
        self.metrics.cancel();
        self.predictions.cancel();
        self.clusters.cancel();
    }

    fn apply_count(&self, source: CountSource, settled: Option<ConsoleResult<usize>>) {
        match settled {
            Some(Ok(count)) => self.apply(Contribution::Count(source, count)),
            Some(Err(_)) => self.apply(Contribution::Unavailable(Source::Count(source))),
            None => {}
        }
    }

    fn apply(&self, contribution: Contribution) {
        log::debug!("dashboard contribution: {:?}", contribution);
        self.summary.send_modify(|summary| *summary = reduce(summary, &contribution));
    }
}

pub(crate) async fn fetch_history(transport: &dyn Transport) -> ConsoleResult<Vec<PredictionRecord>> {
    let records: Vec<PredictionRecord> = transport::fetch(transport, &Endpoint::predictions()).await?;
    check_unique_ids(&records)?;
    Ok(records)
}

pub(crate) async fn fetch_clusters(transport: &dyn Transport) -> ConsoleResult<Vec<ClusterResult>> {
    let clusters: Vec<ClusterResult> = transport::fetch(transport, &Endpoint::clustering()).await?;
    validate_clusters(&clusters)?;
    Ok(clusters)
}

pub(crate) async fn fetch_metrics(transport: &dyn Transport) -> ConsoleResult<Vec<ModelMetrics>> {
    Ok(transport::fetch(transport, &Endpoint::model_metrics()).await?)
}
