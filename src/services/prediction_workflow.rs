use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{ConsoleResult, DomainError};
use crate::models::{
    ApartmentFeatures, ApartmentForm, Category, ModelChoice, NormalizedPrediction, PredictionOutcome,
    PredictionResult, ProbabilityEntry,
};
use crate::services::lifecycle::{RequestLifecycle, RequestState, RunOutcome, StartPolicy};
use crate::services::transport::{self, Endpoint, Transport};

/// Allowed distance between the probability sum and 1.0.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-3;

/// Validates a raw response and puts its distribution in category order.
pub fn normalize(result: &PredictionResult) -> Result<NormalizedPrediction, DomainError> {
    let category = Category::try_from(result.prediction)?;

    let mut distribution = Vec::with_capacity(result.probability.len());
    for (key, &value) in &result.probability {
        let index: i64 = key.trim().parse().map_err(|_| {
            DomainError::InconsistentDistribution(format!("category key `{}` is not an integer", key))
        })?;
        let entry_category = Category::try_from(index)?;
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(DomainError::InconsistentDistribution(format!(
                "probability {} for {} is outside [0, 1]",
                value, entry_category
            )));
        }
        distribution.push(ProbabilityEntry {
            category: entry_category,
            value,
        });
    }
    distribution.sort_by_key(|e| e.category);

    if distribution.windows(2).any(|w| w[0].category == w[1].category) {
        return Err(DomainError::InconsistentDistribution(
            "category listed more than once".to_string(),
        ));
    }

    let sum: f64 = distribution.iter().map(|e| e.value).sum();
    if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
        return Err(DomainError::InconsistentDistribution(format!(
            "probabilities sum to {:.4}",
            sum
        )));
    }

    let max = distribution.iter().map(|e| e.value).fold(f64::MIN, f64::max);
    let predicted = distribution
        .iter()
        .find(|e| e.category == category)
        .map(|e| e.value);
    match predicted {
        Some(p) if p >= max => {}
        _ => {
            return Err(DomainError::InconsistentDistribution(format!(
                "predicted {} is not the most probable category",
                category
            )))
        }
    }

    Ok(NormalizedPrediction {
        category,
        distribution,
    })
}

pub struct PredictionWorkflow {
    transport: Arc<dyn Transport>,
    lifecycle: RequestLifecycle<PredictionOutcome>,
}

impl PredictionWorkflow {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            lifecycle: RequestLifecycle::new("predict", StartPolicy::IgnoreWhilePending),
        }
    }

    pub fn state(&self) -> RequestState<PredictionOutcome> {
        self.lifecycle.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<PredictionOutcome>> {
        self.lifecycle.subscribe()
    }

    /// Submits validated features. Validation, transport and domain failures
    /// all end in `Failed`; re-submitting is the retry.
    pub async fn submit(
        &self,
        features: ApartmentFeatures,
        model: ModelChoice,
    ) -> RunOutcome<PredictionOutcome> {
        let transport = Arc::clone(&self.transport);
        self.lifecycle
            .run(async move { predict(transport.as_ref(), features, model).await })
            .await
    }

    /// Parses raw form input and submits it.
    pub async fn submit_form(
        &self,
        form: &ApartmentForm,
        model: ModelChoice,
    ) -> RunOutcome<PredictionOutcome> {
        let transport = Arc::clone(&self.transport);
        let parsed = ApartmentFeatures::from_form(form);
        self.lifecycle
            .run(async move {
                let features = parsed?;
                predict(transport.as_ref(), features, model).await
            })
            .await
    }

    /// Drops any in-flight submission, e.g. when the user leaves the view.
    pub fn leave(&self) {
        self.lifecycle.cancel();
    }
}

async fn predict(
    transport: &dyn Transport,
    features: ApartmentFeatures,
    model: ModelChoice,
) -> ConsoleResult<PredictionOutcome> {
    features.validate()?;
    let endpoint = Endpoint::predict(model);
    let raw: PredictionResult = transport::submit(transport, &endpoint, &features).await?;
    let prediction = normalize(&raw)?;
    log::info!(
        "{} classified apartment as {}",
        model.display_name(),
        prediction.category
    );
    Ok(PredictionOutcome {
        model,
        features,
        prediction,
    })
}
