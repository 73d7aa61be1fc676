use serde::Serialize;

use crate::commands::{into_command_result, AppContext};
use crate::models::{ApartmentForm, ModelChoice, PredictionOutcome};
use crate::services::prediction_workflow::PredictionWorkflow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityBar {
    pub category: String,
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionView {
    pub model: String,
    pub category: String,
    pub bars: Vec<ProbabilityBar>,
}

impl From<&PredictionOutcome> for PredictionView {
    fn from(outcome: &PredictionOutcome) -> Self {
        Self {
            model: outcome.model.display_name().to_string(),
            category: outcome.prediction.category.label().to_string(),
            bars: outcome
                .prediction
                .distribution
                .iter()
                .map(|entry| ProbabilityBar {
                    category: entry.category.label().to_string(),
                    percent: entry.percent_label(),
                })
                .collect(),
        }
    }
}

pub async fn predict_price_category(
    ctx: &AppContext,
    model: &str,
    form: &ApartmentForm,
) -> Result<PredictionView, String> {
    let model = model.parse::<ModelChoice>().map_err(|e| e.to_string())?;
    let workflow = PredictionWorkflow::new(ctx.transport.clone());
    let outcome = into_command_result(workflow.submit_form(form, model).await)?;
    Ok(PredictionView::from(&outcome))
}
