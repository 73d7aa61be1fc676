use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    pub name: String,
    pub accuracy: f64,
}

impl BestModel {
    /// Accuracy rounded to a whole percentage, as shown on the stat card.
    pub fn accuracy_percent(&self) -> u32 {
        (self.accuracy * 100.0).round() as u32
    }
}

/// Home page stats. A field is `None` while its source call is outstanding or
/// after it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardSummary {
    pub prediction_count: Option<usize>,
    pub cluster_count: Option<usize>,
    pub best_model: Option<BestModel>,
}
