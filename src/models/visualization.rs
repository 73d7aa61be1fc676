use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationKind {
    Clustering,
    ModelComparison,
    FeatureImportance,
}

impl VisualizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clustering => "clustering",
            Self::ModelComparison => "model_comparison",
            Self::FeatureImportance => "feature_importance",
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /visualizations/{name}` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationPayload {
    pub data: VisualizationData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationData {
    pub image: String,
}

/// A decoded server-rendered plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub kind: VisualizationKind,
    pub png: Vec<u8>,
}

/// What a view reports about a plot without dumping its bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationStatus {
    pub kind: VisualizationKind,
    pub available: bool,
    pub bytes: usize,
}

impl VisualizationStatus {
    pub fn of(kind: VisualizationKind, visualization: Option<&Visualization>) -> Self {
        Self {
            kind,
            available: visualization.is_some(),
            bytes: visualization.map(|v| v.png.len()).unwrap_or(0),
        }
    }
}
