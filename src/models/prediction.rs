use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::{ApartmentFeatures, ModelChoice};

/// Ordinal apartment class returned by the classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Budget,
    Standard,
    Premium,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Budget, Self::Standard, Self::Premium];

    pub fn index(&self) -> u8 {
        match self {
            Self::Budget => 0,
            Self::Standard => 1,
            Self::Premium => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Budget => "Budget",
            Self::Standard => "Standard",
            Self::Premium => "Premium",
        }
    }
}

impl TryFrom<i64> for Category {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Budget),
            1 => Ok(Self::Standard),
            2 => Ok(Self::Premium),
            other => Err(DomainError::UnknownCategory(other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `POST /predict/` response exactly as the service sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: i64,
    pub probability: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityEntry {
    pub category: Category,
    pub value: f64,
}

impl ProbabilityEntry {
    /// Percentage with one decimal, as shown on the distribution bars.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.value * 100.0)
    }
}

/// A prediction whose distribution has been checked and put in category order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPrediction {
    pub category: Category,
    pub distribution: Vec<ProbabilityEntry>,
}

impl NormalizedPrediction {
    pub fn probability_of(&self, category: Category) -> Option<f64> {
        self.distribution
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.value)
    }
}

/// Everything the prediction view needs once a submission succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub model: ModelChoice,
    pub features: ApartmentFeatures,
    pub prediction: NormalizedPrediction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_lookup_is_total_over_known_values() {
        assert_eq!(Category::try_from(0), Ok(Category::Budget));
        assert_eq!(Category::try_from(1), Ok(Category::Standard));
        assert_eq!(Category::try_from(2), Ok(Category::Premium));
        assert_eq!(Category::try_from(5), Err(DomainError::UnknownCategory(5)));
        assert_eq!(Category::try_from(-1), Err(DomainError::UnknownCategory(-1)));
    }

    #[test]
    fn percent_label_uses_one_decimal() {
        let entry = ProbabilityEntry {
            category: Category::Standard,
            value: 0.75,
        };
        assert_eq!(entry.percent_label(), "75.0%");
    }
}
