use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One k-means cluster from `/clustering/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    pub cluster_id: i64,
    pub centroid: BTreeMap<String, f64>,
    #[serde(default)]
    pub data_points: Vec<BTreeMap<String, f64>>,
}

impl ClusterResult {
    pub fn feature_names(&self) -> BTreeSet<&str> {
        self.centroid.keys().map(String::as_str).collect()
    }
}

/// Checks cluster ids are unique and every centroid and data point uses the
/// feature set declared by the first cluster.
pub fn validate_clusters(clusters: &[ClusterResult]) -> Result<(), DomainError> {
    let Some(first) = clusters.first() else {
        return Ok(());
    };
    let declared = first.feature_names();
    let mut seen = HashSet::new();

    for cluster in clusters {
        let invalid = |reason: String| DomainError::InvalidCluster {
            cluster_id: cluster.cluster_id,
            reason,
        };
        if !seen.insert(cluster.cluster_id) {
            return Err(invalid("duplicate cluster id".to_string()));
        }
        if cluster.feature_names() != declared {
            return Err(invalid("centroid features differ from the declared set".to_string()));
        }
        if let Some((_, value)) = cluster.centroid.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("non-finite centroid coordinate {}", value)));
        }
        for (i, point) in cluster.data_points.iter().enumerate() {
            if point.keys().map(String::as_str).collect::<BTreeSet<_>>() != declared {
                return Err(invalid(format!("data point {} has a different feature set", i)));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterOverview {
    pub cluster_id: i64,
    pub point_count: usize,
    /// Centroid coordinates sorted by feature name, two decimals.
    pub centroid: Vec<(String, String)>,
}

impl From<&ClusterResult> for ClusterOverview {
    fn from(cluster: &ClusterResult) -> Self {
        Self {
            cluster_id: cluster.cluster_id,
            point_count: cluster.data_points.len(),
            centroid: cluster
                .centroid
                .iter()
                .map(|(feature, value)| (feature.clone(), format!("{:.2}", value)))
                .collect(),
        }
    }
}
