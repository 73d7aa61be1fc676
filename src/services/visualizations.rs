use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::future::join_all;

use crate::models::{Visualization, VisualizationKind, VisualizationPayload};
use crate::services::transport::{self, Endpoint, Transport};

/// Fetches and decodes one plot. Plots are decoration: every failure is
/// logged and reported as `None`.
pub async fn fetch_visualization(
    transport: &dyn Transport,
    kind: VisualizationKind,
) -> Option<Visualization> {
    let endpoint = Endpoint::visualization(kind);
    let payload: VisualizationPayload = match transport::fetch(transport, &endpoint).await {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("visualization {} unavailable: {}", kind, e);
            return None;
        }
    };

    match STANDARD.decode(payload.data.image.trim()) {
        Ok(png) if !png.is_empty() => Some(Visualization { kind, png }),
        Ok(_) => {
            log::warn!("visualization {} is empty", kind);
            None
        }
        Err(e) => {
            log::warn!("visualization {} is not valid base64: {}", kind, e);
            None
        }
    }
}

/// Fetches several plots concurrently, keeping the requested order.
pub async fn fetch_visualizations(
    transport: &dyn Transport,
    kinds: &[VisualizationKind],
) -> Vec<(VisualizationKind, Option<Visualization>)> {
    let fetched = join_all(kinds.iter().map(|&kind| fetch_visualization(transport, kind))).await;
    kinds.iter().copied().zip(fetched).collect()
}
