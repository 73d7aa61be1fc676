use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;
use crate::models::{BackendSettings, ModelChoice, VisualizationKind};

// ─── Endpoints ───

/// Which deployment an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Prediction,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub backend: Backend,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(backend: Backend, path: impl Into<String>) -> Self {
        Self {
            backend,
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn model_metrics() -> Self {
        Self::new(Backend::Data, "/model-metrics/")
    }

    pub fn predictions() -> Self {
        Self::new(Backend::Data, "/predictions/")
    }

    pub fn clustering() -> Self {
        Self::new(Backend::Data, "/clustering/")
    }

    pub fn visualization(kind: VisualizationKind) -> Self {
        Self::new(Backend::Data, format!("/visualizations/{}", kind.as_str()))
    }

    pub fn predict(model: ModelChoice) -> Self {
        Self::new(Backend::Prediction, "/predict/").with_query("model_name", model.as_str())
    }

    /// Path plus query string, e.g. `/predict/?model_name=knn`.
    pub fn key(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

// ─── Transport ───

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one exchange. Never retries.
    async fn request(
        &self,
        endpoint: &Endpoint,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

/// Decodes a payload into a typed entity; a shape mismatch is a malformed body.
pub fn decode<T: DeserializeOwned>(endpoint: &Endpoint, value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value)
        .map_err(|e| TransportError::malformed(format!("{}: unexpected payload shape: {}", endpoint, e)))
}

pub async fn fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    endpoint: &Endpoint,
) -> Result<T, TransportError> {
    let value = transport.request(endpoint, Method::Get, None).await?;
    decode(endpoint, value)
}

pub async fn submit<B: Serialize, T: DeserializeOwned>(
    transport: &dyn Transport,
    endpoint: &Endpoint,
    body: &B,
) -> Result<T, TransportError> {
    let body = serde_json::to_value(body)
        .map_err(|e| TransportError::malformed(format!("{}: cannot encode request body: {}", endpoint, e)))?;
    let value = transport.request(endpoint, Method::Post, Some(&body)).await?;
    decode(endpoint, value)
}

// ─── HTTP implementation ───

pub struct HttpTransport {
    client: reqwest::Client,
    prediction_url: String,
    data_url: String,
}

impl HttpTransport {
    pub fn new(backend: &BackendSettings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            prediction_url: backend.prediction_url.trim_end_matches('/').to_string(),
            data_url: backend.data_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        let base = match endpoint.backend {
            Backend::Prediction => &self.prediction_url,
            Backend::Data => &self.data_url,
        };
        format!("{}{}", base, endpoint.path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        endpoint: &Endpoint,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = self.url_for(endpoint);
        log::debug!("{} {}", method, endpoint);

        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if !endpoint.query.is_empty() {
            request = request.query(&endpoint.query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| classify(&url, e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| classify(&url, e))?;

        if !status.is_success() {
            log::warn!("{} {} returned {}", method, endpoint, status);
            return Err(TransportError::status(
                status.as_u16(),
                format!("{} {}: {}", method, url, text),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| TransportError::malformed(format!("{} {}: invalid JSON: {}", method, url, e)))
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::timeout(format!("{}: {}", url, err))
    } else if err.is_decode() || err.is_body() {
        TransportError::malformed(format!("{}: {}", url, err))
    } else {
        TransportError::network(format!("{}: {}", url, err))
    }
}

// ─── Timeout wrapper ───

/// Bounds every exchange of the wrapped transport.
pub struct TimeoutTransport {
    inner: Arc<dyn Transport>,
    limit: Duration,
}

impl TimeoutTransport {
    pub fn new(inner: Arc<dyn Transport>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl Transport for TimeoutTransport {
    async fn request(
        &self,
        endpoint: &Endpoint,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        match tokio::time::timeout(self.limit, self.inner.request(endpoint, method, body)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("{} {} timed out after {:?}", method, endpoint, self.limit);
                Err(TransportError::timeout(format!(
                    "{} {} exceeded {:?}",
                    method, endpoint, self.limit
                )))
            }
        }
    }
}

/// Builds the transport described by the backend settings.
pub fn build_transport(backend: &BackendSettings) -> Result<Arc<dyn Transport>, TransportError> {
    let http: Arc<dyn Transport> = Arc::new(HttpTransport::new(backend)?);
    Ok(match backend.request_timeout_secs {
        Some(secs) if secs > 0 => Arc::new(TimeoutTransport::new(http, Duration::from_secs(secs))),
        _ => http,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_resolve_against_their_backend() {
        let transport = HttpTransport::new(&BackendSettings {
            prediction_url: "http://ml.local:8000/".into(),
            data_url: "http://data.local:8080".into(),
            request_timeout_secs: None,
        })
        .unwrap();

        assert_eq!(
            transport.url_for(&Endpoint::predict(ModelChoice::Knn)),
            "http://ml.local:8000/predict/"
        );
        assert_eq!(
            transport.url_for(&Endpoint::model_metrics()),
            "http://data.local:8080/model-metrics/"
        );
        assert_eq!(
            transport.url_for(&Endpoint::visualization(VisualizationKind::FeatureImportance)),
            "http://data.local:8080/visualizations/feature_importance"
        );
    }

    #[test]
    fn endpoint_key_includes_query() {
        assert_eq!(
            Endpoint::predict(ModelChoice::NaiveBayes).key(),
            "/predict/?model_name=naive_bayes"
        );
        assert_eq!(Endpoint::clustering().key(), "/clustering/");
    }

    #[test]
    fn decode_reports_shape_mismatch_as_malformed() {
        let err = decode::<Vec<u32>>(&Endpoint::predictions(), serde_json::json!({"nope": 1})).unwrap_err();
        assert_eq!(err.kind, crate::error::TransportErrorKind::MalformedBody);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let transport = HttpTransport::new(&BackendSettings {
            prediction_url: "http://127.0.0.1:9".into(),
            data_url: "http://127.0.0.1:9".into(),
            request_timeout_secs: None,
        })
        .unwrap();
        let err = transport
            .request(&Endpoint::model_metrics(), Method::Get, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::TransportErrorKind::NetworkUnreachable);
    }
}
