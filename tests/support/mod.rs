#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use apartment_console::services::transport::{Endpoint, Method, Transport};
use apartment_console::TransportError;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified, serialised
/// against other tests touching the environment.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub key: String,
    pub body: Option<Value>,
}

struct Route {
    response: Result<Value, TransportError>,
    gate: Option<Arc<Notify>>,
}

/// Scripted backend: canned responses keyed by `Endpoint::key()`, optional
/// gates that hold a response until the test releases it, and counters for
/// calls and concurrency.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, key: &str, response: Result<Value, TransportError>) {
        self.routes
            .lock()
            .unwrap()
            .insert(key.to_string(), Route { response, gate: None });
    }

    pub fn ok(&self, key: &str, body: Value) {
        self.respond(key, Ok(body));
    }

    /// Like [`ok`](Self::ok), but the response waits for the returned gate.
    pub fn gated(&self, key: &str, response: Result<Value, TransportError>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.routes.lock().unwrap().insert(
            key.to_string(),
            Route {
                response,
                gate: Some(gate.clone()),
            },
        );
        gate
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.key == key).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        endpoint: &Endpoint,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let key = endpoint.key();
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            key: key.clone(),
            body: body.cloned(),
        });

        let (response, gate) = match self.routes.lock().unwrap().get(&key) {
            Some(route) => (route.response.clone(), route.gate.clone()),
            None => (Err(TransportError::status(404, format!("no route for {}", key))), None),
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

// ─── Fixtures ───

pub fn metrics_body() -> Value {
    json!([
        {"algorithm": "random_forest", "accuracy": 0.91, "precision": 0.9, "recall": 0.87, "f1_score": 0.88},
        {"algorithm": "knn", "accuracy": 0.84, "precision": 0.82, "recall": 0.8, "f1_score": 0.81},
        {"algorithm": "naive_bayes", "accuracy": 0.79, "precision": 0.78, "recall": 0.76, "f1_score": 0.77}
    ])
}

pub fn prediction_record(id: i64, model: &str, result: i64) -> Value {
    json!({
        "id": id,
        "price": 1200.0,
        "size": 75.0,
        "rooms": 3,
        "bathroom": 1,
        "parking": 1,
        "furnished": 0,
        "elevator": 1,
        "balcony": 0,
        "floor": 4,
        "age": 12.0,
        "location_score": 8,
        "prediction_result": result,
        "model_used": model,
        "timestamp": "2024-03-09T15:04:05.123456"
    })
}

pub fn predictions_body(count: usize) -> Value {
    Value::Array(
        (1..=count as i64)
            .map(|id| prediction_record(id, "random_forest", id % 3))
            .collect(),
    )
}

pub fn cluster(id: i64, points: usize) -> Value {
    let point = json!({"feature_0": 1.0, "feature_1": 2.5});
    json!({
        "cluster_id": id,
        "centroid": {"feature_1": 2.25, "feature_0": 0.5},
        "data_points": vec![point; points]
    })
}

pub fn clusters_body(count: usize) -> Value {
    Value::Array((0..count as i64).map(|id| cluster(id, 2)).collect())
}

/// Base64 of a tiny but non-empty "PNG".
pub fn image_body() -> Value {
    json!({"data": {"image": "iVBORw0KGgo="}})
}
