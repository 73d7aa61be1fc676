mod support;

use apartment_console::models::{ApartmentFeatures, ApartmentForm, Category, ModelChoice};
use apartment_console::services::lifecycle::{RequestState, RunOutcome};
use apartment_console::services::prediction_workflow::PredictionWorkflow;
use apartment_console::services::transport::Method;
use apartment_console::{ConsoleError, DomainError, TransportError, TransportErrorKind, ValidationError};
use serde_json::json;
use support::MockTransport;

const KNN: &str = "/predict/?model_name=knn";
const FOREST: &str = "/predict/?model_name=random_forest";

fn standard_body() -> serde_json::Value {
    json!({"prediction": 1, "probability": {"0": 0.1, "1": 0.75, "2": 0.15}})
}

#[tokio::test]
async fn knn_submission_is_interpreted_in_category_order() {
    let mock = MockTransport::new();
    mock.ok(KNN, standard_body());
    let workflow = PredictionWorkflow::new(mock.clone());

    let outcome = workflow
        .submit(ApartmentFeatures::default(), ModelChoice::Knn)
        .await
        .settled()
        .unwrap()
        .unwrap();

    assert_eq!(outcome.prediction.category, Category::Standard);
    assert_eq!(outcome.prediction.category.label(), "Standard");
    let bars: Vec<_> = outcome
        .prediction
        .distribution
        .iter()
        .map(|e| e.percent_label())
        .collect();
    assert_eq!(bars, ["10.0%", "75.0%", "15.0%"]);
    assert!(matches!(workflow.state(), RequestState::Succeeded(_)));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::Post);
    let body = calls[0].body.clone().unwrap();
    assert_eq!(body["parking"], json!(1));
    assert_eq!(body["location_score"], json!(7));
    assert_eq!(body["price"], json!(1000.0));
}

#[tokio::test]
async fn unknown_category_fails_the_submission() {
    let mock = MockTransport::new();
    mock.ok(
        FOREST,
        json!({"prediction": 5, "probability": {"0": 0.2, "1": 0.3, "2": 0.5}}),
    );
    let workflow = PredictionWorkflow::new(mock);

    workflow
        .submit(ApartmentFeatures::default(), ModelChoice::RandomForest)
        .await;

    assert_eq!(
        workflow.state(),
        RequestState::Failed(ConsoleError::Domain(DomainError::UnknownCategory(5)))
    );
}

#[tokio::test]
async fn inconsistent_distribution_is_not_shown() {
    let mock = MockTransport::new();
    mock.ok(
        FOREST,
        json!({"prediction": 0, "probability": {"0": 0.4, "1": 0.4, "2": 0.4}}),
    );
    let workflow = PredictionWorkflow::new(mock);

    let outcome = workflow
        .submit(ApartmentFeatures::default(), ModelChoice::RandomForest)
        .await;
    assert!(matches!(
        outcome,
        RunOutcome::Settled(Err(ConsoleError::Domain(DomainError::InconsistentDistribution(_))))
    ));
    assert!(workflow.state().payload().is_none());
}

#[tokio::test]
async fn second_submit_while_pending_never_reaches_the_network() {
    let mock = MockTransport::new();
    let gate = mock.gated(KNN, Ok(standard_body()));
    let workflow = PredictionWorkflow::new(mock.clone());

    let (first, second, ()) = tokio::join!(
        workflow.submit(ApartmentFeatures::default(), ModelChoice::Knn),
        workflow.submit(ApartmentFeatures::default(), ModelChoice::Knn),
        async { gate.notify_one() },
    );

    assert!(matches!(first, RunOutcome::Settled(Ok(_))));
    assert!(matches!(second, RunOutcome::AlreadyPending));
    assert_eq!(mock.call_count(KNN), 1);
    assert_eq!(mock.max_in_flight(), 1);
}

#[tokio::test]
async fn invalid_form_fails_before_any_call() {
    let mock = MockTransport::new();
    mock.ok(KNN, standard_body());
    let workflow = PredictionWorkflow::new(mock.clone());

    let form = ApartmentForm::new().with("location_score", "11");
    let outcome = workflow.submit_form(&form, ModelChoice::Knn).await;
    assert!(matches!(
        outcome,
        RunOutcome::Settled(Err(ConsoleError::Validation(ValidationError::OutOfRange(ref f)))) if f == "location_score"
    ));

    let form = ApartmentForm::new().with("price", "cheap");
    workflow.submit_form(&form, ModelChoice::Knn).await;
    assert_eq!(
        workflow.state(),
        RequestState::Failed(ConsoleError::Validation(ValidationError::NotANumber("price".into())))
    );

    let form = ApartmentForm::new().with("rooms", "2.5");
    workflow.submit_form(&form, ModelChoice::Knn).await;
    assert_eq!(
        workflow.state().error(),
        Some(&ConsoleError::Validation(ValidationError::OutOfRange("rooms".into())))
    );

    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn resubmitting_after_a_failure_retries() {
    let mock = MockTransport::new();
    mock.respond(KNN, Err(TransportError::status(503, "Service Unavailable")));
    let workflow = PredictionWorkflow::new(mock.clone());
    let features = ApartmentFeatures::default();

    workflow.submit(features.clone(), ModelChoice::Knn).await;
    let kind = workflow
        .state()
        .error()
        .and_then(|e| e.as_transport())
        .map(|e| e.kind);
    assert_eq!(kind, Some(TransportErrorKind::NonSuccessStatus(503)));

    mock.ok(KNN, standard_body());
    workflow.submit(features, ModelChoice::Knn).await;
    assert!(matches!(workflow.state(), RequestState::Succeeded(_)));
    assert_eq!(mock.call_count(KNN), 2);
}

#[tokio::test]
async fn leaving_drops_the_in_flight_submission() {
    let mock = MockTransport::new();
    let gate = mock.gated(KNN, Ok(standard_body()));
    let workflow = PredictionWorkflow::new(mock.clone());

    let (outcome, ()) = tokio::join!(
        workflow.submit(ApartmentFeatures::default(), ModelChoice::Knn),
        async {
            assert!(workflow.state().is_pending());
            workflow.leave();
            gate.notify_one();
        },
    );

    assert!(matches!(outcome, RunOutcome::Superseded));
    assert!(workflow.state().is_idle());
}

#[tokio::test]
async fn malformed_response_is_a_transport_failure() {
    let mock = MockTransport::new();
    mock.ok(KNN, json!({"label": "Standard"}));
    let workflow = PredictionWorkflow::new(mock);

    workflow.submit(ApartmentFeatures::default(), ModelChoice::Knn).await;
    let kind = workflow.state().error().and_then(|e| e.as_transport()).map(|e| e.kind);
    assert_eq!(kind, Some(TransportErrorKind::MalformedBody));
}

#[tokio::test]
async fn caller_timeout_does_not_block_the_next_submission() {
    let mock = MockTransport::new();
    let _held = mock.gated(KNN, Ok(standard_body()));
    mock.ok(FOREST, standard_body());
    let workflow = PredictionWorkflow::new(mock.clone());

    let timed_out = tokio::time::timeout(
        std::time::Duration::from_millis(20),
        workflow.submit(ApartmentFeatures::default(), ModelChoice::Knn),
    )
    .await;
    assert!(timed_out.is_err());
    assert!(workflow.state().is_idle());

    let outcome = workflow
        .submit(ApartmentFeatures::default(), ModelChoice::RandomForest)
        .await;
    assert!(matches!(outcome, RunOutcome::Settled(Ok(_))));
    assert_eq!(mock.call_count(KNN), 1);
    assert_eq!(mock.call_count(FOREST), 1);
}
