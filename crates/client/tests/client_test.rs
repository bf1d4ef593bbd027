//! Integration tests for the recommendation client.
//!
//! Every test starts a mock service on a random loopback port and points a
//! real client at it, so the multipart encoding and the JSON decoding go
//! through the actual HTTP stack.

use std::sync::{Arc, Mutex};

use alma_client::{ApiError, RecommendationClient, Scenario};
use alma_models::{
    AnnotatedImage, EarAnalysisRequest, ImageUpload, RecommendationRequest, UseCase,
};
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const EAR_FIXTURE: &str = include_str!("../../models/tests/fixtures/recommendation_with_ear.json");

// ============================================================================
// Mock Service
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

impl CapturedField {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

#[derive(Clone, Default)]
struct MockState {
    captured: Arc<Mutex<Vec<CapturedField>>>,
}

impl MockState {
    fn fields(&self) -> Vec<CapturedField> {
        self.captured.lock().unwrap().clone()
    }

    fn names(&self) -> Vec<String> {
        self.fields().into_iter().map(|f| f.name).collect()
    }

    fn field(&self, name: &str) -> Option<CapturedField> {
        self.fields().into_iter().find(|f| f.name == name)
    }
}

async fn capture(state: &MockState, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        state.captured.lock().unwrap().push(CapturedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
}

fn plain_response() -> serde_json::Value {
    serde_json::json!({
        "recommendations": [
            {
                "rank": 1, "brand": "Sony", "model": "LinkBuds Fit", "price": 2799000,
                "key_features": ["Exceptional fitting"], "why_recommended": "Comfort",
                "pros": ["Light"], "cons": ["Treble leaks"],
                "purchase_links": {"Tokopedia": "https://www.tokopedia.com/sony"},
                "tier_rating": "S"
            },
            {
                "rank": 2, "brand": "Sennheiser", "model": "Momentum TW4", "price": 3999000,
                "key_features": [], "why_recommended": "Sound",
                "pros": [], "cons": [], "purchase_links": {}
            },
            {
                "rank": 3, "brand": "Bose", "model": "QC Earbuds", "price": 2549000,
                "key_features": [], "why_recommended": "ANC",
                "pros": [], "cons": [], "purchase_links": {}, "tier_rating": "Z"
            }
        ],
        "reasoning": "Budget and latency",
        "confidence_score": 0.8125,
        "sources": ["rtings.com"],
        "has_visual_proof": false
    })
}

/// `/recommend` answers with ear analysis only when an image part arrives
async fn recommend(State(state): State<MockState>, multipart: Multipart) -> impl IntoResponse {
    capture(&state, multipart).await;
    let body = if state.field("image").is_some() {
        EAR_FIXTURE.to_string()
    } else {
        plain_response().to_string()
    };
    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn analyze_ear(State(state): State<MockState>, multipart: Multipart) -> impl IntoResponse {
    capture(&state, multipart).await;
    let full: serde_json::Value = serde_json::from_str(EAR_FIXTURE).unwrap();
    Json(full["ear_analysis"].clone())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "TWS recommendation API is running",
        "timestamp": "2026-10-18T09:00:00Z"
    }))
}

async fn debug_test() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok", "test_data": {"anything": [1, 2, 3]}}))
}

fn healthy_router(state: MockState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/recommend", post(recommend))
        .route("/analyze-ear", post(analyze_ear))
        .route("/debug/test-recommendation", get(debug_test))
        .with_state(state)
}

/// Start a mock service on a random port
async fn start_mock_service(router: Router) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock service");
    let addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Mock service failed");
    });

    (format!("http://{}", addr), handle)
}

async fn build_test_client() -> (RecommendationClient, MockState, JoinHandle<()>) {
    let state = MockState::default();
    let (addr, handle) = start_mock_service(healthy_router(state.clone())).await;
    let client = RecommendationClient::new(addr).expect("Failed to build client");
    (client, state, handle)
}

fn ear_photo() -> ImageUpload {
    ImageUpload::new("ear.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}

// ============================================================================
// Request Encoding
// ============================================================================

#[tokio::test]
async fn test_form_contains_exactly_the_set_fields() {
    let (client, state, handle) = build_test_client().await;

    let request = RecommendationRequest::new("recommend earbuds")
        .with_budget_min(1_000_000)
        .with_budget_max(3_000_000)
        .with_use_case(UseCase::Gaming);
    client.get_recommendation(&request).await.unwrap();

    assert_eq!(
        state.names(),
        vec!["query", "budget_min", "budget_max", "use_case"]
    );
    assert_eq!(state.field("query").unwrap().text(), "recommend earbuds");
    assert_eq!(state.field("budget_min").unwrap().text(), "1000000");
    assert_eq!(state.field("budget_max").unwrap().text(), "3000000");
    assert_eq!(state.field("use_case").unwrap().text(), "gaming");

    handle.abort();
}

#[tokio::test]
async fn test_unset_optional_fields_are_absent() {
    let (client, state, handle) = build_test_client().await;

    client
        .get_recommendation(&RecommendationRequest::new("anything under 2M"))
        .await
        .unwrap();

    assert_eq!(state.names(), vec!["query"]);
    handle.abort();
}

#[tokio::test]
async fn test_image_is_sent_as_binary_part() {
    let (client, state, handle) = build_test_client().await;

    let request = RecommendationRequest::new("fit my ear").with_image(ear_photo());
    client.get_recommendation(&request).await.unwrap();

    let image = state.field("image").expect("image part should be sent");
    assert_eq!(image.file_name.as_deref(), Some("ear.jpg"));
    assert_eq!(image.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(image.data, ear_photo().bytes);

    handle.abort();
}

#[tokio::test]
async fn test_scenario_wrapper_forwards_defaults() {
    let (client, state, handle) = build_test_client().await;

    client
        .get_scenario_recommendation(Scenario::Commuting, "train rides", None, None)
        .await
        .unwrap();

    assert_eq!(state.names(), vec!["query", "budget_max", "use_case"]);
    assert_eq!(state.field("budget_max").unwrap().text(), "2000000");
    assert_eq!(state.field("use_case").unwrap().text(), "commuting");

    handle.abort();
}

#[tokio::test]
async fn test_scenario_wrapper_takes_budget_overrides() {
    let (client, state, handle) = build_test_client().await;

    client
        .get_scenario_recommendation(Scenario::Fitness, "sweat proof", None, Some(1_800_000))
        .await
        .unwrap();

    assert_eq!(
        state.names(),
        vec!["query", "budget_min", "budget_max", "use_case"]
    );
    assert_eq!(state.field("budget_min").unwrap().text(), "800000");
    assert_eq!(state.field("budget_max").unwrap().text(), "1800000");
    assert_eq!(state.field("use_case").unwrap().text(), "fitness-sports");

    handle.abort();
}

// ============================================================================
// Response Decoding
// ============================================================================

#[tokio::test]
async fn test_response_preserves_order_and_confidence() {
    let (client, _state, handle) = build_test_client().await;

    let response = client
        .get_basic_recommendation("earbuds", Some(4_000_000), None)
        .await
        .unwrap();

    let models: Vec<&str> = response
        .recommendations
        .iter()
        .map(|r| r.model.as_str())
        .collect();
    assert_eq!(models, vec!["LinkBuds Fit", "Momentum TW4", "QC Earbuds"]);
    assert_eq!(response.confidence_score, 0.8125);
    assert_eq!(response.recommendations[2].tier_rating.label(), "A");

    handle.abort();
}

#[tokio::test]
async fn test_no_image_means_no_visual_proof() {
    let (client, _state, handle) = build_test_client().await;

    let request = RecommendationRequest::new("recommend earbuds")
        .with_budget_min(1_000_000)
        .with_budget_max(3_000_000)
        .with_use_case(UseCase::Gaming);
    let response = client.get_recommendation(&request).await.unwrap();

    assert!(response.ear_analysis.is_none());
    assert!(!response.has_visual_proof);
    assert!(response.visual_analysis().is_none());

    handle.abort();
}

#[tokio::test]
async fn test_image_brings_visual_proof() {
    let (client, _state, handle) = build_test_client().await;

    let response = client
        .get_recommendation_with_image("fit my ear", ear_photo(), Some(3_000_000), None)
        .await
        .unwrap();

    assert!(response.has_visual_proof);
    let analysis = response.visual_analysis().expect("analysis should be present");
    assert!(analysis.annotated_image.is_available());
    assert_eq!(analysis.annotated_image.decode().unwrap(), b"hello".to_vec());

    handle.abort();
}

#[tokio::test]
async fn test_analyze_ear_sends_only_the_image() {
    let (client, state, handle) = build_test_client().await;

    let analysis = client
        .analyze_ear(&EarAnalysisRequest::new(ear_photo()))
        .await
        .unwrap();

    assert_eq!(state.names(), vec!["image"]);
    assert_eq!(analysis.measurements.size_category, "medium");
    assert_ne!(analysis.annotated_image, AnnotatedImage::Unavailable);

    handle.abort();
}

#[tokio::test]
async fn test_health_and_debug_endpoints() {
    let (client, _state, handle) = build_test_client().await;

    let health = client.health_check().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.timestamp, "2026-10-18T09:00:00Z");

    let debug = client.debug_test_recommendation().await.unwrap();
    assert_eq!(debug["test_data"]["anything"][2], 3);

    handle.abort();
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_server_error_exposes_status_and_body() {
    let router = Router::new().route(
        "/recommend",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "internal error") }),
    );
    let (addr, handle) = start_mock_service(router).await;
    let client = RecommendationClient::new(addr).unwrap();

    let err = client
        .get_recommendation(&RecommendationRequest::new("earbuds"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.body(), Some("internal error"));
    match &err {
        ApiError::Http { message, .. } => {
            assert_eq!(message, "Recommendation request failed: Internal Server Error")
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }

    handle.abort();
}

#[tokio::test]
async fn test_health_failure_is_an_api_error() {
    let router = Router::new().route(
        "/health",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let (addr, handle) = start_mock_service(router).await;
    let client = RecommendationClient::new(addr).unwrap();

    let err = client.health_check().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.body(), None);

    handle.abort();
}

#[tokio::test]
async fn test_truncated_body_is_a_decode_error() {
    let router = Router::new().route(
        "/recommend",
        post(|| async {
            (
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"recommendations": [{"rank": 1, "brand": "So"#,
            )
        }),
    );
    let (addr, handle) = start_mock_service(router).await;
    let client = RecommendationClient::new(addr).unwrap();

    let err = client
        .get_recommendation(&RecommendationRequest::new("earbuds"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);

    handle.abort();
}

#[tokio::test]
async fn test_missing_field_is_a_decode_error() {
    let router = Router::new().route(
        "/recommend",
        post(|| async {
            let mut body = plain_response();
            body.as_object_mut().unwrap().remove("sources");
            Json(body)
        }),
    );
    let (addr, handle) = start_mock_service(router).await;
    let client = RecommendationClient::new(addr).unwrap();

    let err = client
        .get_recommendation(&RecommendationRequest::new("earbuds"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);

    handle.abort();
}

#[tokio::test]
async fn test_out_of_range_confidence_is_a_contract_error() {
    let router = Router::new().route(
        "/recommend",
        post(|| async {
            let mut body = plain_response();
            body["confidence_score"] = serde_json::json!(1.5);
            Json(body)
        }),
    );
    let (addr, handle) = start_mock_service(router).await;
    let client = RecommendationClient::new(addr).unwrap();

    let err = client
        .get_recommendation(&RecommendationRequest::new("earbuds"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Contract(_)), "got {:?}", err);

    handle.abort();
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_error() {
    // Grab a free port, then close it so the connect is refused.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RecommendationClient::new(format!("http://{}", addr)).unwrap();
    let err = client.health_check().await.unwrap_err();

    assert!(err.is_transport(), "got {:?}", err);
    assert_eq!(err.status(), None);
}
