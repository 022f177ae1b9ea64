use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use claimbuddy_service::{ServiceConfig, SimulationConfig, create_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let config = ServiceConfig {
        simulation: SimulationConfig::instant(),
        ..ServiceConfig::default()
    };
    create_app(&config).unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn new_claim(app: &Router) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/claims")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

async fn event(app: &Router, id: &str, body: Value) -> (StatusCode, Value) {
    call(app, post_json(&format!("/claims/{}/events", id), body)).await
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn responses_carry_a_correlation_id() {
    let app = app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-correlation-id"));
}

#[tokio::test]
async fn new_claim_starts_on_welcome() {
    let app = app();
    let id = new_claim(&app).await;

    let request = Request::builder()
        .uri(format!("/claims/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_step"], 0);
    assert_eq!(body["step_id"], "welcome");
    assert_eq!(body["steps"].as_array().unwrap().len(), 6);
    assert_eq!(body["steps"][5]["label"], "Documents & Submission");
    assert_eq!(body["payload"], Value::Null);
}

#[tokio::test]
async fn unknown_claim_is_404() {
    let app = app();
    let request = Request::builder()
        .uri("/claims/does-not-exist")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["session_id"], "does-not-exist");

    let (status, _) = event(&app, "does-not-exist", json!({"event": "next"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gate_blocks_next_until_upload() {
    let app = app();
    let id = new_claim(&app).await;
    event(&app, &id, json!({"event": "get_started"})).await;

    let (status, body) = event(&app, &id, json!({"event": "next"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["step_id"], "upload");

    let (_, body) = event(
        &app,
        &id,
        json!({
            "event": "action",
            "input": {
                "action": "upload",
                "file": {"name": "bill.png", "mime_type": "image/png", "size_bytes": 2097152}
            }
        }),
    )
    .await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["notifications"][0]["title"], "Upload successful");

    let (_, body) = event(&app, &id, json!({"event": "next"})).await;
    assert_eq!(body["step_id"], "personal_info");
    assert_eq!(body["transition"]["from"], 1);
    assert_eq!(body["transition"]["to"], 2);
}

#[tokio::test]
async fn oversized_upload_is_reported_not_rejected() {
    let app = app();
    let id = new_claim(&app).await;
    event(&app, &id, json!({"event": "get_started"})).await;

    let (status, body) = event(
        &app,
        &id,
        json!({
            "event": "action",
            "input": {
                "action": "upload",
                "file": {"name": "bill.pdf", "mime_type": "application/pdf", "size_bytes": 6291456}
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], false);
    assert_eq!(body["notifications"][0]["title"], "File too large");
    assert_eq!(body["notifications"][0]["severity"], "destructive");
}

#[tokio::test]
async fn malformed_action_is_400() {
    let app = app();
    let id = new_claim(&app).await;
    event(&app, &id, json!({"event": "get_started"})).await;

    let (status, body) = event(
        &app,
        &id,
        json!({"event": "action", "input": {"action": "teleport"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
}

#[tokio::test]
async fn help_notifies_without_moving() {
    let app = app();
    let id = new_claim(&app).await;
    event(&app, &id, json!({"event": "get_started"})).await;

    let (status, body) = event(&app, &id, json!({"event": "help"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "help");
    assert_eq!(body["current_step"], 1);
    assert_eq!(body["notifications"][0]["title"], "Help & Support");
    assert!(
        body["notifications"][0]["description"]
            .as_str()
            .unwrap()
            .contains("1800-XXX-XXXX")
    );
}
