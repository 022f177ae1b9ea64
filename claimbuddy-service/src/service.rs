use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;
use wizard_flow::{
    Event, ExecutionStatus, FlowError, FlowRunner, Notification, Notifier, RecordingNotifier,
    Session, StepDescriptor, Transition,
};

use crate::config::ServiceConfig;
use crate::services::Collaborators;
use crate::workflow::{create_flow_runner, help_notification};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

const CORRELATION_HEADER: &str = "x-correlation-id";

fn bad_request_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn flow_error(session_id: &str, e: FlowError) -> ApiError {
    match e {
        FlowError::SessionNotFound(_) => not_found_error("Session not found", session_id),
        FlowError::InvalidInput { .. } => {
            warn!(session_id = %session_id, error = %e, "rejected event input");
            bad_request_error("Invalid input", &e.to_string())
        }
        other => {
            error!(session_id = %session_id, error = %other, "event dispatch failed");
            internal_error("Failed to process event", &other.to_string())
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub flow_runner: FlowRunner,
}

/// Body of `POST /claims/{id}/events`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "input", rename_all = "snake_case")]
pub enum EventRequest {
    GetStarted,
    Next,
    Prev,
    Help,
    Action(Value),
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub session_id: String,
    pub current_step: usize,
    pub step_id: Option<String>,
    pub status: String,
    pub response: Option<String>,
    pub ready: bool,
    pub transition: Option<Transition>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub wizard_id: String,
    pub current_step: usize,
    pub step_id: Option<String>,
    pub step_label: Option<String>,
    pub ready: bool,
    pub status_message: Option<String>,
    pub steps: Vec<StepDescriptor>,
    pub payload: Option<Value>,
    pub state: HashMap<String, Value>,
}

impl SessionResponse {
    fn build(runner: &FlowRunner, session: &Session) -> Self {
        let wizard = runner.wizard();
        let step = wizard.get_step(session.current_step());
        Self {
            session_id: session.id.clone(),
            wizard_id: session.wizard_id.clone(),
            current_step: session.current_step(),
            step_id: step.as_ref().map(|s| s.id().to_string()),
            step_label: step.as_ref().map(|s| s.label().to_string()),
            ready: wizard.is_ready(session),
            status_message: session.status_message.clone(),
            steps: wizard.descriptors(),
            payload: session.payload.clone(),
            state: session.context.snapshot(),
        }
    }
}

pub fn create_app(config: &ServiceConfig) -> wizard_flow::Result<Router> {
    let collaborators = Collaborators::canned(config.simulation);
    let flow_runner = create_flow_runner(&collaborators, config.simulation, config.backtrack)?;
    Ok(build_router(AppState { flow_runner }))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/claims", post(create_claim))
        .route("/claims/{session_id}", get(get_claim))
        .route("/claims/{session_id}/events", post(send_event))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags each request with a fresh correlation id, in a span and on the response.
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(CORRELATION_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;
    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "ClaimBuddy",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Guided medical insurance claim: upload a bill, review it, check scheme eligibility and submit",
        "endpoints": {
            "POST /claims": "Start a new claim session",
            "GET /claims/{session_id}": "Current step, readiness and step state",
            "POST /claims/{session_id}/events": "Send get_started, next, prev, help or a step action",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn create_claim(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let session = state.flow_runner.create_session().await.map_err(|e| {
        error!(error = %e, "failed to create claim session");
        internal_error("Failed to create claim session", &e.to_string())
    })?;
    info!(session_id = %session.id, "claim session created");
    Ok(Json(SessionResponse::build(&state.flow_runner, &session)))
}

async fn get_claim(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    let session = state
        .flow_runner
        .get_session(&session_id)
        .await
        .map_err(|e| flow_error(&session_id, e))?;
    Ok(Json(SessionResponse::build(&state.flow_runner, &session)))
}

async fn send_event(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<EventRequest>,
) -> ApiResult<EventResponse> {
    info!(session_id = %session_id, event = ?request, "claim event received");
    let notifier = RecordingNotifier::new();

    let event = match request {
        EventRequest::GetStarted => Event::GetStarted,
        EventRequest::Next => Event::Next,
        EventRequest::Prev => Event::Prev,
        EventRequest::Action(input) => Event::Action(input),
        EventRequest::Help => {
            let session = state
                .flow_runner
                .get_session(&session_id)
                .await
                .map_err(|e| flow_error(&session_id, e))?;
            notifier.notify(help_notification());
            return Ok(Json(EventResponse {
                session_id: session.id.clone(),
                current_step: session.current_step(),
                step_id: step_id(&state.flow_runner, &session),
                status: "help".to_string(),
                response: None,
                ready: state.flow_runner.wizard().is_ready(&session),
                transition: None,
                notifications: notifier.drain(),
            }));
        }
    };

    let (result, session) = state
        .flow_runner
        .run(&session_id, event, &notifier)
        .await
        .map_err(|e| flow_error(&session_id, e))?;

    Ok(Json(EventResponse {
        session_id: session.id.clone(),
        current_step: session.current_step(),
        step_id: step_id(&state.flow_runner, &session),
        status: status_label(result.status).to_string(),
        response: result.response,
        ready: state.flow_runner.wizard().is_ready(&session),
        transition: result.transition,
        notifications: notifier.drain(),
    }))
}

fn step_id(runner: &FlowRunner, session: &Session) -> Option<String> {
    runner
        .wizard()
        .get_step(session.current_step())
        .map(|step| step.id().to_string())
}

fn status_label(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::WaitingForInput => "waiting_for_input",
        ExecutionStatus::NotReady => "not_ready",
        ExecutionStatus::Completed => "completed",
    }
}
