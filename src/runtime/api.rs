//! HTTP surface: submissions, stats, queue inspection and status webhooks.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::builders::CallScheduler;
use crate::core::{CapacityOracle, DispatchGateway, Job, SchedulerStats, Spawn};
use crate::infra::elevenlabs::CallPayload;
use crate::util::serde::{JobId, Priority, TrackingId};

/// Webhook fields that may carry the call identifier, in lookup order.
const WEBHOOK_ID_FIELDS: [&str; 7] = [
    "call_id",
    "callId",
    "conversation_id",
    "conversationId",
    "call_sid",
    "callSid",
    "id",
];

/// Client errors returned synchronously by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is malformed or incomplete.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Validated `POST /enqueue-call` body.
#[derive(Debug, Clone, PartialEq)]
pub struct EnqueueRequest {
    /// Job payload.
    pub payload: CallPayload,
    /// Requested priority, 0 when omitted.
    pub priority: Priority,
}

impl EnqueueRequest {
    /// Validate a decoded body.
    ///
    /// # Errors
    ///
    /// `ApiError::BadRequest` when the body is not an object, `payload` is
    /// missing or not an object, or `priority` is not an integer.
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        let Value::Object(mut body) = body else {
            return Err(ApiError::BadRequest("invalid payload".into()));
        };
        let Some(Value::Object(payload)) = body.remove("payload") else {
            return Err(ApiError::BadRequest("invalid payload".into()));
        };
        let priority = match body.remove("priority") {
            None | Some(Value::Null) => 0,
            Some(raw) => parse_priority(&raw)
                .ok_or_else(|| ApiError::BadRequest("invalid priority".into()))?,
        };
        Ok(Self {
            payload: CallPayload(payload),
            priority: Priority::new(priority),
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn parse_priority(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validated status notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    /// Identifier of the remote call.
    pub tracking_id: TrackingId,
    /// Lower-cased status, from `status` or else `type`.
    pub status: String,
}

impl WebhookEvent {
    /// Extract identifier and status from a decoded body.
    ///
    /// # Errors
    ///
    /// `ApiError::BadRequest` when no identifier field is present.
    pub fn from_body(body: &Value) -> Result<Self, ApiError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let tracking_id = WEBHOOK_ID_FIELDS
            .iter()
            .find_map(|name| match fields.get(*name)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| ApiError::BadRequest("missing call identifier".into()))?;

        let status = ["status", "type"]
            .iter()
            .find_map(|name| {
                fields
                    .get(*name)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_default()
            .to_lowercase();

        Ok(Self {
            tracking_id,
            status,
        })
    }
}

/// Accepted submission response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    /// Always true.
    pub enqueued: bool,
    /// Assigned job id.
    pub id: JobId,
    /// Queue depth after the insert.
    pub queue_size: usize,
}

/// Health response.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Service identity response.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Build the HTTP router over a scheduler handle.
pub fn create_router<O, G, S>(scheduler: CallScheduler<O, G, S>) -> Router
where
    O: CapacityOracle,
    G: DispatchGateway<CallPayload>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/stats", get(stats::<O, G, S>))
        .route("/queue", get(queue::<O, G, S>))
        .route("/enqueue-call", post(enqueue_call::<O, G, S>))
        .route("/webhook/elevenlabs", post(webhook::<O, G, S>))
        .with_state(scheduler)
}

async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "voice-slot-scheduler",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

async fn stats<O, G, S>(State(scheduler): State<CallScheduler<O, G, S>>) -> Json<SchedulerStats>
where
    O: CapacityOracle,
    G: DispatchGateway<CallPayload>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    Json(scheduler.stats())
}

async fn queue<O, G, S>(
    State(scheduler): State<CallScheduler<O, G, S>>,
) -> Json<Vec<Job<CallPayload>>>
where
    O: CapacityOracle,
    G: DispatchGateway<CallPayload>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    Json(scheduler.snapshot())
}

async fn enqueue_call<O, G, S>(
    State(scheduler): State<CallScheduler<O, G, S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError>
where
    O: CapacityOracle,
    G: DispatchGateway<CallPayload>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    let Json(body) = body?;
    let request = EnqueueRequest::from_body(body)?;
    let submission = scheduler.submit(request.payload, request.priority);
    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            enqueued: true,
            id: submission.id,
            queue_size: submission.queue_size,
        }),
    ))
}

async fn webhook<O, G, S>(
    State(scheduler): State<CallScheduler<O, G, S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
    O: CapacityOracle,
    G: DispatchGateway<CallPayload>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    let Json(body) = body?;
    let event = WebhookEvent::from_body(&body)?;
    scheduler.handle_notification(&event.tracking_id, &event.status);
    Ok(Json(json!({ "ok": true })))
}
