use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::{Json, Router, routing};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dispatcher::DispatchOutcome;
use crate::template::{TemplateMessage, TemplateParameters};
use crate::traits::MessageDispatcher;

type JsonResponse = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<dyn MessageDispatcher>,
    default_sender: Option<String>,
    started_at: Instant,
}

impl AppState {
    pub fn new(dispatcher: Arc<dyn MessageDispatcher>, default_sender: Option<String>) -> Self {
        Self {
            dispatcher,
            default_sender,
            started_at: Instant::now(),
        }
    }
}

/// Body of `POST /send-message`.
#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    #[serde(rename = "phone-number")]
    pub phone_number: Option<String>,
    #[serde(rename = "event-id")]
    pub event_id: Option<String>,
}

/// Body of `POST /send-template`.
#[derive(Debug, Deserialize)]
pub struct SendTemplateRequest {
    pub to: String,
    pub template: String,
    pub language: String,
    #[serde(default)]
    pub parameters: TemplateParameters,
    pub from: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> JsonResponse {
    (
        status,
        Json(json!({
            "status": "error",
            "error": message.into(),
        })),
    )
}

fn required(value: Option<String>, field: &str) -> Result<String, JsonResponse> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("missing field: {}", field),
        )),
    }
}

// - GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    let uptime = state.started_at.elapsed().as_secs_f64();
    Json(json!({
        "status": "ok",
        "uptime": format!("{} seconds", uptime),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// - POST /send-message
#[tracing::instrument(
    name = "SendMessage",
    skip(payload),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
async fn send_message(payload: Result<Json<IntakeRequest>, JsonRejection>) -> JsonResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected intake request: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let (phone_number, event_id) = match (
        required(request.phone_number, "phone-number"),
        required(request.event_id, "event-id"),
    ) {
        (Ok(phone_number), Ok(event_id)) => (phone_number, event_id),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    // Nothing maps an event id to a template yet.
    warn!("No template resolution available for event: {}", event_id);
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({
            "status": "error",
            "error": "event resolution is not available",
            "phone-number": phone_number,
            "event-id": event_id,
        })),
    )
}

// - POST /send-template
#[tracing::instrument(
    name = "SendTemplate",
    skip(state, payload),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
async fn send_template(
    State(state): State<AppState>,
    payload: Result<Json<SendTemplateRequest>, JsonRejection>,
) -> JsonResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    for (field, value) in [
        ("to", &request.to),
        ("template", &request.template),
        ("language", &request.language),
    ] {
        if value.trim().is_empty() {
            return error_response(StatusCode::BAD_REQUEST, format!("missing field: {}", field));
        }
    }

    let Some(sender) = request
        .from
        .filter(|s| !s.trim().is_empty())
        .or_else(|| state.default_sender.clone())
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "no sender phone number id given and none configured",
        );
    };

    let message = TemplateMessage::build(
        &request.to,
        &request.template,
        &request.language,
        &request.parameters,
    );

    match state.dispatcher.dispatch(&sender, &message).await {
        Ok(DispatchOutcome::Sent(response)) => {
            info!("Template {} sent", request.template);
            (
                StatusCode::OK,
                Json(json!({
                    "status": "sent",
                    "response": response,
                })),
            )
        }
        Ok(DispatchOutcome::Rejected { status, body }) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "status": "rejected",
                "provider_status": status.as_u16(),
                "body": body,
            })),
        ),
        Err(e) => {
            error!("Failed to dispatch template: {:?}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", routing::get(health))
        .route("/send-message", routing::post(send_message))
        .route("/send-template", routing::post(send_template))
        .with_state(state)
}
