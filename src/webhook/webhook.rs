use axum::http::StatusCode;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

// - GET /webhook
async fn verify() -> (StatusCode, &'static str) {
    info!("GET Request");
    (StatusCode::OK, "Webhook is ready")
}

// - POST /webhook
#[tracing::instrument(
    name = "Webhook",
    skip(payload),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
async fn receive(payload: Json<Value>) -> Json<Value> {
    let Json(payload) = payload;
    info!(payload = %payload, "POST Request");
    Json(json!({ "status": "success" }))
}

/// Router for the webhook listener: logs whatever gets posted to `/webhook`.
pub fn router() -> Router {
    Router::new()
        .route("/health", routing::get(|| async { "up" }))
        .route("/webhook", routing::get(verify).post(receive))
}
