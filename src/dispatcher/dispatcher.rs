//! # WhatsApp template dispatcher
//!
//! Sends template messages to the WhatsApp Cloud API. One call to
//! [`WhatsAppDispatcher::send`] issues exactly one POST; nothing is queued or
//! retried.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::configuration::{ConfigError, ProviderSettings};
use crate::template::{TemplateMessage, TemplateParameters};
use crate::traits::MessageDispatcher;

/// Outcome of a send attempt that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The provider answered 200 with this JSON body.
    Sent(Value),
    /// The provider answered with any other status.
    Rejected { status: StatusCode, body: String },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Sent(_))
    }

    /// Message ids the provider echoed back under `messages[].id`.
    pub fn message_ids(&self) -> Vec<&str> {
        match self {
            DispatchOutcome::Sent(body) => body
                .get("messages")
                .and_then(Value::as_array)
                .map(|messages| {
                    messages
                        .iter()
                        .filter_map(|m| m.get("id").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default(),
            DispatchOutcome::Rejected { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to serialize template message: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to reach the messaging provider: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider returned 200 with an unreadable body: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

impl DispatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DispatchError::Transport(e) if e.is_timeout())
    }
}

/// HTTP-based implementation of MessageDispatcher
#[derive(Debug, Clone)]
pub struct WhatsAppDispatcher {
    client: Client,
    settings: ProviderSettings,
}

impl WhatsAppDispatcher {
    pub fn new(settings: ProviderSettings) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        info!("Creating HTTP client for the messaging provider");
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, settings })
    }

    /// Builds a template message and sends it from `sender_phone_id`.
    pub async fn send(
        &self,
        sender_phone_id: &str,
        recipient: &str,
        template_name: &str,
        language_code: &str,
        parameters: &TemplateParameters,
    ) -> Result<DispatchOutcome, DispatchError> {
        let message = TemplateMessage::build(recipient, template_name, language_code, parameters);
        self.dispatch(sender_phone_id, &message).await
    }
}

#[async_trait]
impl MessageDispatcher for WhatsAppDispatcher {
    #[tracing::instrument(
        name = "dispatch",
        skip(self, message),
        fields(
            request_id = %Uuid::new_v4(),
            template = %message.template_name(),
        )
    )]
    async fn dispatch(
        &self,
        sender_phone_id: &str,
        message: &TemplateMessage,
    ) -> Result<DispatchOutcome, DispatchError> {
        let payload = message.to_json().map_err(DispatchError::Serialize)?;

        let response = self
            .client
            .post(self.settings.messages_url(sender_phone_id))
            .bearer_auth(self.settings.credential.expose())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(DispatchError::Transport)?;

        let status = response.status();
        interpret_response(status, response.text().await)
    }
}

/// Maps the provider's status and body to an outcome.
///
/// A rejection keeps its status even when the body could not be read.
fn interpret_response(
    status: StatusCode,
    body: Result<String, reqwest::Error>,
) -> Result<DispatchOutcome, DispatchError> {
    if status != StatusCode::OK {
        let body = body.unwrap_or_else(|e| {
            warn!("Failed to read rejection body: {}", e);
            String::new()
        });
        warn!("Failed to send message. Status code: {}, body: {}", status, body);
        return Ok(DispatchOutcome::Rejected { status, body });
    }

    let body = body.map_err(DispatchError::Transport)?;
    let body: Value = serde_json::from_str(&body).map_err(DispatchError::InvalidResponse)?;
    info!("Message sent successfully");

    Ok(DispatchOutcome::Sent(body))
}
