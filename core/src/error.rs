//! Error types for the Spendly API client.
//!
//! # Design
//! Status codes the screens react to differently get their own variant:
//! 422 carries the backend's field-keyed validation messages, 401 is an
//! authentication failure, 404 a missing resource. Every other non-2xx
//! response lands in `HttpError` with the raw status code and body.
//! Services never wrap these; they reach the caller with the backend payload
//! intact.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the client, the transports and the services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the payload (422). `errors` maps field names to
    /// their messages in server order.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Invalid credentials or an expired session (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A call that needs a session was made without one.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status not covered above.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Laravel-style error body: `{"message": "...", "errors": {"email": ["..."]}}`.
#[derive(Debug, Default, Deserialize)]
struct ServerErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ServerErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

impl ApiError {
    /// Map a non-success response to the matching variant.
    pub fn from_response(response: &HttpResponse) -> Self {
        let parsed = ServerErrorBody::parse(&response.body);
        match response.status {
            401 => ApiError::Unauthorized(parsed.message.unwrap_or_else(|| "Unauthenticated.".to_string())),
            403 => ApiError::Forbidden(parsed.message.unwrap_or_default()),
            404 => ApiError::NotFound,
            422 => ApiError::Validation {
                message: parsed.message.unwrap_or_else(|| "The given data was invalid.".to_string()),
                errors: parsed.errors,
            },
            status => ApiError::HttpError {
                status,
                body: response.body.clone(),
            },
        }
    }

    /// First validation message for `field`, if the server reported one.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            ApiError::Validation { errors, .. } => errors
                .get(field)
                .and_then(|messages| messages.first())
                .map(String::as_str),
            _ => None,
        }
    }

    /// First message per field, in field order.
    pub fn field_errors(&self) -> BTreeMap<&str, &str> {
        match self {
            ApiError::Validation { errors, .. } => errors
                .iter()
                .filter_map(|(field, messages)| {
                    messages.first().map(|first| (field.as_str(), first.as_str()))
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// The server-provided `message` when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            ApiError::Validation { message, .. } => Some(message.clone()),
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => Some(message.clone()),
            ApiError::HttpError { body, .. } => ServerErrorBody::parse(body).message,
            _ => None,
        };
        message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// True for failures where no response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout)
    }
}
