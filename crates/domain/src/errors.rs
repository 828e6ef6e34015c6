//! Error types used throughout the RPC client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Field-level validation message reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Payload key the message refers to
    pub field: String,
    /// Backend message
    pub message: String,
}

/// Coarse error categories, used for logging labels and user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No response received
    Connection,
    /// Input rejected
    Validation,
    /// Credential missing or refused
    Authentication,
    /// No matching record
    NotFound,
    /// Backend failure or unknown status
    Server,
    /// Procedure reported a failure in its feedback
    OperationFailed,
    /// Invalid client configuration
    Config,
}

impl ErrorCategory {
    /// Stable label suitable for structured logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::NotFound => "not_found",
            Self::Server => "server",
            Self::OperationFailed => "operation_failed",
            Self::Config => "config",
        }
    }
}

/// Main error type for stored-procedure calls
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RpcError {
    /// No response was received (DNS, timeout, socket failure).
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Input rejected by the backend or by local checks.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<FieldError>,
    },

    /// Credential missing or refused (HTTP 401/403).
    #[error("Authentication error: {message}")]
    Authentication { message: String, status: Option<i64> },

    /// A lookup matched no record.
    #[error("Not found: {message}")]
    NotFound { message: String, status: Option<i64> },

    /// The backend failed or answered with an unknown status.
    #[error("Server error: {message}")]
    Server { message: String, status: Option<i64> },

    /// The stored procedure reported a failure in its feedback tuple.
    #[error("Operation failed: {message} (error id {error_id})")]
    OperationFailed { message: String, error_id: i64, return_id: i64 },

    /// The client configuration is missing or invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for RPC operations
pub type Result<T> = std::result::Result<T, RpcError>;

impl RpcError {
    /// Connection error with `message`.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into() }
    }

    /// Validation error without field details.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), fields: Vec::new() }
    }

    /// Not-found error, with the protocol status if known.
    pub fn not_found(message: impl Into<String>, status: Option<i64>) -> Self {
        Self::NotFound { message: message.into(), status }
    }

    /// Server error, with the protocol status if known.
    pub fn server(message: impl Into<String>, status: Option<i64>) -> Self {
        Self::Server { message: message.into(), status }
    }

    /// Configuration error with `message`.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Build an error from a non-2xx HTTP response.
    ///
    /// The body's `message` is preferred when the body is a JSON record that
    /// carries one and the status maps unambiguously to a kind; otherwise a
    /// per-status default message is used.
    pub fn from_http_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let body_message = parsed
            .as_ref()
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string);
        let code = Some(i64::from(status));

        match status {
            400 | 422 => Self::Validation {
                message: body_message.unwrap_or_else(|| default_http_message(status)),
                fields: parsed.as_ref().map(field_errors).unwrap_or_default(),
            },
            401 | 403 => Self::Authentication {
                message: body_message.unwrap_or_else(|| default_http_message(status)),
                status: code,
            },
            404 => Self::NotFound {
                message: body_message.unwrap_or_else(|| default_http_message(status)),
                status: code,
            },
            500..=599 => Self::Server {
                message: body_message.unwrap_or_else(|| default_http_message(status)),
                status: code,
            },
            _ => Self::Server { message: default_http_message(status), status: code },
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Server { .. } => ErrorCategory::Server,
            Self::OperationFailed { .. } => ErrorCategory::OperationFailed,
            Self::Config { .. } => ErrorCategory::Config,
        }
    }

    /// Numeric status (HTTP or protocol) attached to the error, if any.
    pub fn status(&self) -> Option<i64> {
        match self {
            Self::Authentication { status, .. }
            | Self::NotFound { status, .. }
            | Self::Server { status, .. } => *status,
            _ => None,
        }
    }

    /// The raw message carried by the error, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message }
            | Self::Validation { message, .. }
            | Self::Authentication { message, .. }
            | Self::NotFound { message, .. }
            | Self::Server { message, .. }
            | Self::OperationFailed { message, .. }
            | Self::Config { message } => message,
        }
    }

    /// Returns true for failures that may succeed when the call is repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Server { status: Some(status), .. } => u16::try_from(*status)
                .map(|code| crate::constants::RETRYABLE_HTTP_STATUSES.contains(&code))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Message suitable for showing to an end user.
    ///
    /// Validation, not-found and stored-procedure failures carry backend text
    /// written for users; everything else falls back to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::OperationFailed { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            other => generic_user_message(other.category()).to_string(),
        }
    }
}

fn generic_user_message(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Connection => {
            "The server could not be reached. Please check your connection and try again."
        }
        ErrorCategory::Validation => "Some of the submitted data is invalid.",
        ErrorCategory::Authentication => "Your session has expired. Please sign in again.",
        ErrorCategory::NotFound => "The requested record does not exist.",
        ErrorCategory::Server | ErrorCategory::Config => {
            "An unexpected error occurred. Please try again later."
        }
        ErrorCategory::OperationFailed => "The operation could not be completed.",
    }
}

fn default_http_message(status: u16) -> String {
    match status {
        400 => "The request was rejected as invalid".to_string(),
        401 => "Authentication is required".to_string(),
        403 => "Access to this resource is forbidden".to_string(),
        404 => "The requested resource was not found".to_string(),
        408 => "The server timed out waiting for the request".to_string(),
        422 => "The request could not be processed".to_string(),
        429 => "Too many requests".to_string(),
        500..=599 => format!("The server failed to process the request (HTTP {status})"),
        _ => format!("Request failed with HTTP status {status}"),
    }
}

/// Extract `{"errors": {"field": "msg" | ["msg", ...]}}` style field messages.
fn field_errors(body: &Value) -> Vec<FieldError> {
    let Some(errors) = body.get("errors").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    for (field, value) in errors {
        match value {
            Value::String(message) => {
                fields.push(FieldError { field: field.clone(), message: message.clone() });
            }
            Value::Array(messages) => {
                fields.extend(messages.iter().filter_map(Value::as_str).map(|message| {
                    FieldError { field: field.clone(), message: message.to_string() }
                }));
            }
            _ => {}
        }
    }
    fields
}
