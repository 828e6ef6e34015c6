//! Wire types for the stored-procedure protocol

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, RpcError};

/// Timeout class a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutTier {
    /// Interactive reads
    Short,
    /// Standard server-side reads and writes
    #[default]
    Standard,
    /// Reports and exports
    LongRunning,
    /// Large payload transfers
    Upload,
}

impl fmt::Display for TimeoutTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Standard => write!(f, "standard"),
            Self::LongRunning => write!(f, "long_running"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

/// HTTP verb used to issue a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `POST`, used by every stored procedure by default
    #[default]
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpVerb {
    /// Whether repeating the verb with the same input has the effect of one call.
    pub fn is_idempotent(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options | Self::Put | Self::Delete)
    }

    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a call reads a collection or looks up a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallContext {
    /// Collection read; no match is an empty list
    List,
    /// Single-record lookup; no match is an error
    ById,
}

/// A single stored-procedure invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    /// Path relative to the configured base address, e.g. `/brands/find-all`
    pub endpoint: String,
    /// Snake-cased tenant and business parameters
    pub payload: Map<String, Value>,
    /// Timeout class
    pub tier: TimeoutTier,
    /// HTTP verb
    pub verb: HttpVerb,
    /// Declared side-effect free, independent of the verb
    pub read_only: bool,
}

impl RpcRequest {
    /// POST request in the standard tier, not declared read-only.
    pub fn new(endpoint: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            payload,
            tier: TimeoutTier::default(),
            verb: HttpVerb::default(),
            read_only: false,
        }
    }

    /// Override the timeout tier.
    pub fn with_tier(mut self, tier: TimeoutTier) -> Self {
        self.tier = tier;
        self
    }

    /// Override the HTTP verb.
    pub fn with_verb(mut self, verb: HttpVerb) -> Self {
        self.verb = verb;
        self
    }

    /// Declare the underlying stored procedure free of side effects.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Retry eligibility: an idempotent verb or a declared read-only procedure.
    pub fn is_idempotent(&self) -> bool {
        self.verb.is_idempotent() || self.read_only
    }
}

/// Raw response envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcEnvelope {
    /// Protocol status, e.g. `100200`
    pub status_code: i64,
    /// Backend message, often empty on success
    #[serde(default)]
    pub message: String,
    /// Id of the affected record for writes
    #[serde(default)]
    pub record_id: i64,
    /// Row count reported by the backend
    #[serde(default)]
    pub quantity: i64,
    /// Shape-dependent payload
    #[serde(default)]
    pub data: Value,
    /// Free-form extra text some procedures set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info1: Option<String>,
}

impl RpcEnvelope {
    /// Envelope with the given status and payload, other fields zeroed.
    pub fn new(status_code: i64, data: Value) -> Self {
        Self {
            status_code,
            message: String::new(),
            record_id: 0,
            quantity: 0,
            data,
            info1: None,
        }
    }
}

/// Feedback row emitted by a mutating stored procedure.
///
/// `error_id != 0` means the write failed whatever the outer status says.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredProcedureFeedback {
    /// Id of the affected record
    #[serde(rename = "returnId", alias = "return_id", default, deserialize_with = "null_as_default")]
    pub return_id: i64,
    /// Backend text; SQL NULL decodes as an empty message
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Non-zero when the procedure failed
    #[serde(rename = "errorId", alias = "error_id", default, deserialize_with = "null_as_default")]
    pub error_id: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StoredProcedureFeedback {
    /// Whether the stored procedure reported an error.
    pub fn is_failure(&self) -> bool {
        self.error_id != 0
    }

    /// Convert into the `OperationFailed` error carrying this row.
    pub fn into_error(self) -> RpcError {
        RpcError::OperationFailed {
            message: self.message,
            error_id: self.error_id,
            return_id: self.return_id,
        }
    }
}

/// Outcome of normalizing one envelope. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedOutcome<T> {
    /// Data returned
    Success(T),
    /// Valid call without data
    EmptySuccess(T),
    /// Backend validation message
    ValidationError(String),
    /// Not-found message
    NotFound(String),
    /// Backend failure, or a payload of unexpected shape
    ServerError { message: String, status: i64 },
    /// No response received
    ConnectionError(String),
    /// Outer call succeeded but the stored procedure reported a failure.
    OperationFailed(StoredProcedureFeedback),
}

impl<T> ClassifiedOutcome<T> {
    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::EmptySuccess(_))
    }

    /// Convert into the payload or the matching `RpcError`.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(data) | Self::EmptySuccess(data) => Ok(data),
            Self::ValidationError(message) => Err(RpcError::validation(message)),
            Self::NotFound(message) => Err(RpcError::not_found(message, None)),
            Self::ServerError { message, status } => Err(RpcError::server(message, Some(status))),
            Self::ConnectionError(message) => Err(RpcError::connection(message)),
            Self::OperationFailed(feedback) => Err(feedback.into_error()),
        }
    }
}
