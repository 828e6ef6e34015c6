//! Response shapes and payload extractors
//!
//! Endpoints return their rows in one of three shapes:
//! - a bare array of rows
//! - a positional tuple `[rows[], [feedback], dbMetadata]`
//! - a record keyed by a human-readable label, e.g. `{"Brand find All": rows[]}`
//!
//! Extractors are plain functions from the envelope's `data` to a typed
//! payload; call sites pick the one matching their endpoint family.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use storedesk_domain::StoredProcedureFeedback;
use thiserror::Error;
use tracing::warn;

/// Raised when `data` does not have the shape an extractor expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// `data` was of the wrong JSON kind
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: &'static str },

    /// A labeled record lacked the requested label
    #[error("label '{0}' not present in response")]
    MissingLabel(String),

    /// Rows were present but did not decode into the target type
    #[error("failed to decode payload: {0}")]
    Decode(String),
}

/// Positional tuple returned by most stored procedures.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleShape {
    /// Result rows
    pub rows: Vec<Value>,
    /// Decodable feedback rows
    pub feedback: Vec<StoredProcedureFeedback>,
    /// Driver metadata, `Null` if absent
    pub metadata: Value,
}

/// The shape of an envelope's `data` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `null` or an empty array
    Empty,
    /// A bare array of rows
    Rows(Vec<Value>),
    /// A positional `[rows, feedback, metadata]` tuple
    Tuple(TupleShape),
    /// A record keyed by label
    Labeled(Map<String, Value>),
}

impl ResponseShape {
    /// Detect the shape of `data`.
    pub fn parse(data: &Value) -> Result<Self, ShapeError> {
        match data {
            Value::Null => Ok(Self::Empty),
            Value::Array(items) if items.is_empty() => Ok(Self::Empty),
            Value::Array(items) if items.first().is_some_and(Value::is_array) => {
                Ok(Self::Tuple(TupleShape::from_items(items)))
            }
            Value::Array(items) => Ok(Self::Rows(items.clone())),
            Value::Object(record) => Ok(Self::Labeled(record.clone())),
            other => Err(ShapeError::Unexpected {
                expected: "array or record",
                found: json_kind(other),
            }),
        }
    }

    /// Rows of the shape, looking through a tuple's first element.
    pub fn into_rows(self) -> Result<Vec<Value>, ShapeError> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Rows(rows) => Ok(rows),
            Self::Tuple(tuple) => Ok(tuple.rows),
            Self::Labeled(_) => {
                Err(ShapeError::Unexpected { expected: "array of rows", found: "record" })
            }
        }
    }
}

impl TupleShape {
    fn from_items(items: &[Value]) -> Self {
        let rows = match items.first() {
            Some(Value::Array(rows)) => rows.clone(),
            _ => Vec::new(),
        };

        // An undecodable feedback entry is dropped; the rows stay readable.
        let feedback = match items.get(1) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter(|entry| looks_like_feedback(entry))
                .filter_map(|entry| match decode::<StoredProcedureFeedback>(entry.clone()) {
                    Ok(feedback) => Some(feedback),
                    Err(err) => {
                        warn!(error = %err, "skipping undecodable feedback row");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let metadata = items.get(2).cloned().unwrap_or(Value::Null);

        Self { rows, feedback, metadata }
    }
}

pub(crate) fn looks_like_feedback(value: &Value) -> bool {
    value.as_object().is_some_and(|row| {
        row.contains_key("errorId") || row.contains_key("error_id")
    })
}

/// Every row, from a bare array or a positional tuple.
pub fn rows<T: DeserializeOwned>(data: &Value) -> Result<Vec<T>, ShapeError> {
    ResponseShape::parse(data)?.into_rows()?.into_iter().map(decode).collect()
}

/// The first row, if any, from a bare array or a positional tuple.
pub fn first_row<T: DeserializeOwned>(data: &Value) -> Result<Option<T>, ShapeError> {
    ResponseShape::parse(data)?.into_rows()?.into_iter().next().map(decode).transpose()
}

/// Rows stored under `label` in a labeled record.
///
/// The labeled value may itself be a bare array or a positional tuple.
pub fn labeled_rows<T: DeserializeOwned>(
    label: impl Into<String>,
) -> impl Fn(&Value) -> Result<Vec<T>, ShapeError> + Send + Sync {
    let label = label.into();
    move |data| rows::<T>(labeled_value(data, &label)?)
}

/// First row stored under `label` in a labeled record.
pub fn labeled_first<T: DeserializeOwned>(
    label: impl Into<String>,
) -> impl Fn(&Value) -> Result<Option<T>, ShapeError> + Send + Sync {
    let label = label.into();
    move |data| first_row::<T>(labeled_value(data, &label)?)
}

/// Decode the whole `data` field as `T`.
pub fn whole<T: DeserializeOwned>(data: &Value) -> Result<T, ShapeError> {
    decode(data.clone())
}

fn labeled_value<'a>(data: &'a Value, label: &str) -> Result<&'a Value, ShapeError> {
    match data {
        Value::Object(record) => {
            record.get(label).ok_or_else(|| ShapeError::MissingLabel(label.to_string()))
        }
        other => Err(ShapeError::Unexpected { expected: "labeled record", found: json_kind(other) }),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ShapeError> {
    serde_json::from_value(value).map_err(|e| ShapeError::Decode(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "record",
    }
}
