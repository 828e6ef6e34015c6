//! Response normalization
//!
//! Classifies the envelope's status code first and only extracts the payload
//! when the call succeeded. Extraction failures become server errors.

use serde_json::Value;
use storedesk_domain::{CallContext, ClassifiedOutcome, RpcEnvelope};

use super::classifier::{classify, StatusCategory};
use super::shapes::ShapeError;

/// Normalize an envelope into a classified outcome.
///
/// `extractor` pulls the typed payload out of `data`. An empty-but-valid
/// response yields `T::default()` when `data` is empty; in `List` context it
/// is reported as plain `Success`.
pub fn normalize<T, F>(envelope: &RpcEnvelope, extractor: F, context: CallContext) -> ClassifiedOutcome<T>
where
    T: Default,
    F: FnOnce(&Value) -> Result<T, ShapeError>,
{
    if let Some(failure) = classify_failure(envelope, context) {
        return failure;
    }

    let category = classify(envelope.status_code, context);
    let extracted = if category == StatusCategory::EmptySuccess && is_empty(&envelope.data) {
        Ok(T::default())
    } else {
        extractor(&envelope.data)
    };

    match (extracted, category, context) {
        (Err(err), _, _) => ClassifiedOutcome::ServerError {
            message: format!("Unexpected response shape: {err}"),
            status: envelope.status_code,
        },
        (Ok(data), StatusCategory::EmptySuccess, CallContext::ById) => {
            ClassifiedOutcome::EmptySuccess(data)
        }
        (Ok(data), _, _) => ClassifiedOutcome::Success(data),
    }
}

/// The error outcome for a non-success status, or `None` if the call
/// succeeded.
pub(crate) fn classify_failure<T>(
    envelope: &RpcEnvelope,
    context: CallContext,
) -> Option<ClassifiedOutcome<T>> {
    match classify(envelope.status_code, context) {
        StatusCategory::Success | StatusCategory::EmptySuccess => None,
        StatusCategory::ValidationError => {
            Some(ClassifiedOutcome::ValidationError(message_or(envelope, "Validation failed")))
        }
        StatusCategory::NotFound => {
            Some(ClassifiedOutcome::NotFound(message_or(envelope, "Record not found")))
        }
        StatusCategory::ServerError => Some(ClassifiedOutcome::ServerError {
            message: message_or(
                envelope,
                &format!("Unexpected status code {}", envelope.status_code),
            ),
            status: envelope.status_code,
        }),
    }
}

fn message_or(envelope: &RpcEnvelope, fallback: &str) -> String {
    let message = envelope.message.trim();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

fn is_empty(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(record) => record.is_empty(),
        _ => false,
    }
}
