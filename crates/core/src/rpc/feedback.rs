//! Stored-procedure feedback checks for mutation endpoints
//!
//! A successful outer status is necessary but not sufficient for a write:
//! the feedback row's `errorId` is the authoritative signal.

use serde_json::Value;
use storedesk_domain::{
    CallContext, ClassifiedOutcome, Result, RpcEnvelope, StoredProcedureFeedback,
};

use super::normalizer::classify_failure;
use super::shapes::{decode, looks_like_feedback, ResponseShape};

/// Find the feedback row in a mutation response.
///
/// Looks at the tuple's feedback element first, then at a bare feedback row,
/// then inside each labeled entry.
pub fn locate_feedback(data: &Value) -> Option<StoredProcedureFeedback> {
    match ResponseShape::parse(data).ok()? {
        ResponseShape::Empty => None,
        ResponseShape::Tuple(tuple) => tuple
            .feedback
            .into_iter()
            .next()
            .or_else(|| first_feedback_row(&tuple.rows)),
        ResponseShape::Rows(rows) => first_feedback_row(&rows),
        ResponseShape::Labeled(record) => record.values().find_map(locate_feedback),
    }
}

fn first_feedback_row(rows: &[Value]) -> Option<StoredProcedureFeedback> {
    rows.first().filter(|row| looks_like_feedback(row)).and_then(|row| decode(row.clone()).ok())
}

/// Normalize a mutation envelope into its feedback outcome.
pub fn normalize_mutation(envelope: &RpcEnvelope) -> ClassifiedOutcome<StoredProcedureFeedback> {
    if let Some(failure) = classify_failure(envelope, CallContext::ById) {
        return failure;
    }

    match locate_feedback(&envelope.data) {
        Some(feedback) if feedback.is_failure() => ClassifiedOutcome::OperationFailed(feedback),
        Some(feedback) => ClassifiedOutcome::Success(feedback),
        None => ClassifiedOutcome::ServerError {
            message: "Mutation response did not include stored procedure feedback".to_string(),
            status: envelope.status_code,
        },
    }
}

/// Check a mutation envelope, returning the feedback row on success.
pub fn check_mutation_feedback(envelope: &RpcEnvelope) -> Result<StoredProcedureFeedback> {
    normalize_mutation(envelope).into_result()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storedesk_domain::RpcError;

    use super::*;

    fn mutation(status: i64, data: Value) -> RpcEnvelope {
        RpcEnvelope::new(status, data)
    }

    #[test]
    fn outer_success_with_feedback_error_is_a_failure() {
        let envelope = mutation(
            100_200,
            json!([[], [{ "returnId": 0, "message": "Brand already exists", "errorId": 7 }], {}]),
        );

        let err = check_mutation_feedback(&envelope).unwrap_err();
        assert_eq!(
            err,
            RpcError::OperationFailed {
                message: "Brand already exists".into(),
                error_id: 7,
                return_id: 0,
            }
        );
    }

    #[test]
    fn clean_feedback_is_success() {
        let envelope = mutation(
            100_200,
            json!([[], [{ "returnId": 31, "message": "created", "errorId": 0 }], {}]),
        );

        let feedback = check_mutation_feedback(&envelope).unwrap();
        assert_eq!(feedback.return_id, 31);
    }

    #[test]
    fn null_feedback_message_still_succeeds() {
        let envelope =
            mutation(100_200, json!([[], [{ "returnId": 31, "message": null, "errorId": 0 }], {}]));

        let feedback = check_mutation_feedback(&envelope).unwrap();
        assert_eq!(feedback.return_id, 31);
        assert!(feedback.message.is_empty());
    }

    #[test]
    fn null_feedback_message_keeps_operation_failed() {
        let envelope =
            mutation(100_200, json!([[], [{ "returnId": 0, "message": null, "errorId": 7 }], {}]));

        assert_eq!(
            check_mutation_feedback(&envelope),
            Err(RpcError::OperationFailed { message: String::new(), error_id: 7, return_id: 0 })
        );
    }

    #[test]
    fn finds_feedback_inside_labeled_record() {
        let envelope = mutation(
            100_200,
            json!({ "Brand update": [{ "returnId": 4, "message": "locked", "errorId": 12 }] }),
        );

        assert!(matches!(
            normalize_mutation(&envelope),
            ClassifiedOutcome::OperationFailed(StoredProcedureFeedback { error_id: 12, .. })
        ));
    }

    #[test]
    fn missing_feedback_is_a_server_error() {
        let envelope = mutation(100_200, json!([{ "id": 1 }]));
        assert!(matches!(
            check_mutation_feedback(&envelope),
            Err(RpcError::Server { status: Some(100_200), .. })
        ));
    }

    #[test]
    fn outer_error_skips_feedback_inspection() {
        let mut envelope = mutation(100_400, json!([[], [{ "errorId": 0 }], {}]));
        envelope.message = "name is required".into();

        assert_eq!(
            check_mutation_feedback(&envelope),
            Err(RpcError::validation("name is required"))
        );
    }
}
