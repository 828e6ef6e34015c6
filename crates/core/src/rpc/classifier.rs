//! Protocol status code classification

use storedesk_domain::constants::{
    STATUS_EMPTY, STATUS_NOT_FOUND, STATUS_NOT_FOUND_LEGACY, STATUS_SUCCESS,
    STATUS_VALIDATION_ERROR,
};
use storedesk_domain::CallContext;

/// Outcome category for a protocol status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    /// Data returned
    Success,
    /// Valid call with an empty payload
    EmptySuccess,
    /// Rejected input, message comes from the backend
    ValidationError,
    /// Lookup matched no record
    NotFound,
    /// Any other status, including unknown codes
    ServerError,
}

impl StatusCategory {
    /// Whether the category carries a usable payload.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::EmptySuccess)
    }
}

/// Map a protocol status code to its category.
///
/// In `List` context a query that matched nothing is not an error: both the
/// empty code and the not-found codes classify as `EmptySuccess`. In `ById`
/// context not-found stays `NotFound`. Unknown codes are `ServerError`.
pub fn classify(status_code: i64, context: CallContext) -> StatusCategory {
    match (status_code, context) {
        (STATUS_SUCCESS, _) => StatusCategory::Success,
        (STATUS_EMPTY, _) => StatusCategory::EmptySuccess,
        (STATUS_VALIDATION_ERROR, _) => StatusCategory::ValidationError,
        (STATUS_NOT_FOUND | STATUS_NOT_FOUND_LEGACY, CallContext::List) => {
            StatusCategory::EmptySuccess
        }
        (STATUS_NOT_FOUND | STATUS_NOT_FOUND_LEGACY, CallContext::ById) => {
            StatusCategory::NotFound
        }
        _ => StatusCategory::ServerError,
    }
}
