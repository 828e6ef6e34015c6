//! Stored-procedure RPC layer
//!
//! Status classification, retry policy, response shapes, normalization and
//! the generic client used by every domain adapter. The transport itself is
//! behind the [`RpcTransport`] port.

pub mod classifier;
pub mod client;
pub mod endpoint;
pub mod feedback;
pub mod normalizer;
pub mod ports;
pub mod retry;
pub mod shapes;

pub use classifier::{classify, StatusCategory};
pub use client::{MutationReceipt, StoredProcedureClient};
pub use endpoint::Endpoint;
pub use feedback::{check_mutation_feedback, locate_feedback, normalize_mutation};
pub use normalizer::normalize;
pub use ports::RpcTransport;
pub use retry::{AttemptFailure, FailedAttempt, RetryAttempt, RetryPolicy};
pub use shapes::{ResponseShape, ShapeError, TupleShape};
