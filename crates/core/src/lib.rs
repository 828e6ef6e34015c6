//! # StoreDesk Core
//!
//! Pure RPC logic - no HTTP or platform code.
//!
//! This crate contains:
//! - Status code classification and response normalization
//! - Stored-procedure feedback checks for writes
//! - The retry policy and per-call retry loop
//! - The `RpcTransport` port and the generic `StoredProcedureClient`
//! - Configuration-driven domain adapters (catalog)
//!
//! ## Architecture Principles
//! - Only depends on `storedesk-domain`
//! - All I/O goes through the `RpcTransport` trait

pub mod catalog;
pub mod rpc;

pub use catalog::{ResourceAdapter, ResourceEndpoints};
pub use rpc::{
    check_mutation_feedback, classify, normalize, Endpoint, MutationReceipt, RetryPolicy,
    RpcTransport, StatusCategory, StoredProcedureClient,
};
