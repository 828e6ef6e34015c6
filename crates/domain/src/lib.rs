//! # StoreDesk Domain
//!
//! Wire types, configuration and the error taxonomy for the stored-procedure
//! RPC client.
//!
//! This crate contains:
//! - Request/response envelope types and the feedback tuple
//! - Tenant context and payload construction
//! - The `RpcError` taxonomy and `Result` alias
//! - Client configuration structures and protocol constants
//!
//! ## Architecture
//! - No dependencies on other StoreDesk crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
