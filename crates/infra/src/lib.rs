//! # StoreDesk Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-based [`HttpTransport`] implementing `RpcTransport`
//! - Conversions from reqwest errors into `RpcError`
//! - Configuration loading from environment and files
//! - Tracing subscriber initialization
//!
//! ## Architecture
//! - Implements traits defined in `storedesk-core`
//! - Contains all "impure" code (network I/O, environment, files)

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

use std::sync::Arc;

use storedesk_core::StoredProcedureClient;
use storedesk_domain::{Result, RpcConfig};

pub use errors::InfraError;
pub use http::{HttpTransport, HttpTransportBuilder};

/// Build a client wired to the HTTP transport from `config`.
pub fn connect(config: &RpcConfig) -> Result<StoredProcedureClient> {
    let transport = HttpTransport::from_config(config)?;
    Ok(StoredProcedureClient::new(Arc::new(transport), config.tenant.clone()))
}
