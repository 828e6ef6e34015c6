//! Port interface for the RPC transport

use async_trait::async_trait;
use storedesk_domain::{Result, RpcEnvelope, RpcRequest};

/// Executes one logical stored-procedure call and returns the raw envelope.
///
/// Implementations own retries and credential attachment and must be safe to
/// share between concurrent callers.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn execute(&self, request: &RpcRequest) -> Result<RpcEnvelope>;
}
