//! Shared test helpers for `storedesk-core` integration tests.
//!
//! `FakeTransport` replays scripted envelopes and records every request so
//! tests can assert on payloads without an HTTP server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use storedesk_core::{RpcTransport, StoredProcedureClient};
use storedesk_domain::{Result, RpcEnvelope, RpcError, RpcRequest, TenantContext};

#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<RpcEnvelope>>>,
    requests: Mutex<Vec<RpcRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status_code: i64, data: Value) -> &Self {
        self.respond_with(RpcEnvelope::new(status_code, data))
    }

    pub fn respond_with(&self, envelope: RpcEnvelope) -> &Self {
        self.responses.lock().expect("responses lock").push_back(Ok(envelope));
        self
    }

    pub fn fail(&self, error: RpcError) -> &Self {
        self.responses.lock().expect("responses lock").push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl RpcTransport for FakeTransport {
    async fn execute(&self, request: &RpcRequest) -> Result<RpcEnvelope> {
        self.requests.lock().expect("requests lock").push(request.clone());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(RpcError::connection("no scripted response")))
    }
}

pub fn client(transport: Arc<FakeTransport>) -> StoredProcedureClient {
    StoredProcedureClient::new(transport, TenantContext::default().with_store(1).with_user(7))
}
