//! Endpoint descriptors

use serde_json::{Map, Value};
use storedesk_domain::{HttpVerb, RpcRequest, TimeoutTier};

/// Static description of one stored-procedure endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Path relative to the base address
    pub path: String,
    /// Timeout class
    pub tier: TimeoutTier,
    /// HTTP verb
    pub verb: HttpVerb,
    /// Whether the procedure is side-effect free
    pub read_only: bool,
}

impl Endpoint {
    /// A side-effect free procedure, eligible for retries.
    pub fn read(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tier: TimeoutTier::Standard,
            verb: HttpVerb::Post,
            read_only: true,
        }
    }

    /// A mutating procedure. Never retried unless its verb is idempotent.
    pub fn write(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tier: TimeoutTier::Standard,
            verb: HttpVerb::Post,
            read_only: false,
        }
    }

    /// Override the timeout tier.
    pub fn with_tier(mut self, tier: TimeoutTier) -> Self {
        self.tier = tier;
        self
    }

    /// Override the HTTP verb.
    pub fn with_verb(mut self, verb: HttpVerb) -> Self {
        self.verb = verb;
        self
    }

    /// Request for this endpoint carrying `payload`.
    pub fn request(&self, payload: Map<String, Value>) -> RpcRequest {
        let request = RpcRequest::new(self.path.clone(), payload)
            .with_tier(self.tier)
            .with_verb(self.verb);
        if self.read_only {
            request.read_only()
        } else {
            request
        }
    }
}
