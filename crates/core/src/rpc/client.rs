//! Generic stored-procedure client
//!
//! One client serves every domain: callers supply the endpoint, the payload
//! and the extractor for the endpoint's response shape.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use storedesk_domain::{
    build_payload, CallContext, ClassifiedOutcome, Result, RpcEnvelope, RpcError,
    StoredProcedureFeedback, TenantContext,
};
use tracing::{debug, info, instrument};

use super::endpoint::Endpoint;
use super::feedback::check_mutation_feedback;
use super::normalizer::normalize;
use super::ports::RpcTransport;
use super::shapes::ShapeError;

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReceipt {
    /// Id of the affected record, from the envelope or the feedback row
    pub record_id: i64,
    /// Feedback row reported by the procedure
    pub feedback: StoredProcedureFeedback,
}

/// Client shared by all domain adapters.
#[derive(Clone)]
pub struct StoredProcedureClient {
    transport: Arc<dyn RpcTransport>,
    tenant: TenantContext,
}

impl StoredProcedureClient {
    /// Client issuing every call through `transport`, scoped to `tenant`.
    pub fn new(transport: Arc<dyn RpcTransport>, tenant: TenantContext) -> Self {
        Self { transport, tenant }
    }

    /// Tenant context merged into every payload.
    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    /// Same transport, different tenant scope.
    pub fn with_tenant(&self, tenant: TenantContext) -> Self {
        Self { transport: self.transport.clone(), tenant }
    }

    /// Merge the tenant context with business parameters.
    pub fn payload<P>(&self, params: &P) -> Result<Map<String, Value>>
    where
        P: Serialize + ?Sized,
    {
        build_payload(&self.tenant, params)
    }

    /// Execute a call and return the raw envelope.
    pub async fn execute_envelope(
        &self,
        endpoint: &Endpoint,
        body: Map<String, Value>,
    ) -> Result<RpcEnvelope> {
        self.transport.execute(&endpoint.request(body)).await
    }

    /// Execute a read and extract its typed payload.
    ///
    /// A not-found result in `ById` context reports the lookup parameters.
    #[instrument(skip(self, body, extractor), fields(endpoint = %endpoint.path))]
    pub async fn execute<T, F>(
        &self,
        endpoint: &Endpoint,
        body: Map<String, Value>,
        extractor: F,
        context: CallContext,
    ) -> Result<T>
    where
        T: Default,
        F: FnOnce(&Value) -> std::result::Result<T, ShapeError>,
    {
        let lookup = describe_lookup(&body, &self.tenant);
        let envelope = self.execute_envelope(endpoint, body).await?;

        debug!(status = envelope.status_code, quantity = envelope.quantity, "envelope received");

        match normalize(&envelope, extractor, context) {
            ClassifiedOutcome::NotFound(message) => Err(RpcError::not_found(
                format!("{message} ({} with {lookup})", endpoint.path),
                Some(envelope.status_code),
            )),
            outcome => outcome.into_result(),
        }
    }

    /// Execute a write and verify the stored procedure's feedback.
    #[instrument(skip(self, body), fields(endpoint = %endpoint.path))]
    pub async fn mutate(
        &self,
        endpoint: &Endpoint,
        body: Map<String, Value>,
    ) -> Result<MutationReceipt> {
        let envelope = self.execute_envelope(endpoint, body).await?;
        let feedback = check_mutation_feedback(&envelope)?;
        let record_id = if envelope.record_id != 0 { envelope.record_id } else { feedback.return_id };

        info!(record_id, "mutation applied");
        Ok(MutationReceipt { record_id, feedback })
    }
}

/// Render business parameters (tenant fields excluded) as `key=value` pairs.
fn describe_lookup(body: &Map<String, Value>, tenant: &TenantContext) -> String {
    let tenant_keys = tenant.to_fields();
    let pairs: Vec<String> = body
        .iter()
        .filter(|(key, value)| tenant_keys.get(*key) != Some(*value))
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect();

    if pairs.is_empty() {
        "no parameters".to_string()
    } else {
        pairs.join(", ")
    }
}
