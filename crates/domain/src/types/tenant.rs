//! Tenant context and request payload construction

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, RpcError};

/// Identifiers that scope a request to a business/account context.
///
/// Every field is optional; unset fields are omitted from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantContext {
    /// Application id
    pub application_id: Option<i64>,
    /// Client id
    pub client_id: Option<i64>,
    /// Store id
    pub store_id: Option<i64>,
    /// Organization id
    pub organization_id: Option<i64>,
    /// Acting user id
    pub user_id: Option<i64>,
    /// Person record of the acting user
    pub person_id: Option<i64>,
}

impl TenantContext {
    /// Set `application_id`.
    pub fn with_application(mut self, id: i64) -> Self {
        self.application_id = Some(id);
        self
    }

    /// Set `client_id`.
    pub fn with_client(mut self, id: i64) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Set `store_id`.
    pub fn with_store(mut self, id: i64) -> Self {
        self.store_id = Some(id);
        self
    }

    /// Set `organization_id`.
    pub fn with_organization(mut self, id: i64) -> Self {
        self.organization_id = Some(id);
        self
    }

    /// Set `user_id`.
    pub fn with_user(mut self, id: i64) -> Self {
        self.user_id = Some(id);
        self
    }

    /// Set `person_id`.
    pub fn with_person(mut self, id: i64) -> Self {
        self.person_id = Some(id);
        self
    }

    /// Known tenant fields as snake_case payload entries.
    pub fn to_fields(&self) -> Map<String, Value> {
        [
            ("application_id", self.application_id),
            ("client_id", self.client_id),
            ("store_id", self.store_id),
            ("organization_id", self.organization_id),
            ("user_id", self.user_id),
            ("person_id", self.person_id),
        ]
        .into_iter()
        .filter_map(|(key, id)| id.map(|id| (key.to_string(), Value::from(id))))
        .collect()
    }

    /// Merge tenant fields under the given business parameters.
    ///
    /// Tenant fields go in first, so a business parameter with the same key
    /// always wins.
    pub fn merge(&self, business: Map<String, Value>) -> Map<String, Value> {
        let mut payload = self.to_fields();
        payload.extend(business);
        payload
    }
}

/// Build a request payload from tenant context and serializable parameters.
///
/// `params` must serialize to a JSON object (or `null`, meaning no business
/// parameters).
pub fn build_payload<P>(tenant: &TenantContext, params: &P) -> Result<Map<String, Value>>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params)
        .map_err(|e| RpcError::validation(format!("Failed to serialize parameters: {e}")))?;

    match value {
        Value::Object(business) => Ok(tenant.merge(business)),
        Value::Null => Ok(tenant.to_fields()),
        other => Err(RpcError::validation(format!(
            "Request parameters must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merges_tenant_before_business_params() {
        let tenant = TenantContext::default().with_store(1);
        let payload = build_payload(&tenant, &json!({ "name": "x" })).unwrap();
        assert_eq!(Value::Object(payload), json!({ "store_id": 1, "name": "x" }));
    }

    #[test]
    fn business_params_are_never_overwritten() {
        let tenant = TenantContext::default().with_store(1).with_user(9);
        let payload = build_payload(&tenant, &json!({ "store_id": 42, "name": "x" })).unwrap();
        assert_eq!(payload["store_id"], 42);
        assert_eq!(payload["user_id"], 9);
    }

    #[test]
    fn unset_tenant_fields_are_omitted() {
        let payload = TenantContext::default().with_person(3).to_fields();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["person_id"], 3);
    }

    #[test]
    fn rejects_non_object_params() {
        let err = build_payload(&TenantContext::default(), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, RpcError::Validation { .. }));
        assert!(err.message().contains("array"));
    }

    #[test]
    fn null_params_yield_tenant_only_payload() {
        let tenant = TenantContext::default().with_client(5);
        let payload = build_payload(&tenant, &Value::Null).unwrap();
        assert_eq!(Value::Object(payload), json!({ "client_id": 5 }));
    }
}
