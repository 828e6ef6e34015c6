//! Configuration-driven resource adapter
//!
//! Every catalog domain exposes the same five procedures (list, find by id,
//! create, update, delete). A domain supplies a [`ResourceEndpoints`] table
//! and a row type; the adapter does the rest.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use storedesk_domain::{CallContext, FieldError, Result, RpcError};

use crate::rpc::shapes::{first_row, labeled_first, labeled_rows, rows};
use crate::rpc::{Endpoint, MutationReceipt, StoredProcedureClient};

/// Endpoints and payload rules for one resource.
#[derive(Debug, Clone)]
pub struct ResourceEndpoints {
    /// Singular resource name used in messages, e.g. `brand`
    pub name: &'static str,
    /// Collection read
    pub list: Endpoint,
    /// Label of the rows in a labeled list response, if any
    pub list_label: Option<&'static str>,
    /// Single-record read
    pub by_id: Endpoint,
    /// Label of the row in a labeled by-id response, if any
    pub by_id_label: Option<&'static str>,
    /// Create procedure
    pub create: Endpoint,
    /// Update procedure
    pub update: Endpoint,
    /// Delete procedure
    pub delete: Endpoint,
    /// Payload key carrying the record id, e.g. `brand_id`
    pub id_field: &'static str,
    /// Business fields that must be present and non-null on create
    pub required_on_create: &'static [&'static str],
}

/// Adapter over [`StoredProcedureClient`] for a single resource.
pub struct ResourceAdapter<R> {
    client: StoredProcedureClient,
    endpoints: ResourceEndpoints,
    _row: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceAdapter<R> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), endpoints: self.endpoints.clone(), _row: PhantomData }
    }
}

impl<R: DeserializeOwned> ResourceAdapter<R> {
    /// Adapter issuing calls through `client`.
    pub fn new(client: StoredProcedureClient, endpoints: ResourceEndpoints) -> Self {
        Self { client, endpoints, _row: PhantomData }
    }

    /// Endpoint table this adapter was built with.
    pub fn endpoints(&self) -> &ResourceEndpoints {
        &self.endpoints
    }

    /// List rows matching `filters`. A search that matches nothing is an
    /// empty list.
    pub async fn list<P>(&self, filters: &P) -> Result<Vec<R>>
    where
        P: Serialize + ?Sized,
    {
        let body = self.client.payload(filters)?;
        let label = self.endpoints.list_label;
        self.client
            .execute(
                &self.endpoints.list,
                body,
                |data| match label {
                    Some(label) => labeled_rows::<R>(label)(data),
                    None => rows::<R>(data),
                },
                CallContext::List,
            )
            .await
    }

    /// Look up one record. A missing record is `RpcError::NotFound`; an
    /// empty-but-valid response is `None`.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<R>> {
        let body = self.client.payload(&self.id_params(id))?;
        let label = self.endpoints.by_id_label;
        self.client
            .execute(
                &self.endpoints.by_id,
                body,
                |data| match label {
                    Some(label) => labeled_first::<R>(label)(data),
                    None => first_row::<R>(data),
                },
                CallContext::ById,
            )
            .await
    }

    /// Create a record. Fails with a validation error before any call if a
    /// required field is missing.
    pub async fn create<P>(&self, params: &P) -> Result<MutationReceipt>
    where
        P: Serialize + ?Sized,
    {
        let body = self.client.payload(params)?;
        self.validate_create(&body)?;
        self.client.mutate(&self.endpoints.create, body).await
    }

    /// Update record `id` with the given business fields.
    pub async fn update<P>(&self, id: i64, params: &P) -> Result<MutationReceipt>
    where
        P: Serialize + ?Sized,
    {
        let mut body = self.client.payload(params)?;
        body.insert(self.endpoints.id_field.to_string(), Value::from(id));
        self.client.mutate(&self.endpoints.update, body).await
    }

    /// Delete record `id`.
    pub async fn delete(&self, id: i64) -> Result<MutationReceipt> {
        let body = self.client.payload(&self.id_params(id))?;
        self.client.mutate(&self.endpoints.delete, body).await
    }

    fn id_params(&self, id: i64) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(self.endpoints.id_field.to_string(), Value::from(id));
        params
    }

    fn validate_create(&self, body: &Map<String, Value>) -> Result<()> {
        let fields: Vec<FieldError> = self
            .endpoints
            .required_on_create
            .iter()
            .filter(|field| body.get(**field).map_or(true, Value::is_null))
            .map(|field| FieldError { field: (*field).to_string(), message: "is required".into() })
            .collect();

        if fields.is_empty() {
            return Ok(());
        }

        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        Err(RpcError::Validation {
            message: format!("Missing required {} fields: {}", self.endpoints.name, names.join(", ")),
            fields,
        })
    }
}
