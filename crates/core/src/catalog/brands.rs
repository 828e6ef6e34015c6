//! Brands
//!
//! The brand procedures answer list queries with a labeled record
//! (`{"Brand find All": rows}`).

use serde::{Deserialize, Serialize};

use super::resource::{ResourceAdapter, ResourceEndpoints};
use crate::rpc::{Endpoint, StoredProcedureClient};

/// Label of the rows in a list response
pub const LIST_LABEL: &str = "Brand find All";
/// Label of the row in a by-id response
pub const BY_ID_LABEL: &str = "Brand find One";

/// A brand row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Primary key
    #[serde(alias = "brandId")]
    pub brand_id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Backend status flag (1 = active)
    #[serde(default)]
    pub status: Option<i64>,
}

/// Business parameters for creating or updating a brand
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrandInput {
    /// Required on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Backend status flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
}

/// Filters accepted by the brand list procedure
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrandFilter {
    /// Substring matched against the brand name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Only brands with this status flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
}

/// Brand operations over the generic resource adapter.
pub type BrandService = ResourceAdapter<Brand>;

/// Brand procedure paths and payload rules.
pub fn endpoints() -> ResourceEndpoints {
    ResourceEndpoints {
        name: "brand",
        list: Endpoint::read("/brands/find-all"),
        list_label: Some(LIST_LABEL),
        by_id: Endpoint::read("/brands/find-by-id"),
        by_id_label: Some(BY_ID_LABEL),
        create: Endpoint::write("/brands/create"),
        update: Endpoint::write("/brands/update"),
        delete: Endpoint::write("/brands/delete"),
        id_field: "brand_id",
        required_on_create: &["name"],
    }
}

/// Brand adapter sharing `client`.
pub fn service(client: StoredProcedureClient) -> BrandService {
    ResourceAdapter::new(client, endpoints())
}
