//! Products
//!
//! Product procedures return positional tuples (`[rows, [feedback], meta]`).
//! Pricing and stock rules live in the backend; only the wire shape is
//! modelled here.

use serde::{Deserialize, Serialize};
use storedesk_domain::{CallContext, Result, TimeoutTier};

use super::resource::{ResourceAdapter, ResourceEndpoints};
use crate::rpc::shapes::{first_row, rows};
use crate::rpc::{Endpoint, StoredProcedureClient};

/// A product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Primary key
    #[serde(alias = "productId")]
    pub product_id: i64,
    /// Display name
    pub name: String,
    /// Stock keeping unit
    #[serde(default)]
    pub sku: Option<String>,
    /// Owning brand
    #[serde(default, alias = "brandId")]
    pub brand_id: Option<i64>,
    /// Unit price
    #[serde(default)]
    pub price: Option<f64>,
}

/// Business parameters for creating or updating a product
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductInput {
    /// Required on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Required on create; unique per store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Owning brand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i64>,
    /// Unit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Filters accepted by the product list and export procedures
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductFilter {
    /// Substring matched against name or SKU
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Only products of this brand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i64>,
}

/// Product procedure paths and payload rules.
pub fn endpoints() -> ResourceEndpoints {
    ResourceEndpoints {
        name: "product",
        list: Endpoint::read("/products/find-all"),
        list_label: None,
        by_id: Endpoint::read("/products/find-by-id").with_tier(TimeoutTier::Short),
        by_id_label: None,
        create: Endpoint::write("/products/create"),
        update: Endpoint::write("/products/update"),
        delete: Endpoint::write("/products/delete"),
        id_field: "product_id",
        required_on_create: &["name", "sku"],
    }
}

/// Product adapter: the generic resource operations plus SKU lookup and the
/// catalog export.
#[derive(Clone)]
pub struct ProductService {
    client: StoredProcedureClient,
    resource: ResourceAdapter<Product>,
}

impl ProductService {
    /// Product adapter sharing `client`.
    pub fn new(client: StoredProcedureClient) -> Self {
        let resource = ResourceAdapter::new(client.clone(), endpoints());
        Self { client, resource }
    }

    /// Generic list/get/create/update/delete operations.
    pub fn resource(&self) -> &ResourceAdapter<Product> {
        &self.resource
    }

    /// Look up a product by SKU. `None` if no product carries it.
    pub async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        let body = self.client.payload(&serde_json::json!({ "sku": sku }))?;
        self.client
            .execute(
                &Endpoint::read("/products/find-by-sku").with_tier(TimeoutTier::Short),
                body,
                first_row::<Product>,
                CallContext::ById,
            )
            .await
    }

    /// Full catalog export; runs on the long-running tier.
    pub async fn export(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let body = self.client.payload(filter)?;
        self.client
            .execute(
                &Endpoint::read("/products/export").with_tier(TimeoutTier::LongRunning),
                body,
                rows::<Product>,
                CallContext::List,
            )
            .await
    }
}
