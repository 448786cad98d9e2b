//! Wire types for the Shopify Admin GraphQL and REST APIs.
//!
//! Only the fields the sync reads are modeled; everything else in the
//! responses is ignored during deserialization.

use serde::Deserialize;

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One top-level GraphQL error. Throttling arrives here with
/// `extensions.code == "THROTTLED"` rather than as an HTTP status.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorExtensions {
    pub code: Option<String>,
}

impl GraphQlError {
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| code == "THROTTLED")
    }
}

/// One entry of a mutation payload's `userErrors` list.
#[derive(Debug, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Product node carrying the GraphQL global id (`gid://shopify/Product/N`).
#[derive(Debug, Deserialize)]
pub struct ProductNode {
    pub id: String,
}

/// Shared payload shape of `productCreate` and `productUpdate`.
#[derive(Debug, Deserialize)]
pub struct ProductMutationPayload {
    pub product: Option<ProductNode>,
    #[serde(default, rename = "userErrors")]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct ProductCreateData {
    #[serde(rename = "productCreate")]
    pub product_create: Option<ProductMutationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct ProductUpdateData {
    #[serde(rename = "productUpdate")]
    pub product_update: Option<ProductMutationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct ProductByHandleData {
    #[serde(rename = "productByHandle")]
    pub product_by_handle: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldsSetPayload {
    #[serde(default, rename = "userErrors")]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldsSetData {
    #[serde(rename = "metafieldsSet")]
    pub metafields_set: Option<MetafieldsSetPayload>,
}

/// REST `GET /products/{id}/variants.json` envelope.
#[derive(Debug, Deserialize)]
pub struct VariantsEnvelope {
    #[serde(default)]
    pub variants: Vec<RestVariant>,
}

/// One REST variant. Only the numeric id is read; the update body is built
/// from the normalized product, not from this record.
#[derive(Debug, Deserialize)]
pub struct RestVariant {
    pub id: u64,
}
