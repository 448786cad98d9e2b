//! Pimcore GraphQL response envelopes.
//!
//! Product nodes are deliberately left as raw JSON maps: the PIM's field set
//! is heterogeneous and partially null, and all coercion belongs to the
//! normalizer in `pimsync-core`. Only the envelope structure is typed here.

use serde::Deserialize;

/// A raw product node exactly as Pimcore returned it: PascalCase keys,
/// possible nulls, possible nested references.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `data` payload of the product listing query.
#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(rename = "getProdM06Listing")]
    pub listing: Option<Listing>,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub edges: Vec<ListingEdge>,
}

#[derive(Debug, Deserialize)]
pub struct ListingEdge {
    pub node: RawRecord,
}

/// `data` payload of the asset query.
#[derive(Debug, Deserialize)]
pub struct AssetData {
    #[serde(rename = "getAsset")]
    pub asset: Option<Asset>,
}

#[derive(Debug, Deserialize)]
pub struct Asset {
    /// Base64-encoded binary payload.
    pub data: Option<String>,
}
