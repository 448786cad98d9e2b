//! HTTP client for the Pimcore GraphQL webservice.
//!
//! Wraps `reqwest` with Pimcore-specific error handling, query-string API
//! key auth, and typed envelope deserialization. Product nodes come back as
//! raw JSON maps; normalization lives in `pimsync-core`.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::PimcoreError;
use crate::retry::retry_with_backoff;
use crate::types::{AssetData, GraphQlResponse, ListingData, RawRecord};

/// Field set requested by every listing variant. All three query modes
/// (filtered, unfiltered, introspection) use this one query so their records
/// stay interchangeable for the normalizer.
const LISTING_QUERY: &str = "\
query($limit: Int, $filter: String) {
  getProdM06Listing(first: $limit, filter: $filter) {
    edges { node { id sku upc WebPrice MAP Retail BrandName Model VendorPartNumber \
PartPrefix Description_Short Description_Medium Specifications_WYSIWYG ImagePrimary { id } } }
  }
}";

const ASSET_QUERY: &str = "query($id: Int) { getAsset(id: $id) { data } }";

/// Client for the Pimcore GraphQL webservice.
///
/// Manages the HTTP client, endpoint URL, and API key. Transient errors
/// (429, network failures) are retried with exponential backoff up to
/// `max_retries` additional attempts.
pub struct PimcoreClient {
    client: Client,
    api_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PimcoreClient {
    /// Creates a new client for `{base_url}/pimcore-graphql-webservices/{endpoint}`.
    ///
    /// Point `base_url` at a mock server for tests.
    ///
    /// # Errors
    ///
    /// Returns [`PimcoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        endpoint: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, PimcoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let api_url = format!(
            "{}/pimcore-graphql-webservices/{endpoint}?apikey={api_key}",
            base_url.trim_end_matches('/'),
        );

        Ok(Self {
            client,
            api_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches up to `limit` raw product records.
    ///
    /// When `prefix` is `Some`, the listing is filtered by **exact string
    /// equality** on the `PartPrefix` field — Pimcore's filter object
    /// `{"PartPrefix":"<value>"}` carries no substring semantics, and none
    /// may be introduced here: a record whose prefix merely contains the
    /// value must not match. When `prefix` is `None`, all records are
    /// returned up to `limit`.
    ///
    /// # Errors
    ///
    /// - [`PimcoreError::Api`] if the GraphQL response carries errors.
    /// - [`PimcoreError::Http`] on network failure after retries.
    /// - [`PimcoreError::RateLimited`] on HTTP 429 after retries.
    /// - [`PimcoreError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`PimcoreError::Deserialize`] if the envelope does not parse.
    pub async fn fetch_products(
        &self,
        prefix: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RawRecord>, PimcoreError> {
        let variables = serde_json::json!({
            "limit": limit,
            "filter": prefix.map(part_prefix_filter),
        });

        let context = match prefix {
            Some(p) => format!("product listing (prefix={p})"),
            None => "product listing (unfiltered)".to_string(),
        };

        let data: ListingData = self.execute(LISTING_QUERY, variables, &context).await?;
        let edges = data.listing.map(|l| l.edges).unwrap_or_default();
        Ok(edges.into_iter().map(|edge| edge.node).collect())
    }

    /// Schema-discovery mode: the first `limit` records, unfiltered, with
    /// the complete listing field set. Identical to an unfiltered
    /// [`Self::fetch_products`] by construction — both run the same query.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_products`].
    pub async fn introspect(&self, limit: u32) -> Result<Vec<RawRecord>, PimcoreError> {
        self.fetch_products(None, limit).await
    }

    /// Fetches the binary payload of an asset by id.
    ///
    /// The API embeds the payload as base64 text; this method decodes it.
    ///
    /// # Errors
    ///
    /// - [`PimcoreError::InvalidAssetId`] if `asset_id` is not an integer id.
    /// - [`PimcoreError::AssetMissing`] if the asset does not exist or has
    ///   no payload.
    /// - [`PimcoreError::AssetDecode`] if the payload is not valid base64.
    /// - Plus the transport errors of [`Self::fetch_products`].
    pub async fn fetch_asset(&self, asset_id: &str) -> Result<Vec<u8>, PimcoreError> {
        let id: i64 = asset_id
            .parse()
            .map_err(|_| PimcoreError::InvalidAssetId {
                asset_id: asset_id.to_string(),
            })?;

        let context = format!("asset {asset_id}");
        let data: AssetData = self
            .execute(ASSET_QUERY, serde_json::json!({ "id": id }), &context)
            .await?;

        let encoded = data
            .asset
            .and_then(|a| a.data)
            .ok_or_else(|| PimcoreError::AssetMissing {
                asset_id: asset_id.to_string(),
            })?;

        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|source| PimcoreError::AssetDecode {
                asset_id: asset_id.to_string(),
                source,
            })
    }

    /// Posts one GraphQL request with retry on transient failures, asserts
    /// a 2xx status, and unwraps the response envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
        context: &str,
    ) -> Result<T, PimcoreError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let variables = variables.clone();
            let context = context.to_string();
            async move {
                let payload = serde_json::json!({ "query": query, "variables": variables });
                let response = self.client.post(&self.api_url).json(&payload).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(PimcoreError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(PimcoreError::UnexpectedStatus {
                        status: status.as_u16(),
                    });
                }

                let body = response.text().await?;
                let envelope: GraphQlResponse<T> =
                    serde_json::from_str(&body).map_err(|e| PimcoreError::Deserialize {
                        context: context.clone(),
                        source: e,
                    })?;

                if !envelope.errors.is_empty() {
                    let messages: Vec<String> =
                        envelope.errors.into_iter().map(|e| e.message).collect();
                    return Err(PimcoreError::Api(messages.join("; ")));
                }

                envelope
                    .data
                    .ok_or_else(|| PimcoreError::Api(format!("no data in response for {context}")))
            }
        })
        .await
    }
}

/// Builds the Pimcore listing filter for exact `PartPrefix` equality.
///
/// Serialized through `serde_json` so prefix values containing quotes or
/// backslashes stay intact.
fn part_prefix_filter(prefix: &str) -> String {
    serde_json::json!({ "PartPrefix": prefix }).to_string()
}
