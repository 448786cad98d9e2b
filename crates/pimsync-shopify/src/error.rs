use thiserror::Error;

/// Errors returned by the Shopify Admin client.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify asked us to back off: GraphQL `THROTTLED` code or HTTP 429.
    #[error("throttled by Shopify")]
    Throttled,

    /// Top-level GraphQL errors other than throttling.
    #[error("Shopify API error: {0}")]
    Api(String),

    /// A mutation returned `userErrors`. The handle-conflict case is
    /// reported separately as [`ShopifyError::HandleTaken`].
    #[error("Shopify rejected the mutation: {0}")]
    UserErrors(String),

    /// `productCreate` failed because the handle already exists. Triggers
    /// the lookup-and-update fallback, never surfaced to callers of
    /// `upsert_product`.
    #[error("product handle already taken")]
    HandleTaken,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from Shopify for {context}")]
    UnexpectedStatus { status: u16, context: String },

    /// The product exists but exposes no variants to update.
    #[error("product {product_id} has no variants")]
    MissingVariant { product_id: String },
}
