use thiserror::Error;

/// Errors returned by the Pimcore GraphQL client.
#[derive(Debug, Error)]
pub enum PimcoreError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The GraphQL endpoint returned entries in its `errors` array.
    #[error("Pimcore API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Pimcore (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from Pimcore")]
    UnexpectedStatus { status: u16 },

    /// The asset id from the product record is not a Pimcore integer id.
    #[error("invalid asset id \"{asset_id}\"")]
    InvalidAssetId { asset_id: String },

    /// `getAsset` returned no asset or an asset without data.
    #[error("asset {asset_id} not found or has no data")]
    AssetMissing { asset_id: String },

    /// The embedded asset payload is not valid base64.
    #[error("asset {asset_id} payload is not valid base64: {source}")]
    AssetDecode {
        asset_id: String,
        #[source]
        source: base64::DecodeError,
    },
}
