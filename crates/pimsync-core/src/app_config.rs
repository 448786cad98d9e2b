use std::path::PathBuf;

/// Runtime configuration for a sync or export run, loaded from the
/// environment. Constructed once per run and passed by reference into every
/// component — no component reads ambient globals.
#[derive(Clone)]
pub struct AppConfig {
    pub pimcore_base_url: String,
    pub pimcore_endpoint: String,
    pub pimcore_api_key: String,
    /// Shopify shop domain, e.g. `example.myshopify.com`. Optional so that
    /// export-only runs don't need Shopify credentials.
    pub shopify_domain: Option<String>,
    pub shopify_token: Option<String>,
    pub shopify_api_version: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Fixed throttle delay after each product, in seconds.
    pub delay_between_products_secs: u64,
    /// Additional fixed delay after each image upload, in seconds.
    pub delay_after_image_secs: u64,
    pub export_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("pimcore_base_url", &self.pimcore_base_url)
            .field("pimcore_endpoint", &self.pimcore_endpoint)
            .field("pimcore_api_key", &"[redacted]")
            .field("shopify_domain", &self.shopify_domain)
            .field(
                "shopify_token",
                &self.shopify_token.as_ref().map(|_| "[redacted]"),
            )
            .field("shopify_api_version", &self.shopify_api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field(
                "delay_between_products_secs",
                &self.delay_between_products_secs,
            )
            .field("delay_after_image_secs", &self.delay_after_image_secs)
            .field("export_dir", &self.export_dir)
            .finish()
    }
}
