use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let pimcore_base_url = require("PIMSYNC_PIMCORE_BASE_URL")?;
    let pimcore_endpoint = require("PIMSYNC_PIMCORE_ENDPOINT")?;
    let pimcore_api_key = require("PIMSYNC_PIMCORE_API_KEY")?;

    let shopify_domain = lookup("PIMSYNC_SHOPIFY_DOMAIN").ok();
    let shopify_token = lookup("PIMSYNC_SHOPIFY_TOKEN").ok();
    let shopify_api_version = or_default("PIMSYNC_SHOPIFY_API_VERSION", "2024-07");

    let request_timeout_secs = parse_u64("PIMSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PIMSYNC_USER_AGENT", "pimsync/0.1 (catalog-sync)");
    let max_retries = parse_u32("PIMSYNC_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("PIMSYNC_RETRY_BACKOFF_BASE_SECS", "5")?;
    let delay_between_products_secs = parse_u64("PIMSYNC_DELAY_BETWEEN_PRODUCTS_SECS", "2")?;
    let delay_after_image_secs = parse_u64("PIMSYNC_DELAY_AFTER_IMAGE_SECS", "3")?;
    let export_dir = PathBuf::from(or_default("PIMSYNC_EXPORT_DIR", "./export"));

    Ok(AppConfig {
        pimcore_base_url,
        pimcore_endpoint,
        pimcore_api_key,
        shopify_domain,
        shopify_token,
        shopify_api_version,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        delay_between_products_secs,
        delay_after_image_secs,
        export_dir,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid defaults.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("PIMSYNC_PIMCORE_BASE_URL", "https://pim.example.com");
        m.insert("PIMSYNC_PIMCORE_ENDPOINT", "products");
        m.insert("PIMSYNC_PIMCORE_API_KEY", "test-key");
        m
    }

    #[test]
    fn fails_without_pimcore_base_url() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PIMSYNC_PIMCORE_BASE_URL"),
            "expected MissingEnvVar(PIMSYNC_PIMCORE_BASE_URL), got: {result:?}"
        );
    }

    #[test]
    fn fails_without_api_key() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("PIMSYNC_PIMCORE_BASE_URL", "https://pim.example.com");
        map.insert("PIMSYNC_PIMCORE_ENDPOINT", "products");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PIMSYNC_PIMCORE_API_KEY"),
            "expected MissingEnvVar(PIMSYNC_PIMCORE_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn succeeds_with_required_vars_and_applies_defaults() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.pimcore_base_url, "https://pim.example.com");
        assert!(cfg.shopify_domain.is_none());
        assert!(cfg.shopify_token.is_none());
        assert_eq!(cfg.shopify_api_version, "2024-07");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "pimsync/0.1 (catalog-sync)");
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.retry_backoff_base_secs, 5);
        assert_eq!(cfg.delay_between_products_secs, 2);
        assert_eq!(cfg.delay_after_image_secs, 3);
        assert_eq!(cfg.export_dir, PathBuf::from("./export"));
    }

    #[test]
    fn shopify_credentials_are_picked_up_when_present() {
        let mut map = full_env();
        map.insert("PIMSYNC_SHOPIFY_DOMAIN", "example.myshopify.com");
        map.insert("PIMSYNC_SHOPIFY_TOKEN", "shpat_test");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.shopify_domain.as_deref(), Some("example.myshopify.com"));
        assert_eq!(cfg.shopify_token.as_deref(), Some("shpat_test"));
    }

    #[test]
    fn delay_overrides_are_applied() {
        let mut map = full_env();
        map.insert("PIMSYNC_DELAY_BETWEEN_PRODUCTS_SECS", "0");
        map.insert("PIMSYNC_DELAY_AFTER_IMAGE_SECS", "10");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.delay_between_products_secs, 0);
        assert_eq!(cfg.delay_after_image_secs, 10);
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let mut map = full_env();
        map.insert("PIMSYNC_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PIMSYNC_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(PIMSYNC_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn invalid_max_retries_is_rejected() {
        let mut map = full_env();
        map.insert("PIMSYNC_MAX_RETRIES", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PIMSYNC_MAX_RETRIES"),
            "expected InvalidEnvVar(PIMSYNC_MAX_RETRIES), got: {result:?}"
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut map = full_env();
        map.insert("PIMSYNC_SHOPIFY_TOKEN", "shpat_secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("test-key"));
        assert!(!debug.contains("shpat_secret"));
        assert!(debug.contains("[redacted]"));
    }
}
