//! Sequential sync engine.
//!
//! One product at a time: normalize, map, upsert, variant, metafields,
//! image, then a fixed throttle delay before the next product. A product
//! that fails normalization or a Shopify write is logged and skipped; the
//! batch keeps going. Only the initial fetch is fatal to the run.

use std::time::Duration;

use pimsync_core::{build_product_push, normalize_record, AppConfig, NormalizedProduct};
use pimsync_pimcore::PimcoreClient;
use pimsync_shopify::{ShopifyClient, UpsertOutcome};

pub(crate) struct SyncArgs {
    pub prefix: Option<String>,
    pub max: u32,
    pub dry_run: bool,
}

pub(crate) fn build_pimcore_client(config: &AppConfig) -> anyhow::Result<PimcoreClient> {
    Ok(PimcoreClient::new(
        &config.pimcore_base_url,
        &config.pimcore_endpoint,
        &config.pimcore_api_key,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?)
}

fn build_shopify_client(config: &AppConfig) -> anyhow::Result<ShopifyClient> {
    let domain = config
        .shopify_domain
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("PIMSYNC_SHOPIFY_DOMAIN is required for sync"))?;
    let token = config
        .shopify_token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("PIMSYNC_SHOPIFY_TOKEN is required for sync"))?;
    Ok(ShopifyClient::new(
        domain,
        token,
        &config.shopify_api_version,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?)
}

pub(crate) async fn run_sync(config: &AppConfig, args: &SyncArgs) -> anyhow::Result<()> {
    let pimcore = build_pimcore_client(config)?;
    // Dry runs never touch Shopify, so they don't need its credentials.
    let shopify = if args.dry_run {
        None
    } else {
        Some(build_shopify_client(config)?)
    };

    let records = pimcore
        .fetch_products(args.prefix.as_deref(), args.max)
        .await?;
    let total = records.len();
    if total == 0 {
        tracing::info!("no products matched; nothing to sync");
        return Ok(());
    }

    let mut synced: usize = 0;
    let mut failed: usize = 0;

    for (index, record) in records.iter().enumerate() {
        let position = index + 1;

        let product = match normalize_record(record) {
            Ok(product) => product,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "[{position}/{total}] skipping record — normalization failed"
                );
                failed += 1;
                continue;
            }
        };

        match sync_product(&pimcore, shopify.as_ref(), config, &product).await {
            Ok(outcome) => {
                tracing::info!("[{position}/{total}] {} ok ({outcome})", product.sku);
                synced += 1;
            }
            Err(e) => {
                tracing::error!(
                    error = format!("{e:#}"),
                    "[{position}/{total}] {} failed",
                    product.sku
                );
                failed += 1;
            }
        }

        if !args.dry_run && position < total {
            tokio::time::sleep(Duration::from_secs(config.delay_between_products_secs)).await;
        }
    }

    tracing::info!(synced, failed, total, "sync finished");
    if synced == 0 && failed > 0 {
        anyhow::bail!("all {failed} products failed to sync");
    }
    Ok(())
}

/// Runs the full write sequence for one product. `shopify` is `None` on dry
/// runs, in which case the transform still happens but nothing is written.
async fn sync_product(
    pimcore: &PimcoreClient,
    shopify: Option<&ShopifyClient>,
    config: &AppConfig,
    product: &NormalizedProduct,
) -> anyhow::Result<&'static str> {
    let push = build_product_push(product);

    match product.selected_price() {
        Some((price, source)) => {
            tracing::debug!(sku = %product.sku, price = %price, source = %source, "selected price");
        }
        None => {
            tracing::debug!(sku = %product.sku, "no positive price; price assignment omitted");
        }
    }
    tracing::debug!(
        sku = %product.sku,
        has_image = product.has_image(),
        handle = %push.product.handle,
        "mapped product"
    );

    let Some(shopify) = shopify else {
        return Ok("dry-run");
    };

    let outcome = shopify.upsert_product(&push).await?;
    let product_id = outcome.product_id();
    shopify.sync_variant(product_id, &push.variant).await?;
    shopify.set_metafields(product_id, &push.metafields).await?;

    if let Some(asset_id) = &product.image_asset_id {
        upload_image_best_effort(pimcore, shopify, config, product, product_id, asset_id).await;
    }

    Ok(match outcome {
        UpsertOutcome::Created(_) => "created",
        UpsertOutcome::Updated(_) => "updated",
    })
}

/// Fetches the product's primary image and attaches it. Any failure here
/// degrades the product to "no image" — the product itself stays synced.
async fn upload_image_best_effort(
    pimcore: &PimcoreClient,
    shopify: &ShopifyClient,
    config: &AppConfig,
    product: &NormalizedProduct,
    product_id: &str,
    asset_id: &str,
) {
    let image = match pimcore.fetch_asset(asset_id).await {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!(
                sku = %product.sku,
                asset_id,
                error = %e,
                "image fetch failed; continuing without image"
            );
            return;
        }
    };

    let filename = format!("{}.jpg", product.handle());
    match shopify.upload_image(product_id, &image, &filename).await {
        Ok(()) => {
            tracing::debug!(sku = %product.sku, asset_id, "image uploaded");
            tokio::time::sleep(Duration::from_secs(config.delay_after_image_secs)).await;
        }
        Err(e) => {
            tracing::warn!(
                sku = %product.sku,
                asset_id,
                error = %e,
                "image upload failed; continuing without image"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_shopify() -> AppConfig {
        AppConfig {
            pimcore_base_url: "https://pim.example.com".to_string(),
            pimcore_endpoint: "products".to_string(),
            pimcore_api_key: "key".to_string(),
            shopify_domain: None,
            shopify_token: None,
            shopify_api_version: "2024-07".to_string(),
            request_timeout_secs: 30,
            user_agent: "pimsync/test".to_string(),
            max_retries: 0,
            retry_backoff_base_secs: 0,
            delay_between_products_secs: 0,
            delay_after_image_secs: 0,
            export_dir: "./export".into(),
        }
    }

    #[test]
    fn shopify_client_requires_domain() {
        let err = build_shopify_client(&config_without_shopify()).unwrap_err();
        assert!(err.to_string().contains("PIMSYNC_SHOPIFY_DOMAIN"));
    }

    #[test]
    fn shopify_client_requires_token() {
        let mut config = config_without_shopify();
        config.shopify_domain = Some("example.myshopify.com".to_string());
        let err = build_shopify_client(&config).unwrap_err();
        assert!(err.to_string().contains("PIMSYNC_SHOPIFY_TOKEN"));
    }

    #[test]
    fn pimcore_client_builds_from_config() {
        assert!(build_pimcore_client(&config_without_shopify()).is_ok());
    }
}
