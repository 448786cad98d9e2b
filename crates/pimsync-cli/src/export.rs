//! Legacy TSV export: fetch, normalize, render, write one file.

use pimsync_core::legacy;
use pimsync_core::{normalize_record, AppConfig};

pub(crate) struct ExportArgs {
    pub prefix: Option<String>,
    pub max: u32,
    pub dry_run: bool,
}

pub(crate) async fn run_export(config: &AppConfig, args: &ExportArgs) -> anyhow::Result<()> {
    let client = crate::sync::build_pimcore_client(config)?;
    let records = client
        .fetch_products(args.prefix.as_deref(), args.max)
        .await?;

    let mut products = Vec::with_capacity(records.len());
    let mut skipped: usize = 0;
    for record in &records {
        match normalize_record(record) {
            Ok(product) => products.push(product),
            Err(e) => {
                tracing::warn!(error = %e, "skipping record — normalization failed");
                skipped += 1;
            }
        }
    }

    let document = legacy::render_tsv(&products);
    let filename = legacy::export_filename(args.prefix.as_deref(), chrono::Utc::now());
    let path = config.export_dir.join(&filename);

    if args.dry_run {
        tracing::info!(
            rows = products.len(),
            skipped,
            path = %path.display(),
            "dry-run: export not written"
        );
        return Ok(());
    }

    std::fs::create_dir_all(&config.export_dir)?;
    std::fs::write(&path, document)?;
    tracing::info!(
        rows = products.len(),
        skipped,
        path = %path.display(),
        "export written"
    );
    Ok(())
}
