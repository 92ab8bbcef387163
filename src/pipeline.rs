//! End-to-end worker run: fetch, normalize, publish, diff, report.

use crate::catalog::{self, PrimaryRule, VariantRecord};
use crate::error::{Result, SyncError};
use crate::gallery;
use crate::normalize::{self, RawCard};
use crate::snapshot;
use crate::storage::{resolve_set_folder, CatalogStore};

/// Per-run image counters, advanced once per variant by the publish loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageStats {
    pub total_variants: usize,
    pub new_images: usize,
    pub missing_image_urls: usize,
}

/// Runs one full pipeline pass against the given publish target.
///
/// Only the page fetch, payload extraction and final catalog write can fail;
/// every per-variant problem is logged and substituted so a single bad record
/// never prevents publishing the rest of the catalog.
pub async fn run(store: &dyn CatalogStore, gallery_url: &str) -> Result<()> {
    let previous = store.load_previous().await;

    let client = reqwest::Client::new();
    log::info!("Pulling card gallery HTML from {gallery_url}");
    let html = gallery::fetch_html(&client, gallery_url).await?;

    log::info!("Parsing embedded page payload");
    let data = gallery::extract_page_data(&html)?;
    let items = gallery::card_items(&data).ok_or_else(|| {
        SyncError::SourceFormat("could not locate cards.items in page payload".to_string())
    })?;
    log::info!("Discovered {} card variants", items.len());

    let mut stats = ImageStats::default();
    let mut variants = Vec::with_capacity(items.len());
    for item in items {
        let Some(raw) = RawCard::from_value(item) else {
            continue;
        };
        variants.push(publish_variant(&raw, store, &mut stats).await);
    }

    let cards = catalog::assemble_cards(variants, PrimaryRule::SortOrder);
    let target = store.write_catalog(&cards).await?;
    log::info!("Catalog with {} cards published to {}", cards.len(), target);
    log_run_summary(cards.len(), &stats, &target);

    let report = snapshot::diff_catalogs(previous.as_deref(), &cards);
    snapshot::log_changes(&report);
    for line in snapshot::format_change_summary(&report, cards.len()).lines() {
        log::info!("{line}");
    }

    Ok(())
}

/// Normalizes one raw item and publishes its image through the store,
/// advancing the run counters.
async fn publish_variant(
    raw: &RawCard,
    store: &dyn CatalogStore,
    stats: &mut ImageStats,
) -> VariantRecord {
    let mut variant = normalize::variant_from_raw(raw);
    stats.total_variants += 1;

    let source_url = raw.image_url().unwrap_or_default();
    if source_url.is_empty() {
        stats.missing_image_urls += 1;
    } else {
        let folder = resolve_set_folder(&variant.set_id, &variant.variant_number);
        let (image, is_new) = store
            .publish_image(source_url, &folder, &variant.variant_number)
            .await;
        if is_new {
            stats.new_images += 1;
        }
        variant.image = image;
    }

    variant
}

fn log_run_summary(card_count: usize, stats: &ImageStats, output_target: &str) {
    log::info!(
        "Worker run complete: cards = {}, variant entries = {}, new images = {}, missing image urls = {}, output = {}",
        card_count,
        stats.total_variants,
        stats.new_images,
        stats.missing_image_urls,
        output_target
    );
}
