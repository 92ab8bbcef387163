//! Publish targets for the catalog and its card images.
//!
//! The pipeline is written against the [`CatalogStore`] capability so the
//! publish target is chosen exactly once at startup: DigitalOcean Spaces for
//! production runs, a static output directory for local ones.

pub mod local;
pub mod spaces;

pub use local::StaticStore;
pub use spaces::{SpacesConfig, SpacesStore};

use async_trait::async_trait;
use std::time::Duration;

use crate::catalog::CardRecord;
use crate::error::{Result, SyncError};

/// Sub-path under the publish root where card images live.
pub const IMG_SUBPATH: &str = "img";

/// Object name of the published catalog.
pub const CATALOG_FILE: &str = "cards.json";

pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
pub(crate) const IMAGE_USER_AGENT: &str = "riftbound_sync/1.0";

/// A publish target for the catalog and its images.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Idempotently ensures the variant image exists at its deterministic
    /// destination and returns `(public reference, newly uploaded)`.
    ///
    /// Never fails: an empty source URL yields an empty reference, and any
    /// download or store failure is logged and degrades to the source URL.
    /// The existence check always precedes the image download, so re-running
    /// the worker never re-fetches unchanged images.
    async fn publish_image(
        &self,
        source_url: &str,
        set_folder: &str,
        variant_code: &str,
    ) -> (String, bool);

    /// Writes the final catalog; returns the published location.
    async fn write_catalog(&self, cards: &[CardRecord]) -> Result<String>;

    /// Loads the previously published catalog, or `None` when it is missing
    /// or unreadable (logged, never fatal).
    async fn load_previous(&self) -> Option<Vec<CardRecord>>;
}

/// Storage sub-folder for a variant: the set id when known, otherwise the
/// portion of the variant code before its dash.
pub fn resolve_set_folder(set_id: &str, variant_code: &str) -> String {
    if !set_id.is_empty() {
        return set_id.to_string();
    }
    if !variant_code.is_empty() {
        return match variant_code.split_once('-') {
            Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
            _ => variant_code.to_string(),
        };
    }
    "unknown".to_string()
}

/// Relative image path under [`IMG_SUBPATH`] for one variant.
pub(crate) fn image_relative_path(set_folder: &str, variant_code: &str) -> String {
    let folder = set_folder.trim_matches('/');
    if folder.is_empty() {
        format!("{variant_code}.png")
    } else {
        format!("{folder}/{variant_code}.png")
    }
}

/// Downloads image bytes, returning them with the response content type.
pub(crate) async fn download_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, String)> {
    let response = client
        .get(url)
        .header("User-Agent", IMAGE_USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SyncError::HttpStatus(response.status()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("image/png")
        .to_string();

    Ok((response.bytes().await?.to_vec(), content_type))
}
