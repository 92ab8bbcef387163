//! Static filesystem publish target.
//!
//! Mirrors the Spaces layout under a local output root: images under
//! `<root>/img/<set folder>/<code>.png` and the catalog at `<root>/cards.json`.
//! Image references are site-relative paths so the output directory can be
//! served as-is.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{download_image, image_relative_path, CatalogStore, CATALOG_FILE, IMG_SUBPATH};
use crate::catalog::CardRecord;
use crate::error::Result;

/// Publishes the catalog and images into a static output directory.
pub struct StaticStore {
    output_root: PathBuf,
    http: reqwest::Client,
}

impl StaticStore {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            http: reqwest::Client::new(),
        }
    }

    fn catalog_path(&self) -> PathBuf {
        self.output_root.join(CATALOG_FILE)
    }

    fn image_destination(&self, relative: &str) -> PathBuf {
        let mut destination = self.output_root.join(IMG_SUBPATH);
        for part in relative.split('/') {
            destination.push(part);
        }
        destination
    }
}

#[async_trait]
impl CatalogStore for StaticStore {
    async fn publish_image(
        &self,
        source_url: &str,
        set_folder: &str,
        variant_code: &str,
    ) -> (String, bool) {
        if source_url.is_empty() {
            return (String::new(), false);
        }

        let relative = image_relative_path(set_folder, variant_code);
        let destination = self.image_destination(&relative);
        let public_ref = format!("/{IMG_SUBPATH}/{relative}");

        // Existence check before any download keeps reruns cheap.
        if destination.exists() {
            return (public_ref, false);
        }

        if let Some(parent) = destination.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!(
                    "Failed to create image directory for {}: {}",
                    variant_code,
                    e
                );
                return (source_url.to_string(), false);
            }
        }

        let bytes = match download_image(&self.http, source_url).await {
            Ok((bytes, _)) => bytes,
            Err(e) => {
                log::warn!(
                    "Failed to download image for variant {}: {}",
                    variant_code,
                    e
                );
                return (source_url.to_string(), false);
            }
        };

        if let Err(e) = std::fs::write(&destination, &bytes) {
            log::warn!("Failed to store image for variant {}: {}", variant_code, e);
            return (source_url.to_string(), false);
        }

        (public_ref, true)
    }

    async fn write_catalog(&self, cards: &[CardRecord]) -> Result<String> {
        std::fs::create_dir_all(&self.output_root)?;
        let path = self.catalog_path();
        let json = serde_json::to_string(cards)?;
        std::fs::write(&path, json)?;
        Ok(path.display().to_string())
    }

    async fn load_previous(&self) -> Option<Vec<CardRecord>> {
        load_catalog_file(&self.catalog_path())
    }
}

fn load_catalog_file(path: &Path) -> Option<Vec<CardRecord>> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Failed to read previous catalog {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(cards) => Some(cards),
        Err(e) => {
            log::warn!(
                "Failed to parse previous catalog {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}
