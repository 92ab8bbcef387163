//! Riftbound card catalog worker
//!
//! Scrapes the official Riftbound card gallery, normalizes the per-variant
//! records into one entry per card, publishes card images and the catalog
//! JSON to DigitalOcean Spaces or a static output directory, and reports what
//! changed since the previous run.

pub mod catalog;
pub mod error;
pub mod gallery;
pub mod normalize;
pub mod pipeline;
pub mod snapshot;
pub mod storage;

pub use catalog::{CardRecord, PrimaryRule, VariantRecord};
pub use error::{Result, SyncError};
pub use pipeline::ImageStats;
pub use snapshot::ChangeReport;
pub use storage::{CatalogStore, SpacesConfig, SpacesStore, StaticStore};
