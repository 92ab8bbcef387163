//! Riftbound card catalog worker
//!
//! Scrapes the card gallery, publishes the normalized catalog with images and
//! logs a change report against the previous run.

use clap::{Parser, ValueEnum};
use riftbound_sync::storage::{CatalogStore, SpacesConfig, SpacesStore, StaticStore};
use riftbound_sync::{gallery, pipeline};
use std::path::PathBuf;

/// Riftbound card scraper worker
#[derive(Parser, Debug)]
#[command(name = "riftbound_sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Where to publish card data (Spaces or a static output directory)
    #[arg(long, value_enum, default_value = "spaces")]
    mode: Mode,

    /// Root directory for static output mode
    #[arg(long, default_value_t = default_output_dir())]
    output_dir: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Spaces,
    Static,
}

/// Returns the default static output root: `WORKER_OUTPUT_DIR` or `/output`.
fn default_output_dir() -> String {
    std::env::var("WORKER_OUTPUT_DIR").unwrap_or_else(|_| "/output".to_string())
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!(
        "Worker starting: mode = {:?}, output_dir = {}",
        args.mode,
        args.output_dir
    );

    let store: Box<dyn CatalogStore> = match args.mode {
        Mode::Spaces => match SpacesConfig::from_env() {
            Ok(config) => Box::new(SpacesStore::new(config)),
            Err(e) => {
                log::error!("Invalid Spaces configuration: {}", e);
                std::process::exit(1);
            }
        },
        Mode::Static => Box::new(StaticStore::new(PathBuf::from(&args.output_dir))),
    };

    if let Err(e) = pipeline::run(store.as_ref(), gallery::GALLERY_URL).await {
        log::error!("Worker failed: {}", e);
        std::process::exit(1);
    }
}
