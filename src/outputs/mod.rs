//! Output generation: stage checkpoints and the JSON feed export.
//!
//! # Submodules
//!
//! - [`checkpoint`]: comma-separated checkpoint files written between the
//!   crawl, preprocess, and store stages (UTF-8 with byte-order mark, fixed
//!   header row, one row per article)
//! - [`json`]: JSON feed export for frontend consumption
//!
//! # Output layout
//!
//! ```text
//! output_dir/
//! ├── combined_crawled_articles.csv   # crawl stage checkpoint
//! ├── cleaned_nlp_news.csv            # preprocess stage checkpoint
//! └── news_data.json                  # feed export
//! ```

pub mod checkpoint;
pub mod json;

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then probes it with a throwaway file so
/// permission problems surface before any crawling starts.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;

    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
