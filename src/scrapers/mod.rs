//! Article sources for the crawl stage.
//!
//! Each source follows the same two-phase pattern:
//!
//! 1. **Indexing**: discover article URLs, either from a search feed or from
//!    a section homepage
//! 2. **Fetching**: download and extract article content from each URL
//!
//! # Sources
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Google News search | [`google_news`] | RSS search feed, last-7-days window |
//! | Al Jazeera | [`aljazeera`] | Section homepage scraping |
//!
//! Fetching is shared: both sources hand their URLs to
//! [`crate::extract::fetch_raw_article`], which isolates per-URL failures as
//! error placeholders so a bad page never fails the batch.

pub mod aljazeera;
pub mod google_news;

use crate::extract::fetch_raw_article;
use crate::models::RawArticle;
use futures::stream::{self, StreamExt};
use tracing::{info, instrument};

/// How many article downloads run at once.
const FETCH_CONCURRENCY: usize = 4;

/// Fetch all URLs, preserving input order in the returned batch.
#[instrument(level = "info", skip_all, fields(urls = urls.len()))]
pub async fn fetch_articles(client: &reqwest::Client, urls: Vec<String>) -> Vec<RawArticle> {
    let articles: Vec<RawArticle> = stream::iter(urls)
        .map(|url| {
            let client = client.clone();
            async move { fetch_raw_article(&client, &url).await }
        })
        .buffered(FETCH_CONCURRENCY)
        .collect()
        .await;

    info!(count = articles.len(), "fetched article contents");
    articles
}
