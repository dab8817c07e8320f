//! JSON feed export for frontend consumption.
//!
//! Serializes a cleaned batch into the flat item list the map frontend
//! reads: stable per-run ids, display date, headline, link, snippet, and the
//! resolved country code as `location`.

use crate::models::CleanedArticle;
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// One feed entry.
#[derive(Debug, Serialize, PartialEq)]
pub struct FeedItem {
    /// Stable id within one export, derived from batch position.
    pub id: String,
    /// Display date in `YYYY-MM-DD` form, empty when unknown.
    pub time: String,
    pub title: String,
    pub link: String,
    /// The bounded body snippet.
    pub description: String,
    /// ISO alpha-2 country code, empty when unresolved.
    pub location: String,
}

/// Map a cleaned batch to feed entries, preserving batch order.
pub fn feed_items(articles: &[CleanedArticle]) -> Vec<FeedItem> {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| FeedItem {
            id: format!("crawled_news_{i}"),
            time: article.published_date.clone().unwrap_or_default(),
            title: article.title.clone(),
            link: article.url.clone(),
            description: article.body_snippet.clone(),
            location: article.country_code.clone(),
        })
        .collect()
}

/// Write the feed export file.
#[instrument(level = "info", skip_all, fields(%path, count = articles.len()))]
pub async fn write_feed(path: &str, articles: &[CleanedArticle]) -> Result<(), Box<dyn Error>> {
    let items = feed_items(articles);
    let json = serde_json::to_string_pretty(&items)?;
    fs::write(path, json).await?;
    info!("wrote feed export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_items_map_fields_and_ids() {
        let articles = vec![
            CleanedArticle {
                title: "First".to_string(),
                published_date: Some("2025-05-06".to_string()),
                url: "http://x/1".to_string(),
                body_snippet: "snippet one".to_string(),
                relevance_score: 4.0,
                image_url: String::new(),
                country_code: "UA".to_string(),
                full_body: String::new(),
            },
            CleanedArticle {
                title: "Second".to_string(),
                published_date: None,
                url: "http://x/2".to_string(),
                body_snippet: "snippet two".to_string(),
                relevance_score: 2.5,
                image_url: String::new(),
                country_code: String::new(),
                full_body: String::new(),
            },
        ];

        let items = feed_items(&articles);
        assert_eq!(items[0].id, "crawled_news_0");
        assert_eq!(items[0].time, "2025-05-06");
        assert_eq!(items[0].location, "UA");
        assert_eq!(items[1].id, "crawled_news_1");
        // Unknown dates export as empty strings, not nulls.
        assert_eq!(items[1].time, "");
    }

    #[test]
    fn test_feed_serializes_expected_keys() {
        let items = feed_items(&[]);
        assert!(items.is_empty());

        let item = FeedItem {
            id: "crawled_news_0".to_string(),
            time: "2025-05-06".to_string(),
            title: "t".to_string(),
            link: "l".to_string(),
            description: "d".to_string(),
            location: "UA".to_string(),
        };
        let json = serde_json::to_string(&item).unwrap();
        for key in ["\"id\"", "\"time\"", "\"title\"", "\"link\"", "\"description\"", "\"location\""] {
            assert!(json.contains(key));
        }
    }
}
