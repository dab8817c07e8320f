//! Read API for the stored news feed.
//!
//! A single endpoint, `GET /news`, serving filtered and paginated articles
//! from the datastore:
//!
//! ```text
//! GET /news?page=1&limit=10&date=2025-05-06&keyword=ceasefire&country_iso=UA
//! ```
//!
//! The response envelope is `{news, total_count, page, per_page}`, sorted by
//! relevance score descending then publication date descending (nulls last).
//! A datastore failure produces a generic 500 JSON error body; no
//! authentication is performed.

use crate::store::{BoxError, NewsPage, NewsQuery, StoredArticle, SupabaseStore};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_PER_PAGE: u32 = 10;
const MAX_PER_PAGE: u32 = 100;

/// Raw query parameters of `GET /news`.
#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub date: Option<String>,
    pub keyword: Option<String>,
    pub country_iso: Option<String>,
}

/// One article as served to the frontend.
#[derive(Debug, Serialize)]
struct FeedNewsItem {
    id: Option<serde_json::Value>,
    /// Display date, `YYYY-MM-DD`, or `"Date N/A"` when unknown.
    time: String,
    title: String,
    link: String,
    description: String,
    relevance_score: f64,
    image_url: String,
    location: String,
}

#[derive(Debug, Serialize)]
struct FeedPage {
    news: Vec<FeedNewsItem>,
    total_count: u64,
    page: u32,
    per_page: u32,
}

fn to_query(params: NewsParams) -> NewsQuery {
    NewsQuery {
        page: params.page.unwrap_or(1).max(1),
        per_page: params.limit.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        date: params.date,
        keyword: params.keyword,
        country_iso: params.country_iso,
    }
}

impl From<StoredArticle> for FeedNewsItem {
    fn from(row: StoredArticle) -> Self {
        let time = row
            .published_date
            .as_deref()
            .filter(|d| d.len() >= 10)
            .map(|d| d[..10].to_string())
            .unwrap_or_else(|| "Date N/A".to_string());

        Self {
            id: row.id,
            time,
            title: row.title.unwrap_or_else(|| "Untitled News".to_string()),
            link: row.url.unwrap_or_else(|| "#".to_string()),
            description: row
                .body
                .unwrap_or_else(|| "No description available.".to_string()),
            relevance_score: row.relevance_score.unwrap_or(0.0),
            image_url: row.image_url.unwrap_or_default(),
            location: row.country_iso_code.unwrap_or_default(),
        }
    }
}

impl From<NewsPage> for FeedPage {
    fn from(page: NewsPage) -> Self {
        Self {
            news: page.news.into_iter().map(FeedNewsItem::from).collect(),
            total_count: page.total_count,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// Build the application router.
pub fn router(store: Arc<SupabaseStore>) -> Router {
    Router::new().route("/news", get(get_news)).with_state(store)
}

/// Bind and serve the read API until the process is stopped.
pub async fn serve(store: SupabaseStore, listen: &str) -> Result<(), BoxError> {
    let app = router(Arc::new(store));
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(%listen, "read API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_news(
    State(store): State<Arc<SupabaseStore>>,
    Query(params): Query<NewsParams>,
) -> Result<Json<FeedPage>, (StatusCode, Json<serde_json::Value>)> {
    let query = to_query(params);
    match store.query_news(&query).await {
        Ok(page) => Ok(Json(FeedPage::from(page))),
        Err(e) => {
            error!(error = %e, "news query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to retrieve news data from database."
                })),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_query_defaults() {
        let query = to_query(NewsParams::default());
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
        assert!(query.date.is_none());
    }

    #[test]
    fn test_to_query_clamps_bounds() {
        let query = to_query(NewsParams {
            page: Some(0),
            limit: Some(100_000),
            ..NewsParams::default()
        });
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_feed_item_from_full_row() {
        let row = StoredArticle {
            id: Some(json!(42)),
            title: Some("Shelling intensifies".to_string()),
            published_date: Some("2025-05-06T00:00:00+00:00".to_string()),
            url: Some("http://x/1".to_string()),
            body: Some("snippet".to_string()),
            relevance_score: Some(7.5),
            image_url: Some("http://x/img.jpg".to_string()),
            country_iso_code: Some("UA".to_string()),
        };

        let item = FeedNewsItem::from(row);
        assert_eq!(item.time, "2025-05-06");
        assert_eq!(item.location, "UA");
        assert_eq!(item.relevance_score, 7.5);
    }

    #[test]
    fn test_feed_item_defaults_for_missing_fields() {
        let row = StoredArticle {
            id: None,
            title: None,
            published_date: None,
            url: None,
            body: None,
            relevance_score: None,
            image_url: None,
            country_iso_code: None,
        };

        let item = FeedNewsItem::from(row);
        assert_eq!(item.time, "Date N/A");
        assert_eq!(item.title, "Untitled News");
        assert_eq!(item.link, "#");
        assert_eq!(item.description, "No description available.");
        assert_eq!(item.relevance_score, 0.0);
    }
}
