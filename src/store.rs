//! Hosted datastore adapter (PostgREST/Supabase REST).
//!
//! The pipeline's only persistence is an upsert into one table, keyed by
//! article URL; the read API's only query is a filtered, sorted, paginated
//! select over the same table. Both are plain REST calls wrapped in retry
//! logic with exponential backoff and jitter to ride out transient failures.
//!
//! # Retry strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::models::CleanedArticle;
use rand::{rng, Rng};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Errors crossing the store boundary; `Send + Sync` so server handlers can
/// await these calls.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry decorator for transient datastore failures.
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds or retries are exhausted.
    pub async fn run<T, F, Fut>(&self, name: &str, mut operation: F) -> Result<T, BoxError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            name,
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u128,
                            error = %e,
                            "operation exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        name,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u128,
                        ?delay,
                        error = %e,
                        "operation failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// One row of the news table as written by the pipeline.
///
/// `published_date` is an ISO-8601 UTC-midnight timestamp string or null;
/// `body` holds the snippet text, not the full body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbArticle {
    pub title: String,
    pub published_date: Option<String>,
    pub url: String,
    pub body: String,
    pub relevance_score: f64,
    pub image_url: String,
    pub country_iso_code: String,
}

impl From<&CleanedArticle> for DbArticle {
    fn from(article: &CleanedArticle) -> Self {
        Self {
            title: article.title.clone(),
            published_date: article
                .published_date
                .as_ref()
                .map(|d| format!("{d}T00:00:00Z")),
            url: article.url.clone(),
            body: article.body_snippet.clone(),
            relevance_score: article.relevance_score,
            image_url: article.image_url.clone(),
            country_iso_code: article.country_code.clone(),
        }
    }
}

/// One row of the news table as returned by a read query.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredArticle {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub country_iso_code: Option<String>,
}

/// Filters and pagination for a read query.
#[derive(Debug, Clone, Default)]
pub struct NewsQuery {
    pub page: u32,
    pub per_page: u32,
    /// Inclusive UTC-day filter, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Case-insensitive substring match against title or body.
    pub keyword: Option<String>,
    /// Exact ISO alpha-2 match.
    pub country_iso: Option<String>,
}

/// One page of query results plus the exact total row count.
#[derive(Debug, Clone)]
pub struct NewsPage {
    pub news: Vec<StoredArticle>,
    pub total_count: u64,
    pub page: u32,
    pub per_page: u32,
}

const SELECT_COLUMNS: &str =
    "id,title,published_date,url,body,relevance_score,image_url,country_iso_code";

/// Build the PostgREST query parameters for a read query.
///
/// An invalid date filter is ignored with a warning rather than failing the
/// request, matching how the pipeline treats malformed dates everywhere else.
fn build_query_params(query: &NewsQuery) -> Vec<(String, String)> {
    let page = query.page.max(1);
    let per_page = query.per_page.max(1);
    let offset = (page - 1) * per_page;

    let mut params: Vec<(String, String)> = vec![
        ("select".to_string(), SELECT_COLUMNS.to_string()),
        (
            "order".to_string(),
            "relevance_score.desc.nullslast,published_date.desc.nullslast".to_string(),
        ),
    ];

    if let Some(date) = query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() {
            params.push(("published_date".to_string(), format!("gte.{date}T00:00:00Z")));
            params.push((
                "published_date".to_string(),
                format!("lte.{date}T23:59:59.999999Z"),
            ));
        } else {
            warn!(date, "ignoring invalid date filter");
        }
    }

    if let Some(keyword) = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
    {
        params.push((
            "or".to_string(),
            format!("(title.ilike.*{keyword}*,body.ilike.*{keyword}*)"),
        ));
    }

    if let Some(country) = query
        .country_iso
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        params.push((
            "country_iso_code".to_string(),
            format!("eq.{}", country.to_uppercase()),
        ));
    }

    params.push(("limit".to_string(), per_page.to_string()));
    params.push(("offset".to_string(), offset.to_string()));
    params
}

/// Parse a `Content-Range` header value like `0-9/57` into the total count.
fn parse_total_count(content_range: &str) -> Option<u64> {
    content_range.rsplit('/').next()?.trim().parse().ok()
}

/// REST client for the hosted news table.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    table: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Upsert a batch of rows keyed by `url`, returning how many were sent.
    ///
    /// Rows with a blank URL are dropped first; the table's unique
    /// constraint would reject them.
    #[instrument(level = "info", skip_all, fields(records = records.len()))]
    pub async fn upsert(&self, records: &[DbArticle]) -> Result<usize, BoxError> {
        let valid: Vec<&DbArticle> = records.iter().filter(|r| !r.url.trim().is_empty()).collect();
        if valid.len() < records.len() {
            warn!(
                dropped = records.len() - valid.len(),
                "dropping records with missing URL before upsert"
            );
        }
        if valid.is_empty() {
            info!("no valid records to upsert");
            return Ok(0);
        }

        self.retry
            .run("upsert", || self.try_upsert(&valid))
            .await?;
        info!(count = valid.len(), table = %self.table, "upserted records");
        Ok(valid.len())
    }

    async fn try_query(&self, params: &[(String, String)]) -> Result<reqwest::Response, BoxError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(params)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "count=exact")
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }

    async fn try_upsert(&self, records: &[&DbArticle]) -> Result<(), BoxError> {
        self.client
            .post(self.endpoint())
            .query(&[("on_conflict", "url")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(records)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Run a filtered, sorted, paginated read query.
    #[instrument(level = "info", skip_all)]
    pub async fn query_news(&self, query: &NewsQuery) -> Result<NewsPage, BoxError> {
        let params = build_query_params(query);
        let response = self
            .retry
            .run("query_news", || self.try_query(&params))
            .await?;

        let total_from_header = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total_count);
        let news: Vec<StoredArticle> = response.json().await?;
        let total_count = total_from_header.unwrap_or(news.len() as u64);

        Ok(NewsPage {
            total_count,
            page: query.page.max(1),
            per_page: query.per_page.max(1),
            news,
        })
    }
}
