//! Al Jazeera section indexer.
//!
//! Scrapes the news section homepage for article links. Al Jazeera article
//! URLs carry a date path (`/news/2025/5/6/slug`), which separates stories
//! from section and live-blog links.

use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

const SECTION_URL: &str = "https://www.aljazeera.com/news/";

/// Index article URLs from the news section homepage.
#[instrument(level = "info", skip(client))]
pub async fn index_articles(client: &reqwest::Client) -> Result<Vec<String>, Box<dyn Error>> {
    let html = client
        .get(SECTION_URL)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let urls = parse_section_links(&html)?;

    info!(count = urls.len(), source = SECTION_URL, "indexed Al Jazeera article URLs");
    debug!(urls = ?urls, "Al Jazeera URLs");
    Ok(urls)
}

fn parse_section_links(html: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let base = Url::parse(SECTION_URL)?;
    let document = Html::parse_document(html);
    let link_sel = Selector::parse("a[href]").unwrap();

    let mut urls = Vec::new();
    for element in document.select(&link_sel) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !is_article_path(href) {
            continue;
        }
        if let Ok(resolved) = base.join(href) {
            let resolved = resolved.to_string();
            if !urls.contains(&resolved) {
                urls.push(resolved);
            }
        }
    }
    Ok(urls)
}

/// Story paths look like `/news/2025/5/6/some-slug`.
fn is_article_path(href: &str) -> bool {
    let trimmed = href.trim_start_matches("https://www.aljazeera.com");
    let mut segments = trimmed.trim_start_matches('/').split('/');
    if segments.next() != Some("news") {
        return false;
    }
    matches!(
        (segments.next(), segments.next(), segments.next()),
        (Some(year), Some(month), Some(day))
            if year.len() == 4
                && year.chars().all(|c| c.is_ascii_digit())
                && !month.is_empty()
                && month.chars().all(|c| c.is_ascii_digit())
                && !day.is_empty()
                && day.chars().all(|c| c.is_ascii_digit())
    )
}
