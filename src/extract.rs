//! Per-URL article extraction.
//!
//! Given a fetched page, pull out the pieces the pipeline needs: headline,
//! publication date, body text, and lead image. Selector preference lists
//! follow what general news pages actually expose; extraction is best-effort
//! and a page that yields nothing produces empty fields, not an error.
//!
//! Fetch failures are isolated per URL: [`fetch_raw_article`] returns an
//! error placeholder so the batch keeps going and the URL stays visible in
//! the crawl checkpoint.

use crate::models::RawArticle;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Per-request timeout for article downloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// Meta tags checked, in order, for a publication timestamp.
const DATE_META_SELECTORS: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="pubdate"]"#,
    r#"meta[name="creation_date"]"#,
    r#"meta[name="cXenseParse:recs:publishtime"]"#,
    r#"meta[name="dcterms.created"]"#,
    r#"meta[name="date"]"#,
];

/// Containers checked, in order, for the article body.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "div.story-content",
    "div.article-content",
    "div.entry-content",
    "div.post-content",
    "div.content",
    "div.body",
    r#"section[class*="article-body"]"#,
];

/// Paragraphs shorter than this are captions, bylines, or ad links.
const MIN_PARAGRAPH_LEN: usize = 50;

/// Shared HTTP client for all crawl traffic.
pub fn http_client() -> Result<reqwest::Client, Box<dyn Error>> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Download and parse one article URL.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn extract_article(
    client: &reqwest::Client,
    url: &str,
) -> Result<RawArticle, Box<dyn Error>> {
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let article = parse_article(url, &html);
    debug!(
        title = %truncate_for_log(&article.title, 80),
        body_bytes = article.body.len(),
        "parsed article"
    );
    Ok(article)
}

/// Like [`extract_article`], but failures yield an error placeholder instead
/// of an error, so one bad URL never fails the batch.
pub async fn fetch_raw_article(client: &reqwest::Client, url: &str) -> RawArticle {
    match extract_article(client, url).await {
        Ok(article) => article,
        Err(e) => {
            error!(error = %e, %url, "article fetch failed; recording placeholder");
            RawArticle::error_placeholder(url)
        }
    }
}

/// Parse an already-downloaded page into a raw article.
pub fn parse_article(url: &str, html: &str) -> RawArticle {
    let document = Html::parse_document(html);

    RawArticle {
        title: extract_title(&document),
        published_date: extract_published_date(&document),
        body: extract_body(&document),
        image_url: meta_content(&document, r#"meta[property="og:image"]"#).unwrap_or_default(),
        url: url.to_string(),
        ..RawArticle::default()
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).unwrap();
    document
        .select(&sel)
        .find_map(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

fn extract_title(document: &Html) -> String {
    if let Some(title) = meta_content(document, r#"meta[property="og:title"]"#) {
        return title;
    }
    for selector in ["h1", "header h1", "title"] {
        let sel = Selector::parse(selector).unwrap();
        if let Some(el) = document.select(&sel).next() {
            let text = el.text().collect::<Vec<_>>().join(" ").trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn extract_published_date(document: &Html) -> String {
    for selector in DATE_META_SELECTORS {
        if let Some(date) = meta_content(document, selector) {
            return date;
        }
    }

    // Visible <time> elements are the fallback; prefer their datetime attr.
    let time_sel = Selector::parse("time").unwrap();
    if let Some(el) = document.select(&time_sel).next() {
        if let Some(datetime) = el.value().attr("datetime") {
            return datetime.trim().to_string();
        }
        return el.text().collect::<Vec<_>>().join(" ").trim().to_string();
    }
    String::new()
}

fn extract_body(document: &Html) -> String {
    let p_sel = Selector::parse("p").unwrap();

    let mut paragraphs: Vec<String> = Vec::new();
    for selector in CONTENT_SELECTORS {
        let sel = Selector::parse(selector).unwrap();
        if let Some(container) = document.select(&sel).next() {
            paragraphs = container
                .select(&p_sel)
                .map(|p| p.text().collect::<Vec<_>>().join(" ").trim().to_string())
                .collect();
            break;
        }
    }
    if paragraphs.is_empty() {
        paragraphs = document
            .select(&p_sel)
            .map(|p| p.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .collect();
    }

    paragraphs
        .into_iter()
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_LEN)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate a string for logging, appending a byte-count marker.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i <= max)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_PARA: &str = "This paragraph is comfortably longer than the fifty character floor used to drop captions.";

    #[test]
    fn test_parse_article_prefers_meta_tags() {
        let html = format!(
            r#"<html><head>
                <meta property="og:title" content="Shelling intensifies in the east" />
                <meta property="article:published_time" content="2025-05-06T08:15:00Z" />
                <meta property="og:image" content="https://example.com/lead.jpg" />
            </head><body>
                <h1>Different on-page headline</h1>
                <article><p>{LONG_PARA}</p><p>short caption</p></article>
            </body></html>"#
        );
        let article = parse_article("https://example.com/a", &html);

        assert_eq!(article.title, "Shelling intensifies in the east");
        assert_eq!(article.published_date, "2025-05-06T08:15:00Z");
        assert_eq!(article.image_url, "https://example.com/lead.jpg");
        assert_eq!(article.body, LONG_PARA);
        assert_eq!(article.url, "https://example.com/a");
    }

    #[test]
    fn test_parse_article_falls_back_to_h1_and_time() {
        let html = format!(
            r#"<html><body>
                <h1>On-page headline</h1>
                <time datetime="2025-05-06">May 6</time>
                <div class="story-content"><p>{LONG_PARA}</p></div>
            </body></html>"#
        );
        let article = parse_article("https://example.com/b", &html);

        assert_eq!(article.title, "On-page headline");
        assert_eq!(article.published_date, "2025-05-06");
        assert_eq!(article.body, LONG_PARA);
    }

    #[test]
    fn test_short_paragraphs_are_dropped() {
        let html = format!(
            "<html><body><article><p>Ad</p><p>{LONG_PARA}</p><p>By Staff</p></article></body></html>"
        );
        let article = parse_article("https://example.com/c", &html);
        assert_eq!(article.body, LONG_PARA);
    }

    #[test]
    fn test_body_falls_back_to_document_paragraphs() {
        let html = format!("<html><body><div><p>{LONG_PARA}</p></div></body></html>");
        let article = parse_article("https://example.com/d", &html);
        assert_eq!(article.body, LONG_PARA);
    }

    #[test]
    fn test_empty_page_yields_empty_fields() {
        let article = parse_article("https://example.com/e", "<html><body></body></html>");
        assert!(article.title.is_empty());
        assert!(article.published_date.is_empty());
        assert!(article.body.is_empty());
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let truncated = truncate_for_log(&long, 100);
        assert!(truncated.contains("…(+"));
    }
}
