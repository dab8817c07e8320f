//! Google News search-feed indexer.
//!
//! The search-retrieval capability: given a query, discover recent article
//! URLs via the Google News RSS search feed, restricted to the last week.
//! Only `<item><link>` values are taken from the feed; titles, dates, and
//! body text come from the article pages themselves during fetching.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Index recent article URLs for one search query.
///
/// Returns at most `limit` URLs, in feed order.
#[instrument(level = "info", skip(client))]
pub async fn index_articles(
    client: &reqwest::Client,
    query: &str,
    limit: usize,
) -> Result<Vec<String>, Box<dyn Error>> {
    let feed_url = format!(
        "https://news.google.com/rss/search?q={}+when:7d&hl=en-US&gl=US&ceid=US:en",
        urlencoding::encode(query)
    );

    let xml = client
        .get(&feed_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let urls = parse_feed_links(&xml, limit)?;

    info!(count = urls.len(), query, "indexed search results");
    debug!(urls = ?urls, "search result URLs");
    Ok(urls)
}

/// Pull `<item><link>` values out of an RSS feed document.
fn parse_feed_links(xml: &str, limit: usize) -> Result<Vec<String>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut in_item = false;
    let mut in_link = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => in_item = true,
                b"link" if in_item => in_link = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => in_item = false,
                b"link" => in_link = false,
                _ => {}
            },
            Ok(Event::Text(t)) if in_item && in_link => {
                let decoded = t.decode()?;
                let link = quick_xml::escape::unescape(decoded.as_ref())?
                    .trim()
                    .to_string();
                if !link.is_empty() {
                    urls.push(link);
                    if urls.len() >= limit {
                        break;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Box::new(e)),
            _ => {}
        }
    }

    Ok(urls)
}
