//! CSV checkpoint files written between pipeline stages.
//!
//! Checkpoints are UTF-8 with a byte-order mark, a fixed header row, and one
//! row per article. An empty cleaned batch still produces a well-formed
//! header-only file, so downstream consumers never see a missing or headerless
//! checkpoint. Readers tolerate the byte-order mark.

use crate::models::{CleanedArticle, RawArticle};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Header of the crawl-stage checkpoint.
const RAW_HEADER: [&str; 8] = [
    "title",
    "authors",
    "published_date",
    "body",
    "image_url",
    "keywords",
    "summary",
    "url",
];

/// Header of the preprocess-stage checkpoint.
const CLEANED_HEADER: [&str; 8] = [
    "Title",
    "Published Date",
    "URL",
    "Body_Snippet",
    "Relevance_Score",
    "Image_URL",
    "Country_ISO_Code",
    "Full_Body",
];

fn to_csv_bytes<T: Serialize>(
    records: &[T],
    header: &[&str],
) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        // serde-driven headers only appear with at least one record; an
        // empty batch still gets the fixed header row.
        writer.write_record(header)?;
    } else {
        for record in records {
            writer.serialize(record)?;
        }
    }
    let body = writer.into_inner()?;

    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Write the crawl-stage checkpoint.
#[instrument(level = "info", skip_all, fields(%path, count = articles.len()))]
pub async fn write_raw_batch(path: &str, articles: &[RawArticle]) -> Result<(), Box<dyn Error>> {
    let bytes = to_csv_bytes(articles, &RAW_HEADER)?;
    fs::write(path, bytes).await?;
    info!("wrote crawl checkpoint");
    Ok(())
}

/// Write the preprocess-stage checkpoint; an empty batch writes a
/// header-only file.
#[instrument(level = "info", skip_all, fields(%path, count = articles.len()))]
pub async fn write_cleaned_batch(
    path: &str,
    articles: &[CleanedArticle],
) -> Result<(), Box<dyn Error>> {
    let bytes = to_csv_bytes(articles, &CLEANED_HEADER)?;
    fs::write(path, bytes).await?;
    info!("wrote cleaned checkpoint");
    Ok(())
}

/// Read a preprocess-stage checkpoint back into memory.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn read_cleaned_batch(path: &str) -> Result<Vec<CleanedArticle>, Box<dyn Error>> {
    let content = fs::read_to_string(path).await?;
    let articles = parse_cleaned_csv(&content)?;
    info!(count = articles.len(), "read cleaned checkpoint");
    Ok(articles)
}

fn parse_cleaned_csv(content: &str) -> Result<Vec<CleanedArticle>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(strip_bom(content).as_bytes());
    let mut articles = Vec::new();
    for record in reader.deserialize() {
        articles.push(record?);
    }
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(url: &str) -> CleanedArticle {
        CleanedArticle {
            title: "Shelling intensifies".to_string(),
            published_date: Some("2025-05-06".to_string()),
            url: url.to_string(),
            body_snippet: "Shelling intensified overnight...".to_string(),
            relevance_score: 7.5,
            image_url: String::new(),
            country_code: "UA".to_string(),
            full_body: "Shelling intensified overnight across the region.".to_string(),
        }
    }

    #[test]
    fn test_cleaned_batch_round_trip() {
        let batch = vec![cleaned("http://x/1"), cleaned("http://x/2")];
        let bytes = to_csv_bytes(&batch, &CLEANED_HEADER).unwrap();
        let content = String::from_utf8(bytes).unwrap();
        let parsed = parse_cleaned_csv(&content).unwrap();

        assert_eq!(parsed, batch);
    }

    #[test]
    fn test_checkpoint_starts_with_bom() {
        let bytes = to_csv_bytes(&[cleaned("http://x/1")], &CLEANED_HEADER).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
    }

    #[test]
    fn test_empty_batch_writes_header_only() {
        let bytes = to_csv_bytes::<CleanedArticle>(&[], &CLEANED_HEADER).unwrap();
        let content = String::from_utf8(bytes).unwrap();
        let stripped = strip_bom(&content);

        assert_eq!(
            stripped.trim_end(),
            "Title,Published Date,URL,Body_Snippet,Relevance_Score,Image_URL,Country_ISO_Code,Full_Body"
        );
        assert!(parse_cleaned_csv(&content).unwrap().is_empty());
    }

    #[test]
    fn test_serde_header_matches_fixed_header() {
        let bytes = to_csv_bytes(&[cleaned("http://x/1")], &CLEANED_HEADER).unwrap();
        let content = String::from_utf8(bytes).unwrap();
        let first_line = strip_bom(&content).lines().next().unwrap();

        assert_eq!(first_line, CLEANED_HEADER.join(","));
    }

    #[test]
    fn test_raw_header_matches_crawler_columns() {
        let raw = RawArticle {
            url: "http://x/1".to_string(),
            ..RawArticle::default()
        };
        let bytes = to_csv_bytes(&[raw], &RAW_HEADER).unwrap();
        let content = String::from_utf8(bytes).unwrap();
        let first_line = strip_bom(&content).lines().next().unwrap();

        assert_eq!(first_line, RAW_HEADER.join(","));
    }

    #[test]
    fn test_missing_date_round_trips_as_none() {
        let mut article = cleaned("http://x/1");
        article.published_date = None;
        let bytes = to_csv_bytes(&[article.clone()], &CLEANED_HEADER).unwrap();
        let parsed = parse_cleaned_csv(&String::from_utf8(bytes).unwrap()).unwrap();

        assert_eq!(parsed[0].published_date, None);
        assert_eq!(parsed[0], article);
    }
}
