//! The preprocessing filter: normalize, score, geo-tag, deduplicate.
//!
//! [`preprocess_batch`] consumes a batch of raw crawled articles and emits
//! the cleaned batch, applying in input order:
//!
//! 1. URL gate: blank URLs and URLs already seen in this batch are skipped
//!    (first occurrence wins; deduplication is batch-local, cross-run
//!    deduplication is the datastore's upsert-by-url)
//! 2. Quality gate: empty cleaned title, or cleaned body shorter than the
//!    configured minimum, skips the article
//! 3. Language analysis over title and body, capped to the backend's
//!    maximum input length
//! 4. Relevance scoring; articles below the threshold are skipped
//! 5. Canonical date, snippet, and country code for the survivors
//!
//! Emission order matches input order among surviving articles. The filter
//! performs no I/O of its own; checkpointing is the caller's job.

pub mod country;
pub mod normalize;
pub mod score;

use crate::config::PipelineConfig;
use crate::models::{CleanedArticle, RawArticle};
use crate::nlp::Annotator;
use country::CountryTable;
use std::collections::HashSet;
use tracing::{debug, info};

/// Per-batch bookkeeping of why articles were dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounts {
    pub input: usize,
    pub retained: usize,
    pub blank_url: usize,
    pub duplicate_url: usize,
    pub below_quality: usize,
    pub below_threshold: usize,
}

impl BatchCounts {
    pub fn skipped(&self) -> usize {
        self.input - self.retained
    }
}

/// Filter a raw batch into cleaned, scored, geo-tagged articles.
pub fn preprocess_batch(
    raw: &[RawArticle],
    analyzer: &dyn Annotator,
    table: &CountryTable,
    cfg: &PipelineConfig,
) -> (Vec<CleanedArticle>, BatchCounts) {
    let mut counts = BatchCounts {
        input: raw.len(),
        ..BatchCounts::default()
    };
    let mut cleaned: Vec<CleanedArticle> = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();

    for article in raw {
        let url = article.url.trim();
        if url.is_empty() {
            counts.blank_url += 1;
            continue;
        }
        if seen_urls.contains(url) {
            counts.duplicate_url += 1;
            debug!(url, "duplicate url in batch; keeping first occurrence");
            continue;
        }

        let title_clean = normalize::strip_markup(&article.title);
        let body_clean = normalize::strip_markup(&article.body);
        if title_clean.is_empty() || body_clean.chars().count() < cfg.min_text_length {
            counts.below_quality += 1;
            debug!(url, "skipping article too short to score meaningfully");
            continue;
        }

        let title_doc = analyzer.annotate_capped(&title_clean);
        let body_doc = analyzer.annotate_capped(&body_clean);

        let relevance = score::score(
            &title_doc,
            &body_doc,
            &cfg.keyword_groups,
            &cfg.negative_keywords,
            cfg.title_multiplier,
        );
        if relevance < cfg.relevance_threshold {
            counts.below_threshold += 1;
            debug!(url, relevance, "skipping article below relevance threshold");
            continue;
        }

        cleaned.push(CleanedArticle {
            title: title_clean,
            published_date: normalize::to_canonical_date(&article.published_date),
            url: url.to_string(),
            body_snippet: normalize::make_snippet(&body_clean, cfg.snippet_max_length),
            relevance_score: (relevance * 100.0).round() / 100.0,
            image_url: article.image_url.trim().to_string(),
            country_code: country::resolve_country(&title_doc, &body_doc, table),
            full_body: body_clean,
        });
        seen_urls.insert(url.to_string());
        counts.retained += 1;
    }

    info!(
        input = counts.input,
        retained = counts.retained,
        blank_url = counts.blank_url,
        duplicate_url = counts.duplicate_url,
        below_quality = counts.below_quality,
        below_threshold = counts.below_threshold,
        "preprocessing finished"
    );
    (cleaned, counts)
}
