//! Data models for crawled articles and their processed representations.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`RawArticle`]: raw crawled article data, one row of the crawl checkpoint
//! - [`CleanedArticle`]: a normalized, scored, geo-tagged article, one row of
//!   the cleaned checkpoint
//! - [`AnnotatedDoc`] / [`Entity`] / [`EntityLabel`]: the output contract of
//!   the language-analysis backend (lemmas plus tagged entity spans)
//! - [`KeywordGroup`]: a weighted bucket of domain keywords used for scoring
//!
//! Serde rename attributes pin the CSV column names of both checkpoint files,
//! so the structs double as the on-disk schema.

use serde::{Deserialize, Serialize};

/// A raw news article as returned by the crawl stage, prior to cleaning.
///
/// Field names match the header row of the combined crawl checkpoint CSV.
/// Missing values are carried as empty strings rather than options, which is
/// what the checkpoint format stores.
///
/// # Identity
///
/// `url` is the only stable identity: two raw articles with equal `url` are
/// the same article, and later stages deduplicate on it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawArticle {
    /// The article headline as extracted from the page.
    #[serde(default)]
    pub title: String,
    /// Comma-joined author names, when the page exposes them.
    #[serde(default)]
    pub authors: String,
    /// Loosely formatted publication date text; empty when unknown.
    #[serde(default)]
    pub published_date: String,
    /// The full extracted article text.
    #[serde(default)]
    pub body: String,
    /// Lead image URL, when the page exposes one.
    #[serde(default)]
    pub image_url: String,
    /// Comma-joined keywords, when the extractor produces them.
    #[serde(default)]
    pub keywords: String,
    /// Extractor-produced summary text, when available.
    #[serde(default)]
    pub summary: String,
    /// The source URL the article was crawled from.
    #[serde(default)]
    pub url: String,
}

impl RawArticle {
    /// Placeholder recorded when a URL could not be crawled.
    ///
    /// The batch keeps going on per-URL failures; the placeholder keeps the
    /// URL visible in the crawl checkpoint and is dropped later by the
    /// preprocessing quality gates (empty body).
    pub fn error_placeholder(url: &str) -> Self {
        Self {
            title: "Error: Could not crawl".to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }
}

/// A cleaned, scored, geo-tagged article emitted by the preprocessing filter.
///
/// Column names match the cleaned checkpoint CSV header. Instances are
/// created once per pipeline run and are immutable afterwards; the datastore
/// upsert is keyed by `url`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CleanedArticle {
    /// Markup-stripped headline.
    #[serde(rename = "Title")]
    pub title: String,
    /// Canonical `YYYY-MM-DD` publication date, `None` when unparseable.
    #[serde(rename = "Published Date")]
    pub published_date: Option<String>,
    /// Source URL; unique within an emitted batch.
    #[serde(rename = "URL")]
    pub url: String,
    /// Bounded-length body snippet for feed display.
    #[serde(rename = "Body_Snippet")]
    pub body_snippet: String,
    /// Relevance score, rounded to two decimals; at or above the configured
    /// threshold for every emitted article.
    #[serde(rename = "Relevance_Score")]
    pub relevance_score: f64,
    /// Lead image URL or empty.
    #[serde(rename = "Image_URL")]
    pub image_url: String,
    /// Best-guess ISO-3166 alpha-2 country code or empty.
    #[serde(rename = "Country_ISO_Code")]
    pub country_code: String,
    /// The full markup-stripped body text.
    #[serde(rename = "Full_Body")]
    pub full_body: String,
}

/// Semantic category of a tagged entity span.
///
/// The vocabulary is fixed and serialized as the conventional NER tag names,
/// which is what keyword-group configuration files use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum EntityLabel {
    /// A geopolitical entity: country, city, state.
    #[serde(rename = "GPE")]
    Place,
    /// A non-political location: mountain range, body of water, region.
    #[serde(rename = "LOC")]
    Location,
    /// An organization: company, agency, institution.
    #[serde(rename = "ORG")]
    Org,
    /// A person.
    #[serde(rename = "PERSON")]
    Person,
    /// A named event: war, battle, summit.
    #[serde(rename = "EVENT")]
    Event,
    /// A nationality, religious or political group.
    #[serde(rename = "NORP")]
    Group,
}

/// A tagged entity span produced by language analysis.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Entity {
    /// The surface text of the span as it appears in the source.
    pub text: String,
    /// The semantic label assigned to the span.
    pub label: EntityLabel,
}

/// Structured linguistic annotation over one text.
///
/// Produced per title and per body by an [`crate::nlp::Annotator`] backend,
/// consumed immediately by the scorer and country resolver, then discarded.
/// Any backend must produce this shape: an ordered sequence of lemmatized,
/// stop-word and punctuation filtered tokens, plus tagged entity spans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedDoc {
    /// Lower-cased lemmas in source order, stop words and non-alphabetic
    /// tokens removed.
    pub lemmas: Vec<String>,
    /// Tagged entity spans found in the text.
    pub entities: Vec<Entity>,
}

/// A named bucket of domain keywords with a weight and associated entity tags.
///
/// Keyword phrase hits contribute the full `weight` (title hits boosted by a
/// multiplier); entities whose label appears in `entity_tags` contribute a
/// reduced flat bonus.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordGroup {
    /// Group name, used only for configuration and logging.
    pub name: String,
    /// Keyword phrases; must be non-empty.
    pub keywords: Vec<String>,
    /// Score contribution per phrase hit; must be positive.
    pub weight: f64,
    /// Entity labels that also count toward this bucket.
    #[serde(rename = "ner_tags", default)]
    pub entity_tags: Vec<EntityLabel>,
}
