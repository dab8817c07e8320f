//! Pipeline configuration.
//!
//! Search queries, keyword groups, negative keywords, and scoring thresholds
//! live in one [`PipelineConfig`]. The compiled-in defaults cover the armed
//! conflict beat; a YAML file can override any of them:
//!
//! ```yaml
//! queries:
//!   - "ukraine war updates"
//! relevance_threshold: 2.0
//! keyword_groups:
//!   - name: direct_combat
//!     keywords: ["war", "invasion"]
//!     weight: 3.0
//!     ner_tags: ["EVENT", "NORP", "GPE"]
//! negative_keywords:
//!   "peace agreement": -2.0
//! ```

use crate::models::{EntityLabel, KeywordGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use tracing::info;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Search queries fed to the news-search capability, one crawl each.
    pub queries: Vec<String>,
    /// Maximum articles indexed per query.
    pub articles_per_query: usize,
    /// Minimum score an article must reach to be retained.
    pub relevance_threshold: f64,
    /// Minimum cleaned body length (characters) worth scoring.
    pub min_text_length: usize,
    /// Maximum body snippet length in characters.
    pub snippet_max_length: usize,
    /// Boost applied to keyword hits in the title.
    pub title_multiplier: f64,
    /// Weighted keyword buckets.
    pub keyword_groups: Vec<KeywordGroup>,
    /// Phrase -> (negative) weight penalties.
    pub negative_keywords: BTreeMap<String, f64>,
    /// Reference geography dataset for the country table.
    pub countries_geojson: String,
    /// Datastore table name.
    pub table: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queries: [
                "global conflict overview",
                "ukraine war updates",
                "middle east security situation",
                "political instability in africa",
                "asia pacific tensions",
                "global humanitarian aid efforts",
                "major international disputes",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            articles_per_query: 7,
            relevance_threshold: 2.0,
            min_text_length: 30,
            snippet_max_length: 250,
            title_multiplier: 1.5,
            keyword_groups: default_keyword_groups(),
            negative_keywords: default_negative_keywords(),
            countries_geojson: "countries_geo.json".to_string(),
            table: "news_articles".to_string(),
        }
    }
}

fn group(
    name: &str,
    keywords: &[&str],
    weight: f64,
    entity_tags: &[EntityLabel],
) -> KeywordGroup {
    KeywordGroup {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        weight,
        entity_tags: entity_tags.to_vec(),
    }
}

fn default_keyword_groups() -> Vec<KeywordGroup> {
    use EntityLabel::{Event, Group, Location, Org, Person, Place};
    vec![
        group(
            "direct_combat",
            &["war", "battle", "invasion", "airstrike", "shelling", "offensive", "fighting", "combat"],
            3.0,
            &[Event, Group, Place],
        ),
        group(
            "military_ops",
            &["military", "troops", "forces", "deployment", "mobilization", "defense", "weapon"],
            2.0,
            &[Org, Group],
        ),
        group(
            "casualties_impact",
            &["casualties", "killed", "wounded", "refugees", "displacement", "humanitarian crisis", "civilians"],
            2.5,
            &[Person, Place],
        ),
        group(
            "diplomacy_tension",
            &["ceasefire", "negotiation", "sanctions", "escalation", "tensions", "conflict resolution", "diplomacy"],
            1.5,
            &[Event, Place, Org],
        ),
        group(
            "geopolitical_context",
            &["geopolitics", "border dispute", "territory", "sovereignty", "insurgency", "uprising"],
            1.0,
            &[Location, Place],
        ),
    ]
}

fn default_negative_keywords() -> BTreeMap<String, f64> {
    [
        ("peace talks", -1.0),
        ("peace agreement", -2.0),
        ("sports match", -3.0),
        ("war on drugs", -2.0),
        ("trade war", -2.0),
        ("historical war", -1.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl PipelineConfig {
    /// Load configuration, falling back to the defaults when no file is given.
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let config: Self = serde_yaml::from_str(&raw)?;
                info!(path, "loaded pipeline configuration");
                config
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make scoring meaningless.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        for group in &self.keyword_groups {
            if group.keywords.is_empty() {
                return Err(format!("keyword group {:?} has no keywords", group.name).into());
            }
            if group.weight <= 0.0 {
                return Err(format!(
                    "keyword group {:?} has non-positive weight {}",
                    group.name, group.weight
                )
                .into());
            }
        }
        if self.relevance_threshold < 0.0 {
            return Err("relevance_threshold must be non-negative".into());
        }
        Ok(())
    }
}
