//! Country resolution from place-tagged entities.
//!
//! A [`CountryTable`] maps lower-cased country names and aliases to ISO-3166
//! alpha-2 codes. It is built once at startup from a GeoJSON reference file
//! and shared read-only for the rest of the run; it is never ambient mutable
//! state, callers pass it by reference.
//!
//! Resolution is a majority vote over the place entities of a title/body
//! pair. Entities that miss the table directly fall back to a permissive
//! substring scan over all known names (containment in either direction).
//! That fallback can over-match short names contained in longer entity
//! strings; this is a known precision/recall trade-off and is kept as-is.

use crate::models::{AnnotatedDoc, EntityLabel};
use itertools::Itertools;
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use tracing::{info, warn};

/// Read-only mapping from country names/aliases to alpha-2 codes.
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    codes: HashMap<String, String>,
    // Ascending name order makes the fallback scan's "first match" stable.
    names: Vec<String>,
}

impl CountryTable {
    /// Build a table from (name, alpha-2 code) pairs.
    ///
    /// Names are lower-cased and trimmed, codes upper-cased.
    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut codes = HashMap::new();
        for (name, code) in pairs {
            let name = name.as_ref().trim().to_lowercase();
            let code = code.as_ref().trim().to_uppercase();
            if !name.is_empty() && !code.is_empty() {
                codes.insert(name, code);
            }
        }
        let names = codes.keys().cloned().sorted().collect();
        Self { codes, names }
    }

    /// Parse a GeoJSON feature collection into a table.
    ///
    /// Accepts `ADMIN`, `NAME`, or `name` as the country-name property and
    /// requires a valid `ISO_A2` (the reference dataset uses `-99` for
    /// entries without one). Common short aliases for the United States and
    /// United Kingdom are injected alongside their dataset names.
    pub fn from_geojson_str(geojson: &str) -> Result<Self, Box<dyn Error>> {
        let value: serde_json::Value = serde_json::from_str(geojson)?;
        let mut pairs: Vec<(String, String)> = Vec::new();

        for feature in value
            .get("features")
            .and_then(|f| f.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[])
        {
            let props = feature.get("properties").cloned().unwrap_or_default();
            let name = ["ADMIN", "NAME", "name"]
                .iter()
                .find_map(|key| props.get(*key).and_then(|v| v.as_str()))
                .unwrap_or("");
            let iso_a2 = props.get("ISO_A2").and_then(|v| v.as_str()).unwrap_or("");
            if name.is_empty() || iso_a2.is_empty() || iso_a2 == "-99" {
                continue;
            }

            let name_lower = name.to_lowercase();
            pairs.push((name_lower.clone(), iso_a2.to_string()));

            if name_lower.contains("united states of america") {
                for alias in ["united states", "u.s.", "usa", "america"] {
                    pairs.push((alias.to_string(), "US".to_string()));
                }
            }
            if name_lower.contains("united kingdom") {
                for alias in ["u.k.", "great britain", "britain"] {
                    pairs.push((alias.to_string(), "GB".to_string()));
                }
            }
        }

        Ok(Self::from_pairs(pairs))
    }

    /// Load a table from a GeoJSON file, degrading to an empty table with a
    /// warning when the file is missing or malformed. Country extraction is
    /// then disabled for the run, but the pipeline keeps working.
    pub fn load_or_empty(path: &str) -> Self {
        if !Path::new(path).exists() {
            warn!(path, "country GeoJSON not found; country extraction disabled");
            return Self::default();
        }
        match std::fs::read_to_string(path).map_err(Into::into).and_then(|s| Self::from_geojson_str(&s)) {
            Ok(table) => {
                info!(path, mappings = table.len(), "loaded country-ISO mappings");
                table
            }
            Err(e) => {
                warn!(path, error = %e, "failed to load country GeoJSON; country extraction disabled");
                Self::default()
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(String::as_str)
    }

    /// All known names in ascending order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Resolve the single best-guess country code for a title/body pair.
///
/// One vote per resolved place entity; the code with the most votes wins,
/// ties broken by ascending code order. Returns an empty string when nothing
/// resolves or the table is empty.
pub fn resolve_country(title: &AnnotatedDoc, body: &AnnotatedDoc, table: &CountryTable) -> String {
    if table.is_empty() {
        return String::new();
    }

    let mut votes: HashMap<String, usize> = HashMap::new();
    for entity in title.entities.iter().chain(body.entities.iter()) {
        if entity.label != EntityLabel::Place {
            continue;
        }
        let text = entity.text.trim().to_lowercase();
        if text.is_empty() {
            continue;
        }

        if let Some(code) = table.lookup(&text) {
            *votes.entry(code.to_string()).or_insert(0) += 1;
        } else {
            // Permissive fallback: first name containing the entity text, or
            // contained in it. One vote per entity occurrence.
            for name in table.names() {
                if name.contains(&text) || text.contains(name.as_str()) {
                    if let Some(code) = table.lookup(name) {
                        *votes.entry(code.to_string()).or_insert(0) += 1;
                    }
                    break;
                }
            }
        }
    }

    votes
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .next()
        .map(|(code, _)| code)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;

    fn table() -> CountryTable {
        CountryTable::from_pairs([
            ("ukraine", "UA"),
            ("russia", "RU"),
            ("united states", "US"),
            ("south korea", "KR"),
            ("france", "FR"),
        ])
    }

    fn place_doc(texts: &[&str]) -> AnnotatedDoc {
        AnnotatedDoc {
            lemmas: Vec::new(),
            entities: texts
                .iter()
                .map(|t| Entity {
                    text: t.to_string(),
                    label: EntityLabel::Place,
                })
                .collect(),
        }
    }

    #[test]
    fn test_direct_lookup_wins_majority() {
        let title = place_doc(&["Ukraine"]);
        let body = place_doc(&["Ukraine", "Russia"]);
        assert_eq!(resolve_country(&title, &body, &table()), "UA");
    }

    #[test]
    fn test_tie_breaks_by_ascending_code() {
        let title = place_doc(&["Ukraine"]);
        let body = place_doc(&["Russia"]);
        // One vote each; RU sorts before UA.
        assert_eq!(resolve_country(&title, &body, &table()), "RU");
    }

    #[test]
    fn test_fallback_name_contained_in_entity() {
        let title = place_doc(&["eastern Ukraine front"]);
        let body = place_doc(&[]);
        assert_eq!(resolve_country(&title, &body, &table()), "UA");
    }

    #[test]
    fn test_fallback_entity_contained_in_name() {
        // "korea" is a substring of the known name "south korea".
        let title = place_doc(&["Korea"]);
        let body = place_doc(&[]);
        assert_eq!(resolve_country(&title, &body, &table()), "KR");
    }

    #[test]
    fn test_non_place_entities_are_ignored() {
        let mut title = place_doc(&[]);
        title.entities.push(Entity {
            text: "France".to_string(),
            label: EntityLabel::Org,
        });
        assert_eq!(resolve_country(&title, &place_doc(&[]), &table()), "");
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let title = place_doc(&["Ukraine"]);
        assert_eq!(
            resolve_country(&title, &place_doc(&[]), &CountryTable::default()),
            ""
        );
    }

    #[test]
    fn test_geojson_parsing_with_aliases() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"properties": {"ADMIN": "United States of America", "ISO_A2": "US"}},
                {"properties": {"ADMIN": "France", "ISO_A2": "FR"}},
                {"properties": {"ADMIN": "Kosovo", "ISO_A2": "-99"}}
            ]
        }"#;
        let table = CountryTable::from_geojson_str(geojson).unwrap();
        assert_eq!(table.lookup("united states of america"), Some("US"));
        assert_eq!(table.lookup("usa"), Some("US"));
        assert_eq!(table.lookup("america"), Some("US"));
        assert_eq!(table.lookup("france"), Some("FR"));
        // Entries without a valid alpha-2 code are skipped.
        assert_eq!(table.lookup("kosovo"), None);
    }
}
