//! Relevance scoring over annotated title/body pairs.
//!
//! The score combines three signals:
//! 1. Weighted keyword-group hits. Each keyword phrase is searched in the
//!    title and body lemma sequences independently; a title hit is worth
//!    `weight * title_multiplier`, a body hit `weight`, at most one hit per
//!    keyword per field.
//! 2. A flat entity bonus: `weight * 0.2` for every tagged entity whose
//!    label appears in a group's tag set, per qualifying group.
//! 3. Negative-phrase penalties matched as exact space-delimited phrases
//!    against the joined title+body lemma string.
//!
//! Phrase matching is order-preserving containment over lemma windows; it
//! tolerates the removal of stop words and punctuation without any fuzzy
//! matching, so the score is deterministic and reproducible.

use crate::models::{AnnotatedDoc, KeywordGroup};
use std::collections::BTreeMap;

/// Entity hits count for a fraction of the group weight.
const ENTITY_BONUS_FACTOR: f64 = 0.2;

/// Compute the relevance score for an annotated (title, body) pair.
///
/// The result is clamped to a minimum of 0.
pub fn score(
    title: &AnnotatedDoc,
    body: &AnnotatedDoc,
    groups: &[KeywordGroup],
    negatives: &BTreeMap<String, f64>,
    title_multiplier: f64,
) -> f64 {
    let mut total = 0.0;

    for group in groups {
        let mut group_score = 0.0;
        for keyword in &group.keywords {
            let phrase = keyword.to_lowercase();
            if phrase_in_lemmas(&title.lemmas, &phrase) {
                group_score += group.weight * title_multiplier;
            }
            if phrase_in_lemmas(&body.lemmas, &phrase) {
                group_score += group.weight;
            }
        }
        total += group_score;
    }

    for entity in title.entities.iter().chain(body.entities.iter()) {
        for group in groups {
            if group.entity_tags.contains(&entity.label) {
                total += group.weight * ENTITY_BONUS_FACTOR;
            }
        }
    }

    let joined = padded_lemma_string(title, body);
    for (phrase, penalty) in negatives {
        if joined.contains(&format!(" {} ", phrase.to_lowercase())) {
            total += penalty;
        }
    }

    total.max(0.0)
}

/// Search a lemma sequence for a phrase as a contiguous sub-sequence.
///
/// The window length equals the phrase's word count; windows are joined with
/// single spaces and checked for substring containment, so a phrase can also
/// match inside a longer lemma at the window edge.
fn phrase_in_lemmas(lemmas: &[String], phrase: &str) -> bool {
    let width = phrase.split_whitespace().count().max(1);
    (0..lemmas.len()).any(|i| {
        let end = (i + width).min(lemmas.len());
        lemmas[i..end].join(" ").contains(phrase)
    })
}

/// Space-padded, space-joined lemma string of title followed by body, used
/// for exact negative-phrase matching.
fn padded_lemma_string(title: &AnnotatedDoc, body: &AnnotatedDoc) -> String {
    let all: Vec<&str> = title
        .lemmas
        .iter()
        .chain(body.lemmas.iter())
        .map(String::as_str)
        .collect();
    format!(" {} ", all.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::models::{Entity, EntityLabel};

    fn doc(lemmas: &[&str]) -> AnnotatedDoc {
        AnnotatedDoc {
            lemmas: lemmas.iter().map(|s| s.to_string()).collect(),
            entities: Vec::new(),
        }
    }

    #[test]
    fn test_phrase_single_word() {
        assert!(phrase_in_lemmas(
            &["ukraine".into(), "war".into(), "escalates".into()],
            "war"
        ));
        assert!(!phrase_in_lemmas(&["peace".into(), "talks".into()], "war"));
    }

    #[test]
    fn test_phrase_multiword_contiguous() {
        let lemmas: Vec<String> = ["humanitarian", "crisis", "deepens"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(phrase_in_lemmas(&lemmas, "humanitarian crisis"));
        // Non-adjacent words do not match.
        let gapped: Vec<String> = ["humanitarian", "aid", "crisis"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(!phrase_in_lemmas(&gapped, "humanitarian crisis"));
    }

    #[test]
    fn test_combat_article_scores_above_threshold() {
        let cfg = PipelineConfig::default();
        // "Ukraine war escalates as troops mobilize"
        let title = doc(&["ukraine", "war", "escalates", "troops", "mobilize"]);
        // "Military forces report fighting and casualties near the border."
        let body = doc(&[
            "military", "forces", "report", "fighting", "casualties", "near", "border",
        ]);

        let s = score(
            &title,
            &body,
            &cfg.keyword_groups,
            &cfg.negative_keywords,
            cfg.title_multiplier,
        );
        // direct_combat: "war" in title (4.5) + "fighting" in body (3.0);
        // military_ops: "troops" in title (3.0), "military" + "forces" in
        // body (4.0); casualties_impact: "casualties" in body (2.5).
        assert!((s - 17.0).abs() < 1e-9);
        assert!(s > cfg.relevance_threshold);
    }

    #[test]
    fn test_negative_keywords_drive_score_to_zero() {
        let cfg = PipelineConfig::default();
        // "Local peace talks resume" / "A peace agreement reached today in the region."
        let title = doc(&["local", "peace", "talks", "resume"]);
        let body = doc(&["peace", "agreement", "reached", "today", "region"]);

        let s = score(
            &title,
            &body,
            &cfg.keyword_groups,
            &cfg.negative_keywords,
            cfg.title_multiplier,
        );
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_entity_bonus_is_flat_per_group() {
        let groups = vec![
            KeywordGroup {
                name: "combat".to_string(),
                keywords: vec!["war".to_string()],
                weight: 3.0,
                entity_tags: vec![EntityLabel::Place, EntityLabel::Event],
            },
            KeywordGroup {
                name: "context".to_string(),
                keywords: vec!["territory".to_string()],
                weight: 1.0,
                entity_tags: vec![EntityLabel::Place],
            },
        ];
        let mut title = doc(&[]);
        title.entities.push(Entity {
            text: "Ukraine".to_string(),
            label: EntityLabel::Place,
        });
        let body = doc(&[]);

        let s = score(&title, &body, &groups, &BTreeMap::new(), 1.5);
        // One Place entity qualifies for both groups: 3.0*0.2 + 1.0*0.2.
        assert!((s - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_title_and_body_hits_are_independent() {
        let groups = vec![KeywordGroup {
            name: "combat".to_string(),
            keywords: vec!["war".to_string()],
            weight: 2.0,
            entity_tags: Vec::new(),
        }];
        let title = doc(&["war"]);
        let body = doc(&["war", "war"]);

        // Title fires once (boosted), body fires once regardless of repeats.
        let s = score(&title, &body, &groups, &BTreeMap::new(), 1.5);
        assert!((s - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_never_negative() {
        let mut negatives = BTreeMap::new();
        negatives.insert("sports match".to_string(), -3.0);
        let title = doc(&["sports", "match", "tonight"]);
        let body = doc(&["final", "score"]);

        let s = score(&title, &body, &[], &negatives, 1.5);
        assert_eq!(s, 0.0);
    }
}
