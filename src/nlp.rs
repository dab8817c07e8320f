//! Language-analysis contract and the built-in lexicon backend.
//!
//! Scoring and country resolution consume [`AnnotatedDoc`]s: an ordered lemma
//! sequence plus tagged entity spans. The [`Annotator`] trait is the seam for
//! whatever backend produces them; a model-backed NER pipeline can be dropped
//! in behind it without touching the scorer.
//!
//! The default backend, [`LexiconAnalyzer`], is deliberately small and fully
//! deterministic: regex word tokenization, a static stop-word set, an
//! irregular-form lemma lexicon with pass-through for everything else, and
//! gazetteer-driven place tagging. Regular plural suffixes are NOT stripped;
//! the configured keyword phrases are surface forms and must stay matchable.

use crate::models::{AnnotatedDoc, Entity, EntityLabel};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Default maximum input length, in characters, accepted by an annotator.
pub const DEFAULT_MAX_ANALYSIS_LEN: usize = 1_000_000;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)?").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "down", "during", "each", "few",
        "for", "from", "further", "had", "has", "have", "he", "her", "here", "hers", "him", "his",
        "how", "i", "if", "in", "into", "is", "it", "its", "just", "more", "most", "my", "no",
        "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "out",
        "over", "own", "she", "should", "so", "some", "such", "than", "that", "the", "their",
        "them", "then", "there", "these", "they", "this", "those", "through", "to", "too",
        "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
        "while", "who", "whom", "why", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Irregular forms only. Regular inflection is passed through untouched so
/// surface-form keyword phrases keep matching the lemma stream.
static LEMMA_EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("went", "go"),
        ("gone", "go"),
        ("said", "say"),
        ("says", "say"),
        ("made", "make"),
        ("took", "take"),
        ("taken", "take"),
        ("got", "get"),
        ("gotten", "get"),
        ("came", "come"),
        ("saw", "see"),
        ("seen", "see"),
        ("began", "begin"),
        ("begun", "begin"),
        ("held", "hold"),
        ("left", "leave"),
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("people", "people"),
    ]
    .into_iter()
    .collect()
});

/// A language-analysis backend.
///
/// Implementations produce an [`AnnotatedDoc`] from raw text and advertise
/// the maximum input length they accept. Callers go through
/// [`Annotator::annotate_capped`], which enforces the truncation contract at
/// a character boundary before handing the text to the backend.
pub trait Annotator {
    /// Maximum accepted input length in characters.
    fn max_len(&self) -> usize;

    /// Annotate `text`, which is guaranteed to be within [`Annotator::max_len`].
    fn annotate(&self, text: &str) -> AnnotatedDoc;

    /// Annotate `text`, truncating it to [`Annotator::max_len`] characters first.
    fn annotate_capped(&self, text: &str) -> AnnotatedDoc {
        match text.char_indices().nth(self.max_len()) {
            Some((byte_idx, _)) => self.annotate(&text[..byte_idx]),
            None => self.annotate(text),
        }
    }
}

/// Deterministic lexicon-based annotator.
///
/// Lemmas: every word token, lower-cased, possessive suffix stripped, stop
/// words and non-alphabetic tokens removed, irregular forms mapped through
/// [`LEMMA_EXCEPTIONS`]. Entities: greedy longest-match of the place
/// gazetteer over token windows, tagged [`EntityLabel::Place`].
pub struct LexiconAnalyzer {
    places: HashSet<String>,
    max_place_words: usize,
    max_len: usize,
}

impl LexiconAnalyzer {
    /// Analyzer with an empty gazetteer; produces lemmas but no entities.
    pub fn new() -> Self {
        Self::with_gazetteer(std::iter::empty::<String>())
    }

    /// Analyzer whose place gazetteer is the given set of names.
    ///
    /// Names are matched case-insensitively; multi-word names match across
    /// token boundaries.
    pub fn with_gazetteer<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let places: HashSet<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        let max_place_words = places
            .iter()
            .map(|n| n.split_whitespace().count())
            .max()
            .unwrap_or(1);
        Self {
            places,
            max_place_words,
            max_len: DEFAULT_MAX_ANALYSIS_LEN,
        }
    }

    fn lemma_of(word: &str) -> Option<String> {
        let mut w = word.to_lowercase();
        if let Some(stripped) = w.strip_suffix("'s") {
            w = stripped.to_string();
        }
        // Contractions other than possessives carry no keyword signal.
        if w.is_empty() || w.contains('\'') {
            return None;
        }
        if STOP_WORDS.contains(w.as_str()) {
            return None;
        }
        Some(
            LEMMA_EXCEPTIONS
                .get(w.as_str())
                .map(|l| l.to_string())
                .unwrap_or(w),
        )
    }

    fn tag_places(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();
        if self.places.is_empty() {
            return entities;
        }

        let tokens: Vec<regex::Match> = WORD_RE.find_iter(text).collect();
        let lowered: Vec<String> = tokens.iter().map(|m| m.as_str().to_lowercase()).collect();

        let mut i = 0;
        while i < tokens.len() {
            let mut matched = false;
            let widest = self.max_place_words.min(tokens.len() - i);
            for width in (1..=widest).rev() {
                let window = lowered[i..i + width].join(" ");
                if self.places.contains(&window) {
                    let span = &text[tokens[i].start()..tokens[i + width - 1].end()];
                    entities.push(Entity {
                        text: span.to_string(),
                        label: EntityLabel::Place,
                    });
                    i += width;
                    matched = true;
                    break;
                }
            }
            if !matched {
                i += 1;
            }
        }
        entities
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for LexiconAnalyzer {
    fn max_len(&self) -> usize {
        self.max_len
    }

    fn annotate(&self, text: &str) -> AnnotatedDoc {
        let lemmas = WORD_RE
            .find_iter(text)
            .filter_map(|m| Self::lemma_of(m.as_str()))
            .collect();
        AnnotatedDoc {
            lemmas,
            entities: self.tag_places(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lemmas_filter_stop_words_and_numbers() {
        let analyzer = LexiconAnalyzer::new();
        let doc = analyzer.annotate("The 300 troops were deployed near the border.");
        assert_eq!(doc.lemmas, vec!["troops", "deployed", "near", "border"]);
    }

    #[test]
    fn test_irregular_forms_are_lemmatized() {
        let analyzer = LexiconAnalyzer::new();
        let doc = analyzer.annotate("Officials said children went home");
        assert_eq!(doc.lemmas, vec!["officials", "say", "child", "go", "home"]);
    }

    #[test]
    fn test_possessive_suffix_is_stripped() {
        let analyzer = LexiconAnalyzer::new();
        let doc = analyzer.annotate("Ukraine's military");
        assert_eq!(doc.lemmas, vec!["ukraine", "military"]);
    }

    #[test]
    fn test_gazetteer_tags_places() {
        let analyzer = LexiconAnalyzer::with_gazetteer(["ukraine", "south korea"]);
        let doc = analyzer.annotate("Talks between Ukraine and South Korea resumed.");
        assert_eq!(doc.entities.len(), 2);
        assert_eq!(doc.entities[0].text, "Ukraine");
        assert_eq!(doc.entities[0].label, EntityLabel::Place);
        assert_eq!(doc.entities[1].text, "South Korea");
    }

    #[test]
    fn test_longest_gazetteer_match_wins() {
        let analyzer = LexiconAnalyzer::with_gazetteer(["korea", "south korea"]);
        let doc = analyzer.annotate("South Korea responded.");
        assert_eq!(doc.entities.len(), 1);
        assert_eq!(doc.entities[0].text, "South Korea");
    }

    #[test]
    fn test_annotate_capped_truncates_input() {
        let mut analyzer = LexiconAnalyzer::new();
        analyzer.max_len = 12;
        let doc = analyzer.annotate_capped("military offensive escalates");
        // The cap cuts mid-word; "off" is a stop word, so only the first
        // token survives.
        assert_eq!(doc.lemmas, vec!["military"]);
    }

    #[test]
    fn test_empty_input_yields_empty_doc() {
        let analyzer = LexiconAnalyzer::new();
        let doc = analyzer.annotate("");
        assert!(doc.lemmas.is_empty());
        assert!(doc.entities.is_empty());
    }
}
