//! In-memory inverted index over a cleaned batch, with OR-only queries.
//!
//! The index maps tokens to the set of document ids containing them; a query
//! unions the id sets of its tokens and materializes the matching documents
//! in the order the underlying collection stores them. There is no ranking.

use crate::models::CleanedArticle;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// Tokenize text for indexing and querying: lower-case, strip everything
/// other than ASCII letters/digits/whitespace, split on whitespace, discard
/// tokens of length 1 or less.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = NON_ALNUM_RE.replace_all(&lowered, "");
    stripped
        .split_whitespace()
        .filter(|token| token.len() > 1)
        .map(|token| token.to_string())
        .collect()
}

/// Token to document-id-set mapping over one batch of cleaned articles.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, HashSet<usize>>,
}

impl InvertedIndex {
    /// Build an index over the concatenated title and body of each document.
    ///
    /// Document ids are positions in `documents`; queries must be run
    /// against the same collection.
    pub fn build(documents: &[CleanedArticle]) -> Self {
        let mut postings: HashMap<String, HashSet<usize>> = HashMap::new();
        for (doc_id, document) in documents.iter().enumerate() {
            let content = format!("{} {}", document.title, document.full_body);
            for token in tokenize(&content) {
                postings.entry(token).or_default().insert(doc_id);
            }
        }
        debug!(terms = postings.len(), documents = documents.len(), "built inverted index");
        Self { postings }
    }

    /// Number of distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Answer an OR-term query, returning matches in stored document order.
    ///
    /// Query tokens absent from the index contribute nothing; a query whose
    /// tokens are all absent (or that tokenizes to nothing) returns empty.
    pub fn query<'a>(
        &self,
        text: &str,
        documents: &'a [CleanedArticle],
    ) -> Vec<&'a CleanedArticle> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut matched_ids: HashSet<usize> = HashSet::new();
        let mut any_token_found = false;
        for token in &tokens {
            if let Some(ids) = self.postings.get(token) {
                any_token_found = true;
                matched_ids.extend(ids);
            }
        }
        if !any_token_found {
            return Vec::new();
        }

        documents
            .iter()
            .enumerate()
            .filter(|(doc_id, _)| matched_ids.contains(doc_id))
            .map(|(_, document)| document)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, body: &str) -> CleanedArticle {
        CleanedArticle {
            title: title.to_string(),
            published_date: None,
            url: format!("http://x/{title}"),
            body_snippet: String::new(),
            relevance_score: 2.0,
            image_url: String::new(),
            country_code: String::new(),
            full_body: body.to_string(),
        }
    }

    fn corpus() -> Vec<CleanedArticle> {
        vec![
            doc("a", "war reported near the border"),
            doc("b", "ukraine mobilizes troops"),
            doc("c", "war in ukraine escalates"),
            doc("d", "markets rally on trade news"),
        ]
    }

    #[test]
    fn test_tokenize_strips_punctuation_and_short_tokens() {
        assert_eq!(
            tokenize("War-torn region: 5 killed, 12 wounded! A.B."),
            vec!["wartorn", "region", "killed", "12", "wounded", "ab"]
        );
    }

    #[test]
    fn test_tokenize_empty_and_symbolic_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!!! ??? . .").is_empty());
        // Single-character tokens are discarded.
        assert!(tokenize("a b c").is_empty());
    }

    #[test]
    fn test_query_unions_overlapping_sets_in_stored_order() {
        let documents = corpus();
        let index = InvertedIndex::build(&documents);

        // "war" hits docs 0 and 2, "ukraine" hits docs 1 and 2.
        let results = index.query("war in ukraine", &documents);
        let titles: Vec<&str> = results.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_query_with_no_known_tokens_is_empty() {
        let documents = corpus();
        let index = InvertedIndex::build(&documents);
        assert!(index.query("volcano eruption", &documents).is_empty());
    }

    #[test]
    fn test_query_that_tokenizes_to_nothing_is_empty() {
        let documents = corpus();
        let index = InvertedIndex::build(&documents);
        assert!(index.query("? !", &documents).is_empty());
    }

    #[test]
    fn test_unknown_tokens_do_not_shrink_results() {
        let documents = corpus();
        let index = InvertedIndex::build(&documents);

        // OR semantics: an unknown token alongside a known one is ignored.
        let results = index.query("war zzzunknown", &documents);
        let titles: Vec<&str> = results.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_title_text_is_indexed() {
        let documents = vec![doc("exclusive", "body text without the word")];
        let index = InvertedIndex::build(&documents);
        assert_eq!(index.query("exclusive", &documents).len(), 1);
    }
}
