//! Text normalization: markup stripping, canonical dates, bounded snippets.
//!
//! Everything here is best-effort and total: malformed input produces an
//! empty string or `None`, never an error. Dates are reduced to a canonical
//! `YYYY-MM-DD` calendar form with any time-of-day information discarded.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use scraper::Html;

/// Remove markup tags and collapse whitespace, returning plain text.
///
/// Plain-text input passes through unchanged apart from whitespace
/// collapsing. Empty or whitespace-only input yields an empty string.
pub fn strip_markup(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best-effort parse of loosely formatted date-like text into `YYYY-MM-DD`.
///
/// Accepts RFC 3339 / RFC 2822 timestamps (meta tags, feed `pubDate`), the
/// crawler's `YYYY-MM-DD HH:MM:SS` form, bare dates, and spelled-out month
/// forms. Returns `None` on anything unparseable. Idempotent: applying it to
/// its own output returns the same string.
pub fn to_canonical_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| DateTime::parse_from_rfc2822(raw).map(|dt| dt.date_naive()))
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })?;

    Some(date.format("%Y-%m-%d").to_string())
}

/// Truncate `text` to at most `max_len` characters without splitting a word.
///
/// Within-bound input is returned unchanged (apart from edge trimming).
/// Otherwise the text is cut at `max_len` and backed up to the last
/// whitespace boundary, with an ellipsis marker appended; if the truncated
/// prefix has no whitespace at all, it is cut hard.
pub fn make_snippet(text: &str, max_len: usize) -> String {
    let text = text.trim();
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }

    let prefix: String = chars[..max_len].iter().collect();
    match prefix.rfind(' ') {
        Some(pos) if pos > 0 => format!("{}...", &prefix[..pos]),
        _ => format!("{}...", prefix),
    }
}
