//! Completion-date phrase normalization.

use chrono::NaiveDate;
use regex::Regex;

/// Finds the visible completion-date phrase and normalizes it to ISO form.
///
/// Recognizes exactly one phrasing: "on <month name> <day>, <4-digit year>"
/// (e.g. "on april 29, 2024" after text normalization). Documents using any
/// other date wording fail the date predicate. Documented behavior, not a
/// bug to fix here.
pub struct VisibleDateFinder {
    phrase: Regex,
}

impl VisibleDateFinder {
    pub fn new() -> Self {
        Self {
            // Input text is already lowercased by normalization.
            phrase: Regex::new(r"on ([a-z]+ \d{1,2}, \d{4})").unwrap(),
        }
    }

    /// First date phrase in the normalized visible text, reformatted to
    /// `YYYY-MM-DD`. `None` when no phrase is present or the phrase does
    /// not parse as a real month/day/year.
    pub fn find_normalized(&self, visible_text: &str) -> Option<String> {
        let caps = self.phrase.captures(visible_text)?;
        normalize_date_phrase(caps.get(1)?.as_str())
    }
}

impl Default for VisibleDateFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a "<month name> <day>, <year>" phrase into ISO `YYYY-MM-DD`.
pub fn normalize_date_phrase(phrase: &str) -> Option<String> {
    NaiveDate::parse_from_str(phrase, "%B %d, %Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}
