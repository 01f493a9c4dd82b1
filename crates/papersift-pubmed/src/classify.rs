//! Academic vs. non-academic affiliation classification
//!
//! An affiliation is non-academic when it contains one of the indicator
//! terms as a whole word, case-insensitively. Nothing else counts: there
//! are no academic keywords that override a hit, and no hit means academic.

use regex::{Regex, RegexBuilder};

/// Indicator terms used when no configuration overrides them.
pub const DEFAULT_INDICATORS: &[&str] = &[
    "company", "industry", "pharma", "inc.", "corp.", "llc", "ltd.", "private", "biotech",
];

/// Keyword classifier over a configurable set of indicator terms.
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    terms: Vec<String>,
    /// `None` when the term set is empty
    pattern: Option<Regex>,
}

impl AffiliationClassifier {
    /// Build from indicator terms. Terms are trimmed and lower-cased; blank
    /// terms are dropped.
    pub fn new<I, S>(terms: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !normalized.contains(&term) {
                normalized.push(term);
            }
        }

        let pattern = if normalized.is_empty() {
            None
        } else {
            let alternation = normalized
                .iter()
                .map(|t| whole_word(t))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&alternation)
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self {
            terms: normalized,
            pattern,
        })
    }

    /// True if `affiliation` contains an indicator term as a whole word.
    pub fn is_non_academic(&self, affiliation: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|re| re.is_match(affiliation))
    }

    /// The normalized indicator terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_INDICATORS).expect("default indicators are valid patterns")
    }
}

/// Regex for `term` as a whole word.
///
/// A word boundary is only required on a side where the term itself ends in
/// a word character, so `inc.` matches at its literal period.
fn whole_word(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if term.starts_with(is_word) { r"\b" } else { "" };
    let trail = if term.ends_with(is_word) { r"\b" } else { "" };
    format!("{lead}{}{trail}", regex::escape(term))
}
