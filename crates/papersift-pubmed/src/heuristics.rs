//! Best-effort text scraping over affiliation strings
//!
//! Both functions are heuristics with known failure modes; see the docs on
//! each. Changing what they match changes the report, so keep them simple.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("valid regex"));

/// First email-like token across `affiliations`, in iteration order.
///
/// Matches `[\w.-]+@[\w.-]+` and nothing smarter. Failure modes:
/// - a sentence period right after the address is kept (`"a@b.org."`)
/// - the first address found need not be the corresponding author's
pub fn first_email<'a>(affiliations: impl IntoIterator<Item = &'a str>) -> Option<String> {
    affiliations
        .into_iter()
        .find_map(|aff| EMAIL.find(aff))
        .map(|m| m.as_str().to_string())
}

/// Employer name guess: the text before the first comma, trimmed.
///
/// `None` if that prefix is blank. Failure modes: department-first
/// affiliations (`"R&D, Acme Corp."`) yield the department, and names
/// containing a comma are cut short.
pub fn company_token(affiliation: &str) -> Option<&str> {
    let head = affiliation
        .split_once(',')
        .map_or(affiliation, |(head, _)| head)
        .trim();
    (!head.is_empty()).then_some(head)
}
