//! Per-paper aggregation of non-academic authorship

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::classify::AffiliationClassifier;
use crate::error::ExtractError;
use crate::extract::parse_pubmed_xml;
use crate::heuristics::company_token;
use crate::record::{OutputRecord, PaperRecord};

/// Reduce one paper to an [`OutputRecord`] if any author affiliation is
/// non-academic.
///
/// Authors are collected once each, in order, skipping unnamed authors.
/// Companies are the [`company_token`] of each non-academic affiliation,
/// kept only when the token itself still classifies as non-academic, so
/// `"Genentech, South San Francisco"` qualifies the paper without naming
/// a company.
pub fn aggregate(paper: &PaperRecord, classifier: &AffiliationClassifier) -> Option<OutputRecord> {
    let mut qualifies = false;
    let mut authors = Vec::new();
    let mut companies = Vec::new();
    let mut seen_authors = FxHashSet::default();
    let mut seen_companies = FxHashSet::default();

    for author in &paper.authors {
        for affiliation in &author.affiliations {
            if !classifier.is_non_academic(affiliation) {
                continue;
            }
            qualifies = true;

            if let Some(name) = author.name.as_deref() {
                if seen_authors.insert(name) {
                    authors.push(name.to_string());
                }
            }
            if let Some(token) = company_token(affiliation) {
                if classifier.is_non_academic(token) && seen_companies.insert(token) {
                    companies.push(token.to_string());
                }
            }
        }
    }

    if !qualifies {
        return None;
    }

    Some(OutputRecord {
        id: paper.id.clone(),
        title: paper.title.clone(),
        publication_date: paper.publication_date.clone(),
        non_academic_authors: authors,
        company_affiliations: companies,
        corresponding_email: paper.corresponding_email.clone(),
    })
}

/// Aggregate every paper independently; output keeps input order.
pub fn filter_papers(
    papers: &[PaperRecord],
    classifier: &AffiliationClassifier,
) -> Vec<OutputRecord> {
    papers
        .par_iter()
        .filter_map(|paper| {
            let record = aggregate(paper, classifier);
            if record.is_none() {
                log::debug!(
                    "{}: no non-academic affiliation",
                    paper.id.as_deref().unwrap_or("?")
                );
            }
            record
        })
        .collect()
}

/// Result of filtering one fetched document.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Papers extracted from the document
    pub papers: usize,
    /// Papers with at least one non-academic author
    pub records: Vec<OutputRecord>,
    /// Set when the document could not be parsed (and `records` is empty)
    pub diagnostic: Option<ExtractError>,
}

/// Extract and aggregate a whole EFetch document.
///
/// A malformed document is not an error here: it is logged and reported
/// as zero records with the parse error kept in `diagnostic`.
pub fn filter_document(xml: &str, classifier: &AffiliationClassifier) -> FilterOutcome {
    let papers = match parse_pubmed_xml(xml) {
        Ok(papers) => papers,
        Err(e) => {
            log::warn!("Skipping unparseable document: {e}");
            return FilterOutcome {
                diagnostic: Some(e),
                ..Default::default()
            };
        }
    };

    let records = filter_papers(&papers, classifier);
    log::debug!(
        "{} of {} papers have non-academic authors",
        records.len(),
        papers.len()
    );

    FilterOutcome {
        papers: papers.len(),
        records,
        diagnostic: None,
    }
}
