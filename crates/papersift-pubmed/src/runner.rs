//! Main runner for the search pipeline

use std::time::Instant;

use anyhow::{Context, Result, bail};
use papersift_core::{ProgressContext, fmt_num};

use crate::aggregate::filter_document;
use crate::classify::AffiliationClassifier;
use crate::config::Config;
use crate::eutils::{EFETCH_BATCH, fetch_records, search_ids};
use crate::record::OutputRecord;

/// Pipeline execution summary
#[derive(Debug, Default)]
pub struct Summary {
    /// PMIDs returned by the search
    pub ids: usize,
    /// Papers extracted from the fetched XML
    pub papers: usize,
    /// Papers with at least one non-academic author
    pub matched: usize,
    /// Fetched batches that could not be parsed
    pub malformed_batches: usize,
    /// Batches whose EFetch request failed after retries
    pub failed_batches: usize,
    pub elapsed: std::time::Duration,
}

/// Search, fetch, extract and filter. Returns the qualifying records in
/// search order.
pub fn run(
    query: &str,
    config: &Config,
    progress: &ProgressContext,
) -> Result<(Summary, Vec<OutputRecord>)> {
    let start = Instant::now();

    let classifier = AffiliationClassifier::new(&config.indicators)
        .context("Invalid non-academic indicator terms")?;
    log::debug!("Indicators: {}", classifier.terms().join(", "));

    let pb = progress.stage_line("search");
    log::info!("Searching PubMed for \"{query}\"...");
    let ids = search_ids(config, query, &pb)?;
    pb.finish_with_message(format!("{} ids", fmt_num(ids.len())));
    log::debug!("PMIDs: {ids:?}");

    let pb = progress.stage_line("fetch");
    let (mut summary, records) = collect_batches(&ids, &classifier, |batch| {
        fetch_records(config, batch, &pb)
    })?;
    pb.finish_with_message(format!("{} papers", fmt_num(summary.papers)));

    summary.matched = records.len();
    summary.elapsed = start.elapsed();

    log::info!("=== PubMed Search Summary ===");
    log::info!(
        "Papers: {} fetched from {} ids, {} with non-academic authors",
        fmt_num(summary.papers),
        fmt_num(summary.ids),
        fmt_num(summary.matched)
    );
    if summary.failed_batches > 0 {
        log::warn!(
            "{} batch(es) could not be fetched and were skipped",
            summary.failed_batches
        );
    }
    if summary.malformed_batches > 0 {
        log::warn!(
            "{} fetched batch(es) were not valid XML and were skipped",
            summary.malformed_batches
        );
    }
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok((summary, records))
}

/// Fetch and filter `ids` in EFetch-sized batches, keeping search order.
///
/// A batch that fails to fetch or parse is counted and skipped. The run
/// fails only when there were ids to fetch and every batch failed.
fn collect_batches<F>(
    ids: &[String],
    classifier: &AffiliationClassifier,
    mut fetch: F,
) -> Result<(Summary, Vec<OutputRecord>)>
where
    F: FnMut(&[String]) -> Result<String>,
{
    let mut summary = Summary {
        ids: ids.len(),
        ..Default::default()
    };
    let mut records = Vec::new();
    let mut batches = 0;
    let mut last_error = None;

    for batch in ids.chunks(EFETCH_BATCH) {
        batches += 1;
        let xml = match fetch(batch) {
            Ok(xml) => xml,
            Err(e) => {
                log::warn!(
                    "Skipping batch of {} ids starting at {}: {e:#}",
                    batch.len(),
                    batch[0]
                );
                summary.failed_batches += 1;
                last_error = Some(e);
                continue;
            }
        };
        let outcome = filter_document(&xml, classifier);
        if outcome.diagnostic.is_some() {
            summary.malformed_batches += 1;
        }
        summary.papers += outcome.papers;
        records.extend(outcome.records);
    }

    if batches > 0 && summary.failed_batches == batches {
        if let Some(e) = last_error {
            return Err(e.context(format!("All {batches} EFetch batch(es) failed")));
        }
        bail!("All {batches} EFetch batch(es) failed");
    }

    Ok((summary, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(pmid: &str, affiliation: &str) -> String {
        format!(
            r#"<PubmedArticle><MedlineCitation><PMID>{pmid}</PMID><Article>
<ArticleTitle>Paper {pmid}</ArticleTitle>
<AuthorList><Author><LastName>Lee</LastName><ForeName>Ann</ForeName>
<AffiliationInfo><Affiliation>{affiliation}</Affiliation></AffiliationInfo>
</Author></AuthorList></Article></MedlineCitation></PubmedArticle>"#
        )
    }

    fn document(pmids: &[String]) -> String {
        let body: String = pmids
            .iter()
            .map(|id| {
                let n: u64 = id.parse().unwrap();
                if n % 2 == 0 {
                    article(id, "Acme Pharma Inc., Boston, MA")
                } else {
                    article(id, "Dept. of Biology, State University")
                }
            })
            .collect();
        format!("<PubmedArticleSet>{body}</PubmedArticleSet>")
    }

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    fn matched_ids(records: &[OutputRecord]) -> Vec<String> {
        records.iter().filter_map(|r| r.id.clone()).collect()
    }

    #[test]
    fn all_batches_succeed() {
        let ids = ids(EFETCH_BATCH + 10);
        let mut calls = 0;
        let (summary, records) =
            collect_batches(&ids, &AffiliationClassifier::default(), |batch| {
                calls += 1;
                Ok(document(batch))
            })
            .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(summary.ids, EFETCH_BATCH + 10);
        assert_eq!(summary.papers, EFETCH_BATCH + 10);
        assert_eq!(records.len(), (EFETCH_BATCH + 10) / 2);
        assert_eq!(summary.failed_batches, 0);
        assert_eq!(summary.malformed_batches, 0);
    }

    #[test]
    fn failed_and_malformed_batches_are_skipped() {
        let ids = ids(EFETCH_BATCH * 3);
        let mut call = 0;
        let (summary, records) =
            collect_batches(&ids, &AffiliationClassifier::default(), |batch| {
                call += 1;
                match call {
                    2 => Ok("<PubmedArticleSet><PubmedArticle>".to_string()),
                    3 => Err(anyhow::anyhow!("HTTP 503: service unavailable")),
                    _ => Ok(document(batch)),
                }
            })
            .unwrap();

        assert_eq!(summary.failed_batches, 1);
        assert_eq!(summary.malformed_batches, 1);
        assert_eq!(summary.papers, EFETCH_BATCH);

        let expected: Vec<String> = ids[..EFETCH_BATCH]
            .iter()
            .filter(|id| id.parse::<u64>().unwrap() % 2 == 0)
            .cloned()
            .collect();
        assert_eq!(matched_ids(&records), expected);
    }

    #[test]
    fn later_batches_survive_an_early_failure() {
        let ids = ids(EFETCH_BATCH * 2);
        let mut call = 0;
        let (summary, records) =
            collect_batches(&ids, &AffiliationClassifier::default(), |batch| {
                call += 1;
                if call == 1 {
                    Err(anyhow::anyhow!("request timed out after 30s"))
                } else {
                    Ok(document(batch))
                }
            })
            .unwrap();

        assert_eq!(summary.failed_batches, 1);
        assert_eq!(summary.papers, EFETCH_BATCH);
        let first = records.first().and_then(|r| r.id.clone());
        assert_eq!(first.as_deref(), Some(ids[EFETCH_BATCH + 1].as_str()));
    }

    #[test]
    fn every_batch_failing_is_an_error() {
        let ids = ids(EFETCH_BATCH + 1);
        let err = collect_batches(&ids, &AffiliationClassifier::default(), |_| {
            Err(anyhow::anyhow!("HTTP 503: service unavailable"))
        })
        .unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("All 2 EFetch batch(es) failed"));
        assert!(message.contains("HTTP 503"));
    }

    #[test]
    fn no_ids_is_not_an_error() {
        let (summary, records) =
            collect_batches(&[], &AffiliationClassifier::default(), |_| {
                panic!("no request expected")
            })
            .unwrap();
        assert_eq!(summary.ids, 0);
        assert!(records.is_empty());
    }
}
