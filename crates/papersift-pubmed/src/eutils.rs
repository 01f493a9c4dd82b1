//! NCBI E-utilities client: ESearch for PMIDs, EFetch for article XML
//!
//! Blocking calls over the shared runtime in `papersift-core`, retried
//! with backoff on transient failures.

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use papersift_core::{get_text, retry_with_backoff};
use serde::Deserialize;

use crate::config::Config;

/// PMIDs per EFetch request. NCBI recommends POST above ~200 ids.
pub const EFETCH_BATCH: usize = 200;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    count: Option<String>,
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(default, rename = "ERROR")]
    error: Option<String>,
}

/// Join `base` and an endpoint name with exactly one slash.
fn endpoint(base: &str, name: &str) -> String {
    format!("{}/{name}", base.trim_end_matches('/'))
}

/// Parameters sent with every request.
fn common_params(config: &Config) -> Vec<(&'static str, String)> {
    let mut params = vec![("db", "pubmed".to_string()), ("tool", config.tool.clone())];
    if let Some(email) = &config.email {
        params.push(("email", email.clone()));
    }
    if let Some(key) = &config.api_key {
        params.push(("api_key", key.clone()));
    }
    params
}

/// Pull the id list out of an ESearch JSON body.
fn parse_search_response(body: &str) -> Result<Vec<String>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Failed to parse ESearch response")?;
    let result = response.esearchresult;

    if let Some(err) = result.error {
        bail!("ESearch error: {err}");
    }
    log::debug!(
        "ESearch: {} ids returned (total hits: {})",
        result.idlist.len(),
        result.count.as_deref().unwrap_or("?")
    );
    Ok(result.idlist)
}

/// Search PubMed for `query`, returning up to `config.max_results` PMIDs in
/// relevance order.
pub fn search_ids(config: &Config, query: &str, pb: &ProgressBar) -> Result<Vec<String>> {
    let url = endpoint(&config.base_url, "esearch.fcgi");
    let mut params = common_params(config);
    params.push(("term", query.to_string()));
    params.push(("retmax", config.max_results.to_string()));
    params.push(("retmode", "json".to_string()));

    pb.set_message(format!("searching \"{query}\""));
    let body = retry_with_backoff("esearch", pb, || get_text(&url, &params))
        .context("ESearch request failed")?;

    parse_search_response(&body)
}

/// Fetch the PubmedArticleSet XML for `ids`.
///
/// An empty id list returns an empty document without a request.
pub fn fetch_records(config: &Config, ids: &[String], pb: &ProgressBar) -> Result<String> {
    if ids.is_empty() {
        return Ok(String::new());
    }

    let url = endpoint(&config.base_url, "efetch.fcgi");
    let mut params = common_params(config);
    params.push(("id", ids.join(",")));
    params.push(("retmode", "xml".to_string()));

    pb.set_message(format!("fetching {} records", ids.len()));
    retry_with_backoff("efetch", pb, || get_text(&url, &params))
        .with_context(|| format!("EFetch request failed for {} ids", ids.len()))
}
