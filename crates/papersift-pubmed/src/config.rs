//! PubMed pipeline configuration

use crate::classify::DEFAULT_INDICATORS;

/// Runtime configuration for the PubMed search pipeline
#[derive(Debug, Clone)]
pub struct Config {
    /// E-utilities base URL (esearch.fcgi / efetch.fcgi live under it)
    pub base_url: String,
    /// Maximum PMIDs requested from ESearch
    pub max_results: usize,
    /// NCBI API key (raises the rate limit from 3 to 10 requests/s)
    pub api_key: Option<String>,
    /// `tool` parameter NCBI asks clients to send
    pub tool: String,
    /// Contact `email` parameter NCBI asks clients to send
    pub email: Option<String>,
    /// Non-academic indicator terms for the classifier
    pub indicators: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/".to_string(),
            max_results: 20,
            api_key: None,
            tool: "papersift".to_string(),
            email: None,
            indicators: DEFAULT_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
