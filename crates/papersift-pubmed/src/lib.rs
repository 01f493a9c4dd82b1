//! Papersift PubMed - find papers with industry-affiliated authors
//!
//! Searches PubMed through NCBI E-utilities, extracts article metadata
//! from the EFetch XML and keeps the papers where at least one author
//! lists a non-academic (company) affiliation.
//!
//! # Features
//!
//! - Streaming XML extraction with quick-xml
//! - Configurable whole-word indicator terms for classification
//! - Per-paper aggregation in parallel with rayon
//!
//! # Example
//!
//! ```ignore
//! use papersift_pubmed::{AffiliationClassifier, filter_document};
//!
//! let classifier = AffiliationClassifier::default();
//! let outcome = filter_document(&xml, &classifier);
//! for record in &outcome.records {
//!     println!("{:?}", record.to_row());
//! }
//! ```

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod eutils;
pub mod extract;
pub mod heuristics;
pub mod record;
pub mod runner;

// Re-exports
pub use aggregate::{FilterOutcome, aggregate, filter_document, filter_papers};
pub use classify::{AffiliationClassifier, DEFAULT_INDICATORS};
pub use config::Config;
pub use error::ExtractError;
pub use extract::parse_pubmed_xml;
pub use record::{AuthorRecord, COLUMNS, NOT_AVAILABLE, OutputRecord, PaperRecord};
pub use runner::{Summary, run};
