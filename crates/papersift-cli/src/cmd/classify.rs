//! Classify subcommand - check affiliation strings against the indicator set

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use papersift_pubmed::AffiliationClassifier;
use papersift_pubmed::heuristics::company_token;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Affiliation strings to classify
    #[arg(required = true)]
    pub affiliations: Vec<String>,
}

/// One result row: affiliation, verdict, company captured for the report.
fn classify_row(classifier: &AffiliationClassifier, affiliation: &str) -> [String; 3] {
    let non_academic = classifier.is_non_academic(affiliation);
    let company = company_token(affiliation)
        .filter(|token| non_academic && classifier.is_non_academic(token))
        .unwrap_or(papersift_pubmed::NOT_AVAILABLE);
    [
        affiliation.to_string(),
        if non_academic { "non-academic" } else { "academic" }.to_string(),
        company.to_string(),
    ]
}

pub fn run(args: ClassifyArgs, config: &Config) -> Result<()> {
    let classifier = AffiliationClassifier::new(&config.classifier.indicators)
        .context("Invalid non-academic indicator terms")?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Affiliation").fg(Color::Cyan),
            Cell::new("Class").fg(Color::Cyan),
            Cell::new("Company").fg(Color::Cyan),
        ]);
    for affiliation in &args.affiliations {
        table.add_row(classify_row(&classifier, affiliation));
    }

    println!("{table}");
    Ok(())
}
