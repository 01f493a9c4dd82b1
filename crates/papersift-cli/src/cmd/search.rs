//! Search subcommand - find papers with non-academic authors

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use papersift_core::{SharedProgress, fmt_num};

use crate::config::Config;
use crate::report;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// PubMed query (full PubMed search syntax)
    pub query: String,

    /// Write results to this file instead of printing a table
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Maximum number of PubMed ids to retrieve
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,
}

pub fn run(args: SearchArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let pm_config = config.pubmed(args.max_results);

    log::info!("Query: {}", args.query);
    log::info!("  Max results: {}", pm_config.max_results);

    let (summary, records) = papersift_pubmed::run(&args.query, &pm_config, progress)?;

    progress.println(format!(
        "{} of {} papers have non-academic authors ({:.1}s)",
        fmt_num(summary.matched),
        fmt_num(summary.papers),
        summary.elapsed.as_secs_f64()
    ));
    if summary.failed_batches > 0 {
        progress.println(format!(
            "Warning: {} fetch batch(es) failed; results are incomplete",
            summary.failed_batches
        ));
    }

    if records.is_empty() {
        progress.println(no_results_message(args.file.as_deref()));
        return Ok(());
    }

    match args.file {
        Some(path) => {
            report::write_file(&path, &records, config.output.delimiter)?;
            progress.println(format!(
                "Saved {} papers to {}",
                fmt_num(records.len()),
                path.display()
            ));
        }
        None => println!("{}", report::render_table(&records)),
    }

    Ok(())
}

fn no_results_message(file: Option<&Path>) -> String {
    match file {
        Some(path) => format!(
            "No papers with non-academic authors found; {} not written.",
            path.display()
        ),
        None => "No papers with non-academic authors found.".to_string(),
    }
}
