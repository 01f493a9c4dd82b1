//! papersift - find PubMed papers with industry-affiliated authors
//!
//! Searches PubMed, extracts author affiliations and reports the papers
//! where at least one author works for a company.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod report;

use config::Config;

#[derive(Parser)]
#[command(name = "papersift")]
#[command(about = "Find PubMed papers with non-academic (industry) authors")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Config file path (default: ./papersift.toml or ~/.config/papersift/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Search PubMed and report papers with non-academic authors
    Search(cmd::search::SearchArgs),
    /// Classify affiliation strings as academic or non-academic
    Classify(cmd::classify::ClassifyArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(papersift_core::ProgressContext::new());

    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    papersift_core::init_logging(false, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Config file defaults, CLI overrides
    papersift_core::set_http_config(papersift_core::HttpConfig {
        timeout: std::time::Duration::from_secs(cli.timeout.unwrap_or(config.http.timeout)),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
    });

    match cli.command {
        Command::Search(args) => cmd::search::run(args, &config, &progress),
        Command::Classify(args) => cmd::classify::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["E-utilities URL", &config.eutils.base_url]);
            table.add_row(vec![
                "Max results",
                &config.eutils.max_results.to_string(),
            ]);
            table.add_row(vec![
                "API key",
                if config.eutils.api_key.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec!["Tool", &config.eutils.tool]);
            table.add_row(vec![
                "Email",
                config.eutils.email.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec!["Timeout", &format!("{}s", config.http.timeout)]);
            table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);
            table.add_row(vec![
                "Indicators",
                &config.classifier.indicators.join(", "),
            ]);
            table.add_row(vec![
                "Delimiter",
                &format!("{:?}", config.output.delimiter),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
