use anyhow::Result;
use clap::{Parser, Subcommand};
use docline::harness::{HarnessOptions, run_harness};
use docline::pipeline::{
    ExtractOptions, FetchOptions, IdentifyOptions, ValidateOptions, extract_books, fetch_books,
    identify_titles, validate_config,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docline", about = "Historical-document e-book scraping pipeline")]
struct Cli {
    #[arg(long, default_value = "configs/docline.toml")]
    config: PathBuf,

    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, default_value = "data/book")]
    work_dir: PathBuf,

    #[arg(long, default_value = "data/out")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the e-book catalog and every listed book.
    Fetch,
    /// Unpack downloaded books and scrape their pages into the records CSV.
    Extract {
        #[arg(long)]
        book: Option<String>,
    },
    /// Classify extracted titles against the country reference lists.
    Identify {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Check a configuration file.
    Validate {
        #[arg(long)]
        config_file: Option<PathBuf>,
    },
    /// Run extract and identify end to end and report stability metrics.
    Harness,
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch => {
            let report = fetch_books(&FetchOptions {
                config_path: cli.config,
                data_dir: cli.data_dir,
            })?;
            info!(
                discovered = report.books_discovered,
                downloaded = report.downloaded,
                skipped = report.skipped,
                "fetch summary"
            );
        }
        Commands::Extract { book } => {
            let report = extract_books(&ExtractOptions {
                config_path: cli.config,
                data_dir: cli.data_dir,
                work_dir: cli.work_dir,
                out_dir: cli.out_dir,
                book,
            })?;
            info!(
                books = report.books_processed,
                pages = report.pages_scanned,
                skipped = report.pages_skipped,
                records = report.records_written,
                dated = report.dated,
                possible = report.possible_dated,
                undated = report.undated,
                "extract summary"
            );
        }
        Commands::Identify { input } => {
            let report = identify_titles(&IdentifyOptions {
                config_path: cli.config,
                data_dir: cli.data_dir,
                out_dir: cli.out_dir,
                input,
            })?;
            info!(
                rows = report.rows,
                matched = report.matched,
                representatives = report.representatives,
                memoranda = report.memoranda,
                unmatched = report.unmatched,
                "identify summary"
            );
        }
        Commands::Validate { config_file } => {
            let messages = validate_config(&ValidateOptions {
                config_file: config_file.unwrap_or(cli.config),
            })?;
            for line in messages {
                println!("{line}");
            }
        }
        Commands::Harness => {
            let report = run_harness(&HarnessOptions {
                config_path: cli.config,
                data_dir: cli.data_dir,
                work_dir: cli.work_dir,
                out_dir: cli.out_dir,
            })?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
