#![forbid(unsafe_code)]
//! # corpus_compare CLI
//!
//! Command-line front end for the `corpus_compare` crate. Points at two
//! archive CSVs, optionally a lexicon and a stop-word file, prints the
//! comparison summary, and exports the derived tables.
//!
//! ## Example
//! ```bash
//! corpus_compare alice.csv bob.csv --lexicon nrc.csv --export-format csv
//! ```
//!
//! See `--help` for all available options.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::error;

use corpus_compare::{
    AnalysisOptions, ExportFormat, Lexicon, Source, compare_loaded, default_stopwords,
    export_report, load_archive, load_stopwords_into, print_skipped_rows,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// First archive CSV (source A)
    archive_a: PathBuf,

    /// Second archive CSV (source B)
    archive_b: PathBuf,

    /// Label for source A in summaries and exports
    #[arg(long, default_value = "a")]
    label_a: String,

    /// Label for source B in summaries and exports
    #[arg(long, default_value = "b")]
    label_b: String,

    /// Lexicon CSV (word,category) for the category comparison
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Optional path to additional stopword file (.txt, one word per line)
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Minimum combined count for a token to enter the log-ratio table
    #[arg(long, default_value_t = 5)]
    min_count: u64,

    /// Number of tokens per log-ratio sign in the summary
    #[arg(long, default_value_t = 15)]
    top_n: usize,

    /// Confidence level for the category rate tests
    #[arg(long, default_value_t = 0.95)]
    confidence: f64,

    /// Output format for export (txt, csv, tsv, json)
    #[arg(long, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory exports are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn run(cli: &Cli) -> Result<(), String> {
    let mut stopwords = default_stopwords();
    if let Some(path) = &cli.stopwords {
        load_stopwords_into(path, &mut stopwords)?;
    }

    let lexicon = match &cli.lexicon {
        Some(path) => Some(Lexicon::from_csv_path(path)?),
        None => None,
    };

    let a = load_archive(&cli.archive_a, Source::A, &cli.label_a)?;
    let b = load_archive(&cli.archive_b, Source::B, &cli.label_b)?;
    print_skipped_rows(&[&a, &b]);

    let opts = AnalysisOptions {
        min_count: cli.min_count,
        top_n: cli.top_n,
        confidence: cli.confidence,
    };
    let report = compare_loaded(&a, &b, &stopwords, lexicon.as_ref(), &opts)?;

    println!("{}", report.summary);
    let written = export_report(&report, cli.export_format, &cli.out_dir)?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        process::exit(1);
    }
}
