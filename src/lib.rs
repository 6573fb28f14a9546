#![forbid(unsafe_code)]
//! # corpus_compare
//!
//! Compares two personal social-media text archives. The pipeline loads
//! both archives, tokenizes the text (keeping `#hashtag` and `@mention`
//! forms), computes per-source word frequencies and their inner join,
//! smoothed log-odds ratios between the sources, and, given a lexicon,
//! per-category rate-ratio tests with exact confidence intervals.
//!
//! Every stage is a pure function of its input: the archives are read into
//! immutable tables once and everything downstream is recomputed per run.
//!
//! ## Example
//! ```no_run
//! use corpus_compare::{
//!     AnalysisOptions, Lexicon, Source, compare_loaded, default_stopwords, load_archive,
//! };
//! use std::path::Path;
//!
//! let a = load_archive(Path::new("alice.csv"), Source::A, "alice").unwrap();
//! let b = load_archive(Path::new("bob.csv"), Source::B, "bob").unwrap();
//! let lexicon = Lexicon::from_csv_path(Path::new("nrc.csv")).unwrap();
//! let report = compare_loaded(
//!     &a,
//!     &b,
//!     &default_stopwords(),
//!     Some(&lexicon),
//!     &AnalysisOptions::default(),
//! )
//! .unwrap();
//! println!("{}", report.summary);
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;

use rayon::prelude::*;

mod export;
mod freq;
mod lexicon;
mod loader;
mod ratio;
mod stats;
mod tokenize;

pub use export::{ExportFormat, csv_safe_cell, export_report};
pub use freq::{FrequencyRow, JoinedFrequencyRow, count_tokens, frequency_table, join_frequencies};
pub use lexicon::{CategoryCount, Lexicon, category_counts};
pub use loader::{LoadedArchive, Record, Source, load_archive, load_stopwords_into};
pub use ratio::{RatioRow, log_odds_table, top_by_sign};
pub use stats::{CategoryComparison, RateTest, compare_categories, rate_ratio_test};
pub use tokenize::{DEFAULT_STOPWORDS, default_stopwords, tokenize};

/// Knobs for one comparison run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Combined-count floor for the log-ratio table.
    pub min_count: u64,
    /// Tokens listed per log-ratio sign in the summary.
    pub top_n: usize,
    /// Confidence level for the category rate tests.
    pub confidence: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            min_count: 5,
            top_n: 15,
            confidence: 0.95,
        }
    }
}

/// Everything one run produces: the derived tables plus a formatted
/// stdout summary. All tables are views recomputed from the two archives;
/// nothing is persisted or mutated in place.
#[derive(Debug)]
pub struct ComparisonReport {
    pub label_a: String,
    pub label_b: String,
    pub total_tokens_a: u64,
    pub total_tokens_b: u64,
    pub freq_a: Vec<FrequencyRow>,
    pub freq_b: Vec<FrequencyRow>,
    pub joined: Vec<JoinedFrequencyRow>,
    pub ratios: Vec<RatioRow>,
    pub categories: Vec<CategoryComparison>,
    pub summary: String,
}

/// Tokenizes every record's text. Fan-out per row; order-preserving, and
/// observably equal to the sequential version since every downstream
/// aggregation is a commutative sum.
pub fn tokenize_records(records: &[Record], stopwords: &HashSet<String>) -> Vec<String> {
    records
        .par_iter()
        .map(|r| tokenize(&r.text, stopwords))
        .flatten()
        .collect()
}

/// Runs the full pipeline over two loaded archives.
///
/// Errors when either archive yields no tokens at all; per-category test
/// failures are reported in the category table instead of aborting.
pub fn compare_loaded(
    a: &LoadedArchive,
    b: &LoadedArchive,
    stopwords: &HashSet<String>,
    lexicon: Option<&Lexicon>,
    opts: &AnalysisOptions,
) -> Result<ComparisonReport, String> {
    let tokens_a = tokenize_records(&a.records, stopwords);
    let tokens_b = tokenize_records(&b.records, stopwords);
    if tokens_a.is_empty() {
        return Err(format!("archive '{}' produced no tokens", a.label));
    }
    if tokens_b.is_empty() {
        return Err(format!("archive '{}' produced no tokens", b.label));
    }

    let freq_a = frequency_table(&tokens_a, Source::A);
    let freq_b = frequency_table(&tokens_b, Source::B);
    let joined = join_frequencies(&freq_a, &freq_b);
    let ratios = log_odds_table(&tokens_a, &tokens_b, opts.min_count);

    let categories = match lexicon {
        Some(lexicon) if !lexicon.is_empty() => {
            let counts = category_counts(&tokens_a, &tokens_b, lexicon);
            compare_categories(
                &counts,
                tokens_a.len() as u64,
                tokens_b.len() as u64,
                opts.confidence,
            )
        }
        _ => Vec::new(),
    };

    let mut report = ComparisonReport {
        label_a: a.label.clone(),
        label_b: b.label.clone(),
        total_tokens_a: tokens_a.len() as u64,
        total_tokens_b: tokens_b.len() as u64,
        freq_a,
        freq_b,
        joined,
        ratios,
        categories,
        summary: String::new(),
    };
    report.summary = build_summary(&report, opts.top_n);
    Ok(report)
}

/// Formats the human-readable run summary: token totals, top-N tokens per
/// log-ratio sign, and the category table.
fn build_summary(report: &ComparisonReport, top_n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Tokens: {}={}, {}={}",
        report.label_a, report.total_tokens_a, report.label_b, report.total_tokens_b
    );
    let _ = writeln!(out, "Shared vocabulary: {} tokens", report.joined.len());

    let (towards_b, towards_a) = top_by_sign(&report.ratios, top_n);
    let _ = writeln!(
        out,
        "\nTop {top_n} words leaning {} (logratio > 0):",
        report.label_b
    );
    for r in &towards_b {
        let _ = writeln!(
            out,
            "  {}\t{:+.4}\t({}/{})",
            r.token, r.logratio, r.count_a, r.count_b
        );
    }
    let _ = writeln!(
        out,
        "\nTop {top_n} words leaning {} (logratio < 0):",
        report.label_a
    );
    for r in &towards_a {
        let _ = writeln!(
            out,
            "  {}\t{:+.4}\t({}/{})",
            r.token, r.logratio, r.count_a, r.count_b
        );
    }

    if !report.categories.is_empty() {
        let _ = writeln!(
            out,
            "\nCategory rate ratios ({} vs {}):",
            report.label_b, report.label_a
        );
        for c in &report.categories {
            match (c.estimate, c.conf_low, c.conf_high, &c.error) {
                (Some(est), Some(lo), Some(hi), _) => {
                    let _ = writeln!(
                        out,
                        "  {}\testimate={:.4}\tCI=[{:.4}, {:.4}]\t({}/{} vs {}/{})",
                        c.category, est, lo, hi, c.count_a, c.total_a, c.count_b, c.total_b
                    );
                }
                (_, _, _, Some(err)) => {
                    let _ = writeln!(out, "  {}\tfailed: {err}", c.category);
                }
                _ => {}
            }
        }
    }
    out
}

/// Prints load diagnostics to stderr, one line per archive with dropped
/// rows.
pub fn print_skipped_rows(archives: &[&LoadedArchive]) {
    if archives.iter().all(|a| a.skipped == 0 && a.duplicates == 0) {
        return;
    }
    eprintln!("Warnings: some rows were not loaded:");
    for a in archives {
        if a.skipped > 0 || a.duplicates > 0 {
            eprintln!(
                "  {}: {} malformed row(s) skipped, {} duplicate id(s) dropped",
                a.label, a.skipped, a.duplicates
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(label: &str, source: Source, texts: &[&str]) -> LoadedArchive {
        LoadedArchive {
            label: label.to_string(),
            records: texts
                .iter()
                .map(|t| Record {
                    source,
                    timestamp: None,
                    text: t.to_string(),
                    engagement: None,
                })
                .collect(),
            skipped: 0,
            duplicates: 0,
        }
    }

    #[test]
    fn pipeline_end_to_end() {
        let a = archive(
            "alice",
            Source::A,
            &[
                "the garden is blooming again #garden",
                "roses roses roses in the garden",
                "garden update: more roses",
            ],
        );
        let b = archive(
            "bob",
            Source::B,
            &[
                "build failed again, the compiler hates me",
                "compiler compiler compiler",
                "shipped the build #rustlang",
            ],
        );
        let mut stop = HashSet::new();
        stop.insert("the".to_string());
        let lexicon = Lexicon::from_pairs([("blooming", "joy"), ("hates", "anger")]);
        let opts = AnalysisOptions {
            min_count: 2,
            ..AnalysisOptions::default()
        };

        let report = compare_loaded(&a, &b, &stop, Some(&lexicon), &opts).unwrap();

        // per-source frequencies sum to 1
        let sum_a: f64 = report.freq_a.iter().map(|r| r.frequency).sum();
        let sum_b: f64 = report.freq_b.iter().map(|r| r.frequency).sum();
        assert!((sum_a - 1.0).abs() < 1e-9);
        assert!((sum_b - 1.0).abs() < 1e-9);

        // joined table contains only shared vocabulary
        for row in &report.joined {
            assert!(report.freq_a.iter().any(|r| r.token == row.token));
            assert!(report.freq_b.iter().any(|r| r.token == row.token));
        }
        assert!(report.joined.iter().any(|r| r.token == "again"));

        // ratio table honors the combined-count floor
        assert!(
            report
                .ratios
                .iter()
                .all(|r| r.count_a + r.count_b >= opts.min_count)
        );
        // "roses" leans alice, "compiler" leans bob
        let roses = report.ratios.iter().find(|r| r.token == "roses").unwrap();
        let compiler = report.ratios.iter().find(|r| r.token == "compiler").unwrap();
        assert!(roses.logratio < 0.0);
        assert!(compiler.logratio > 0.0);

        // category rows carry both totals
        assert!(!report.categories.is_empty());
        for c in &report.categories {
            assert_eq!(c.total_a, report.total_tokens_a);
            assert_eq!(c.total_b, report.total_tokens_b);
        }

        assert!(report.summary.contains("Top "));
        assert!(report.summary.contains("alice"));
        assert!(report.summary.contains("bob"));
    }

    #[test]
    fn lexicon_matching_only_one_source_still_tests_categories() {
        let a = archive("alice", Source::A, &["stone wall stone wall stone wall"]);
        let b = archive("bob", Source::B, &["happy days happy days happy days"]);
        let stop = HashSet::new();
        let lexicon = Lexicon::from_pairs([("happy", "joy")]);

        let report =
            compare_loaded(&a, &b, &stop, Some(&lexicon), &AnalysisOptions::default()).unwrap();
        assert_eq!(report.categories.len(), 1);

        let joy = &report.categories[0];
        assert_eq!((joy.count_a, joy.total_a), (0, 6));
        assert_eq!((joy.count_b, joy.total_b), (3, 6));
        assert!(joy.error.is_none());
        assert_eq!(joy.estimate, Some(f64::INFINITY));
    }

    #[test]
    fn empty_archive_is_an_error() {
        let a = archive("alice", Source::A, &["hello world"]);
        let b = archive("bob", Source::B, &["12345 !!!"]);
        let stop = HashSet::new();
        let err = compare_loaded(&a, &b, &stop, None, &AnalysisOptions::default()).unwrap_err();
        assert!(err.contains("bob"));
    }

    #[test]
    fn parallel_tokenization_matches_sequential() {
        let records: Vec<Record> = (0..200)
            .map(|i| Record {
                source: Source::A,
                timestamp: None,
                text: format!("row {i} with #tag{} and some words", i % 7),
                engagement: None,
            })
            .collect();
        let stop = HashSet::new();
        let parallel = tokenize_records(&records, &stop);
        let sequential: Vec<String> = records
            .iter()
            .flat_map(|r| tokenize(&r.text, &stop))
            .collect();
        assert_eq!(parallel, sequential);
    }
}
