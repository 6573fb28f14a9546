use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use csv::WriterBuilder;
use serde::Serialize;

use crate::ComparisonReport;

/// Output format for exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

/// Neutralizes spreadsheet formula injection: cells starting with `=`, `+`,
/// `-`, `@`, or a tab/CR get a leading apostrophe. Cells already prefixed
/// are left alone.
pub fn csv_safe_cell(cell: String) -> String {
    if cell.starts_with('\'') {
        return cell;
    }
    match cell.chars().next() {
        Some('=') | Some('+') | Some('-') | Some('@') | Some('\t') | Some('\r') => {
            format!("'{cell}")
        }
        _ => cell,
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn write_json<T: Serialize>(rows: &[T], path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(rows)
        .map_err(|e| format!("Serialize {} failed: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Write {} failed: {e}", path.display()))
}

/// Writes a delimited table. Cells in `text_cols` pass through
/// [`csv_safe_cell`]; numeric columns are written as-is so negative values
/// keep their sign.
fn write_delimited(
    header: &[&str],
    rows: Vec<Vec<String>>,
    text_cols: &[usize],
    path: &Path,
    fmt: ExportFormat,
) -> Result<(), String> {
    let delimiter = if fmt == ExportFormat::Tsv { b'\t' } else { b',' };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| format!("Create {} failed: {e}", path.display()))?;
    writer
        .write_record(header)
        .map_err(|e| format!("Write header to {} failed: {e}", path.display()))?;
    for row in rows {
        let record = row.into_iter().enumerate().map(|(i, cell)| {
            if text_cols.contains(&i) {
                csv_safe_cell(cell)
            } else {
                cell
            }
        });
        writer
            .write_record(record)
            .map_err(|e| format!("Write row to {} failed: {e}", path.display()))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Flush {} failed: {e}", path.display()))
}

// JSON rows carry the user-facing source label instead of the internal id.
#[derive(Serialize)]
struct WordFreqOut<'a> {
    source: &'a str,
    token: &'a str,
    count: u64,
    total: u64,
    frequency: f64,
}

/// Writes the report's tables into `out_dir` with timestamped names
/// (`compare_<YYYYMMDD>_<HHMMSS>_<table>.<ext>`). Txt exports the summary
/// only; csv/tsv/json export the word-frequency, joined, log-ratio, and
/// category tables. Returns the written paths.
pub fn export_report(
    report: &ComparisonReport,
    fmt: ExportFormat,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, String> {
    let stamp = Local::now().format("compare_%Y%m%d_%H%M%S").to_string();
    let file = |table: &str| out_dir.join(format!("{stamp}_{table}.{}", fmt.extension()));
    let mut written = Vec::new();

    if fmt == ExportFormat::Txt {
        let path = file("summary");
        fs::write(&path, &report.summary)
            .map_err(|e| format!("Write {} failed: {e}", path.display()))?;
        written.push(path);
        return Ok(written);
    }

    // word frequencies, both sources in one long table
    let path = file("wordfreq");
    let freq_rows = |label: &str, rows: &[crate::FrequencyRow]| -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| {
                vec![
                    label.to_string(),
                    r.token.clone(),
                    r.count.to_string(),
                    r.total.to_string(),
                    r.frequency.to_string(),
                ]
            })
            .collect()
    };
    match fmt {
        ExportFormat::Json => {
            let rows: Vec<WordFreqOut> = report
                .freq_a
                .iter()
                .map(|r| (report.label_a.as_str(), r))
                .chain(report.freq_b.iter().map(|r| (report.label_b.as_str(), r)))
                .map(|(source, r)| WordFreqOut {
                    source,
                    token: &r.token,
                    count: r.count,
                    total: r.total,
                    frequency: r.frequency,
                })
                .collect();
            write_json(&rows, &path)?;
        }
        _ => {
            let mut rows = freq_rows(&report.label_a, &report.freq_a);
            rows.extend(freq_rows(&report.label_b, &report.freq_b));
            write_delimited(
                &["source", "token", "count", "total", "frequency"],
                rows,
                &[0, 1],
                &path,
                fmt,
            )?;
        }
    }
    written.push(path);

    // joined frequency table (shared vocabulary only)
    let path = file("joined");
    match fmt {
        ExportFormat::Json => write_json(&report.joined, &path)?,
        _ => write_delimited(
            &["token", "count_a", "frequency_a", "count_b", "frequency_b"],
            report
                .joined
                .iter()
                .map(|r| {
                    vec![
                        r.token.clone(),
                        r.count_a.to_string(),
                        r.frequency_a.to_string(),
                        r.count_b.to_string(),
                        r.frequency_b.to_string(),
                    ]
                })
                .collect(),
            &[0],
            &path,
            fmt,
        )?,
    }
    written.push(path);

    // smoothed log-odds ratios
    let path = file("logratio");
    match fmt {
        ExportFormat::Json => write_json(&report.ratios, &path)?,
        _ => write_delimited(
            &["token", "count_a", "count_b", "logratio"],
            report
                .ratios
                .iter()
                .map(|r| {
                    vec![
                        r.token.clone(),
                        r.count_a.to_string(),
                        r.count_b.to_string(),
                        r.logratio.to_string(),
                    ]
                })
                .collect(),
            &[0],
            &path,
            fmt,
        )?,
    }
    written.push(path);

    // category comparison (only when a lexicon was joined)
    if !report.categories.is_empty() {
        let path = file("categories");
        match fmt {
            ExportFormat::Json => write_json(&report.categories, &path)?,
            _ => write_delimited(
                &[
                    "category",
                    "count_a",
                    "total_a",
                    "count_b",
                    "total_b",
                    "estimate",
                    "conf_low",
                    "conf_high",
                    "error",
                ],
                report
                    .categories
                    .iter()
                    .map(|c| {
                        vec![
                            c.category.clone(),
                            c.count_a.to_string(),
                            c.total_a.to_string(),
                            c.count_b.to_string(),
                            c.total_b.to_string(),
                            fmt_opt(c.estimate),
                            fmt_opt(c.conf_low),
                            fmt_opt(c.conf_high),
                            c.error.clone().unwrap_or_default(),
                        ]
                    })
                    .collect(),
                &[0, 8],
                &path,
                fmt,
            )?,
        }
        written.push(path);
    }

    Ok(written)
}
