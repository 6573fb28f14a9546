use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// Identity of one of the two archives under comparison. Display labels are
/// carried separately so the pipeline itself never depends on user naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Source {
    A,
    B,
}

impl Source {
    pub fn other(self) -> Source {
        match self {
            Source::A => Source::B,
            Source::B => Source::A,
        }
    }
}

/// One post, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Record {
    pub source: Source,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: String,
    /// Retweets plus favorites when the archive carries them.
    pub engagement: Option<u64>,
}

/// Shape of an archive CSV row. Column names follow the common Twitter
/// export headers, with aliases for the short forms.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default, alias = "tweet_id", alias = "status_id")]
    id: Option<String>,
    #[serde(default, alias = "created_at")]
    timestamp: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "retweet_count")]
    retweets: Option<u64>,
    #[serde(default, alias = "favorite_count")]
    favorites: Option<u64>,
}

/// An archive read into memory, with load diagnostics.
#[derive(Debug)]
pub struct LoadedArchive {
    pub label: String,
    pub records: Vec<Record>,
    /// Rows dropped for a missing/empty text field or a CSV error.
    pub skipped: usize,
    /// Rows dropped because their id was already seen (re-exported posts).
    pub duplicates: usize,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Reads one archive CSV and tags every row with `source`.
///
/// Rows with a missing or empty text field are skipped and counted, as are
/// rows the CSV reader cannot deserialize; aggregates never absorb partial
/// rows silently. Rows repeating an already-seen id are dropped so
/// re-exported posts do not double-count.
pub fn load_archive(path: &Path, source: Source, label: &str) -> Result<LoadedArchive, String> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Open archive {} failed: {e}", path.display()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut duplicates = 0usize;
    let mut seen_ids: HashSet<String> = HashSet::new();

    for row in reader.deserialize::<RawRow>() {
        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{label}: skipping malformed row: {e}");
                skipped += 1;
                continue;
            }
        };
        let text = match raw.text {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                warn!("{label}: skipping row without text");
                skipped += 1;
                continue;
            }
        };
        if let Some(id) = &raw.id {
            if !seen_ids.insert(id.clone()) {
                duplicates += 1;
                continue;
            }
        }
        let engagement = match (raw.retweets, raw.favorites) {
            (None, None) => None,
            (r, f) => Some(r.unwrap_or(0) + f.unwrap_or(0)),
        };
        records.push(Record {
            source,
            timestamp: raw.timestamp.as_deref().and_then(parse_timestamp),
            text,
            engagement,
        });
    }

    Ok(LoadedArchive {
        label: label.to_string(),
        records,
        skipped,
        duplicates,
    })
}

/// Loads an extra stop-word file (one word per line) into an existing set.
/// A line starting with `# ` is a comment; a bare `#hashtag` line is a
/// stop word like any other, since hashtags are tokens in this pipeline.
pub fn load_stopwords_into(path: &Path, set: &mut HashSet<String>) -> Result<(), String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Read stopword file {} failed: {e}", path.display()))?;
    for line in content.lines() {
        let word = line.trim();
        if !word.is_empty() && word != "#" && !word.starts_with("# ") {
            set.insert(word.to_lowercase());
        }
    }
    Ok(())
}
