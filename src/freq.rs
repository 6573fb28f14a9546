use std::collections::HashMap;

use serde::Serialize;

use crate::loader::Source;

/// One token's count and relative frequency within a single source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub source: Source,
    pub token: String,
    pub count: u64,
    pub total: u64,
    pub frequency: f64,
}

/// One token's counts and frequencies in both sources. Produced by an inner
/// join, so only shared vocabulary appears.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedFrequencyRow {
    pub token: String,
    pub count_a: u64,
    pub frequency_a: f64,
    pub count_b: u64,
    pub frequency_b: f64,
}

/// Counts occurrences of each token.
pub fn count_tokens(tokens: &[String]) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

/// Builds the complete (not top-k) frequency table for one source, sorted
/// by count descending, then token ascending.
pub fn frequency_table(tokens: &[String], source: Source) -> Vec<FrequencyRow> {
    let counts = count_tokens(tokens);
    let total: u64 = counts.values().sum();
    let mut rows: Vec<FrequencyRow> = counts
        .into_iter()
        .map(|(token, count)| FrequencyRow {
            source,
            token,
            count,
            total,
            frequency: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
    rows
}

/// Inner-joins two frequency tables on token. Tokens absent from either
/// source are excluded by policy: the comparison is bounded to shared
/// vocabulary. Output is sorted by combined count descending, token
/// ascending.
pub fn join_frequencies(a: &[FrequencyRow], b: &[FrequencyRow]) -> Vec<JoinedFrequencyRow> {
    let b_by_token: HashMap<&str, &FrequencyRow> =
        b.iter().map(|row| (row.token.as_str(), row)).collect();

    let mut joined: Vec<JoinedFrequencyRow> = a
        .iter()
        .filter_map(|row_a| {
            b_by_token.get(row_a.token.as_str()).map(|row_b| JoinedFrequencyRow {
                token: row_a.token.clone(),
                count_a: row_a.count,
                frequency_a: row_a.frequency,
                count_b: row_b.count,
                frequency_b: row_b.frequency,
            })
        })
        .collect();
    joined.sort_by(|x, y| {
        (y.count_a + y.count_b)
            .cmp(&(x.count_a + x.count_b))
            .then_with(|| x.token.cmp(&y.token))
    });
    joined
}
