use std::collections::HashSet;

use serde::Serialize;

use crate::freq::count_tokens;

/// Smoothed log-odds ratio of one token between the two sources. Positive
/// values lean towards source B, negative towards source A.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioRow {
    pub token: String,
    pub count_a: u64,
    pub count_b: u64,
    pub logratio: f64,
}

/// Computes the smoothed log-odds table between two tokenized corpora.
///
/// Pure `@mention` tokens are excluded before counting, so contacts known
/// to only one author cannot dominate the extremes. A token is retained
/// only if its combined count reaches `min_count`. Smoothing normalizes
/// over the retained set: each source's share of a token is
/// `(count + 1) / Σ_retained (count + 1)`, and
/// `logratio = ln(share_b / share_a)`. A token used by only one source
/// gets count 0 in the other, which smooths to a finite ratio.
///
/// Output is sorted by logratio descending, token ascending on ties.
pub fn log_odds_table(tokens_a: &[String], tokens_b: &[String], min_count: u64) -> Vec<RatioRow> {
    let counts_a = count_tokens(tokens_a);
    let counts_b = count_tokens(tokens_b);

    // Retained set: non-mention tokens with combined count >= min_count.
    let mut retained: Vec<(String, u64, u64)> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for token in counts_a.keys().chain(counts_b.keys()) {
        if token.starts_with('@') || !seen.insert(token.as_str()) {
            continue;
        }
        let ca = counts_a.get(token.as_str()).copied().unwrap_or(0);
        let cb = counts_b.get(token.as_str()).copied().unwrap_or(0);
        if ca + cb >= min_count {
            retained.push((token.clone(), ca, cb));
        }
    }

    // Normalization denominators are taken over the retained set only,
    // after the minimum-count filter.
    let denom_a: f64 = retained.iter().map(|(_, ca, _)| (ca + 1) as f64).sum();
    let denom_b: f64 = retained.iter().map(|(_, _, cb)| (cb + 1) as f64).sum();

    let mut rows: Vec<RatioRow> = retained
        .into_iter()
        .map(|(token, count_a, count_b)| {
            let share_a = (count_a + 1) as f64 / denom_a;
            let share_b = (count_b + 1) as f64 / denom_b;
            RatioRow {
                token,
                count_a,
                count_b,
                logratio: (share_b / share_a).ln(),
            }
        })
        .collect();
    rows.sort_by(|x, y| {
        y.logratio
            .partial_cmp(&x.logratio)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.token.cmp(&y.token))
    });
    rows
}

/// Extracts the `n` strongest tokens per sign of the log ratio: tokens
/// leaning towards B (logratio > 0, strongest first) and towards A
/// (logratio < 0, most negative first). Ties break alphabetically, so the
/// extraction is stable across runs.
pub fn top_by_sign(rows: &[RatioRow], n: usize) -> (Vec<RatioRow>, Vec<RatioRow>) {
    let mut towards_b: Vec<RatioRow> =
        rows.iter().filter(|r| r.logratio > 0.0).cloned().collect();
    towards_b.sort_by(|x, y| {
        y.logratio
            .partial_cmp(&x.logratio)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.token.cmp(&y.token))
    });
    towards_b.truncate(n);

    let mut towards_a: Vec<RatioRow> =
        rows.iter().filter(|r| r.logratio < 0.0).cloned().collect();
    towards_a.sort_by(|x, y| {
        x.logratio
            .partial_cmp(&y.logratio)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.token.cmp(&y.token))
    });
    towards_a.truncate(n);

    (towards_b, towards_a)
}
