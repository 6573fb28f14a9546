use log::warn;
use serde::Serialize;
use statrs::distribution::{Beta, ContinuousCDF};

use crate::lexicon::CategoryCount;
use crate::loader::Source;

/// Point estimate and two-sided confidence interval for the rate ratio
/// B/A of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTest {
    pub estimate: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// Tests whether two sources produce a category at the same rate, under a
/// Poisson null of equal rates per token.
///
/// Conditional on the combined count `n = count_a + count_b`, `count_b`
/// is binomial, so the exact (Clopper-Pearson) interval for its success
/// probability transforms into an interval for the rate ratio
/// `(count_b/total_b) / (count_a/total_a)`. The interval bounds come from
/// the Beta inverse CDF. A count of zero on one side yields an open bound
/// (0 or +inf), not an error; a zero *total* is a structural failure.
pub fn rate_ratio_test(
    count_a: u64,
    total_a: u64,
    count_b: u64,
    total_b: u64,
    confidence: f64,
) -> Result<RateTest, String> {
    if confidence <= 0.0 || confidence >= 1.0 {
        return Err(format!("confidence must be in (0, 1), got {confidence}"));
    }
    if total_a == 0 || total_b == 0 {
        return Err(format!(
            "zero total token count (a={total_a}, b={total_b})"
        ));
    }
    if count_a + count_b == 0 {
        return Err("no occurrences in either source".to_string());
    }

    let (xa, xb) = (count_a as f64, count_b as f64);
    let (ta, tb) = (total_a as f64, total_b as f64);
    let alpha = 1.0 - confidence;

    // Maps the conditional binomial probability back to a rate ratio.
    let to_ratio = |p: f64| -> f64 {
        if p >= 1.0 {
            f64::INFINITY
        } else {
            (p / (1.0 - p)) * (ta / tb)
        }
    };

    let p_low = if count_b == 0 {
        0.0
    } else {
        Beta::new(xb, xa + 1.0)
            .map_err(|e| format!("beta({xb}, {}) failed: {e}", xa + 1.0))?
            .inverse_cdf(alpha / 2.0)
    };
    let p_high = if count_a == 0 {
        1.0
    } else {
        Beta::new(xb + 1.0, xa)
            .map_err(|e| format!("beta({}, {xa}) failed: {e}", xb + 1.0))?
            .inverse_cdf(1.0 - alpha / 2.0)
    };

    let estimate = if count_a == 0 {
        f64::INFINITY
    } else {
        (xb / tb) / (xa / ta)
    };

    Ok(RateTest {
        estimate,
        conf_low: to_ratio(p_low),
        conf_high: to_ratio(p_high),
    })
}

/// One category's comparison row: the packaged (count, total) pairs plus
/// the tester's result, propagated unchanged. A failed test fills `error`
/// and leaves the interval fields empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub category: String,
    pub count_a: u64,
    pub total_a: u64,
    pub count_b: u64,
    pub total_b: u64,
    pub estimate: Option<f64>,
    pub conf_low: Option<f64>,
    pub conf_high: Option<f64>,
    pub error: Option<String>,
}

/// Fans the category counts out into per-category (count, total) tuples,
/// applies the rate-ratio test to each independently, and collects the
/// results into a flat table. A failure in one category is reported on its
/// row; the remaining categories still complete.
///
/// `total_a`/`total_b` are the sources' full token counts. They come from
/// the caller rather than the match rows, so a source with zero matches in
/// every category still tests against its real denominator instead of
/// failing structurally.
pub fn compare_categories(
    counts: &[CategoryCount],
    total_a: u64,
    total_b: u64,
    confidence: f64,
) -> Vec<CategoryComparison> {
    let mut categories: Vec<&str> = counts.iter().map(|c| c.category.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();

    categories
        .into_iter()
        .map(|category| {
            let pick = |source: Source| {
                counts
                    .iter()
                    .find(|c| c.category == category && c.source == source)
                    .map_or(0, |c| c.matched)
            };
            let count_a = pick(Source::A);
            let count_b = pick(Source::B);

            match rate_ratio_test(count_a, total_a, count_b, total_b, confidence) {
                Ok(test) => CategoryComparison {
                    category: category.to_string(),
                    count_a,
                    total_a,
                    count_b,
                    total_b,
                    estimate: Some(test.estimate),
                    conf_low: Some(test.conf_low),
                    conf_high: Some(test.conf_high),
                    error: None,
                },
                Err(e) => {
                    warn!("category '{category}': test failed: {e}");
                    CategoryComparison {
                        category: category.to_string(),
                        count_a,
                        total_a,
                        count_b,
                        total_b,
                        estimate: None,
                        conf_low: None,
                        conf_high: None,
                        error: Some(e),
                    }
                }
            }
        })
        .collect()
}
