use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loader::Source;

/// Read-only mapping from lowercase word to one or more category labels
/// (e.g. NRC emotion categories). Injected into the category join; the
/// pipeline never mutates it.
#[derive(Debug, Default, Clone)]
pub struct Lexicon {
    map: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct LexiconRow {
    word: String,
    #[serde(alias = "sentiment")]
    category: String,
}

impl Lexicon {
    /// Loads a two-column CSV with headers `word,category` (the NRC export
    /// header `word,sentiment` is accepted too).
    pub fn from_csv_path(path: &Path) -> Result<Self, String> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| format!("Open lexicon {} failed: {e}", path.display()))?;
        let mut lexicon = Lexicon::default();
        for row in reader.deserialize::<LexiconRow>() {
            let row = row.map_err(|e| format!("Lexicon row in {} failed: {e}", path.display()))?;
            lexicon.insert(&row.word, &row.category);
        }
        Ok(lexicon)
    }

    /// Builds a lexicon from (word, category) pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut lexicon = Lexicon::default();
        for (word, category) in pairs {
            lexicon.insert(word, category);
        }
        lexicon
    }

    fn insert(&mut self, word: &str, category: &str) {
        let categories = self.map.entry(word.to_lowercase()).or_default();
        let category = category.to_lowercase();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    /// Categories a token belongs to; empty when the lexicon has no entry
    /// (a miss is not an error, the token simply has zero categories).
    pub fn categories(&self, token: &str) -> &[String] {
        self.map.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Per (source, category): how many tokens matched the category. The
/// per-source token totals are not carried here; callers pass them to the
/// rate tests directly, so a source with no matches at all still tests
/// against its real denominator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub source: Source,
    pub matched: u64,
}

/// Joins both token streams against the lexicon and aggregates matches per
/// (source, category). A token contributes once to every category it
/// belongs to. Sorted by category, then source.
pub fn category_counts(
    tokens_a: &[String],
    tokens_b: &[String],
    lexicon: &Lexicon,
) -> Vec<CategoryCount> {
    let mut counts: HashMap<(String, Source), u64> = HashMap::new();
    for (tokens, source) in [(tokens_a, Source::A), (tokens_b, Source::B)] {
        for token in tokens {
            for category in lexicon.categories(token) {
                *counts.entry((category.clone(), source)).or_insert(0) += 1;
            }
        }
    }

    let mut rows: Vec<CategoryCount> = counts
        .into_iter()
        .map(|((category, source), matched)| CategoryCount {
            category,
            source,
            matched,
        })
        .collect();
    rows.sort_by(|x, y| x.category.cmp(&y.category).then_with(|| x.source.cmp(&y.source)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn lookup_hits_and_misses() {
        let lex = Lexicon::from_pairs([("happy", "joy"), ("happy", "positive"), ("grim", "sadness")]);
        assert_eq!(lex.categories("happy").to_vec(), vec!["joy", "positive"]);
        assert_eq!(lex.categories("grim").to_vec(), vec!["sadness"]);
        assert!(lex.categories("neutral").is_empty());
        assert_eq!(lex.len(), 2);
    }

    #[test]
    fn duplicate_pairs_are_collapsed() {
        let lex = Lexicon::from_pairs([("happy", "joy"), ("HAPPY", "Joy")]);
        assert_eq!(lex.categories("happy").to_vec(), vec!["joy"]);
    }

    #[test]
    fn multi_category_tokens_count_in_each_category() {
        let lex = Lexicon::from_pairs([("happy", "joy"), ("happy", "positive")]);
        let a = toks(&["happy", "stone"]);
        let b = toks(&["stone"]);
        let rows = category_counts(&a, &b, &lex);
        // only source A has matches; one per category
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.source == Source::A && r.matched == 1));
    }

    #[test]
    fn matches_are_counted_per_source() {
        let lex = Lexicon::from_pairs([("happy", "joy")]);
        let a = toks(&["happy", "happy", "stone"]);
        let b = toks(&["happy"]);
        let rows = category_counts(&a, &b, &lex);
        let joy_a = rows
            .iter()
            .find(|r| r.source == Source::A && r.category == "joy")
            .unwrap();
        let joy_b = rows
            .iter()
            .find(|r| r.source == Source::B && r.category == "joy")
            .unwrap();
        assert_eq!(joy_a.matched, 2);
        assert_eq!(joy_b.matched, 1);
    }
}
