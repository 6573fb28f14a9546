use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&(amp|lt|gt);").unwrap());

/// Words excluded from all frequency statistics unless the caller supplies
/// their own list. Covers the high-frequency English function words that
/// otherwise dominate every comparison.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "between", "both", "but", "by", "can", "could",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
    "get", "got", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his",
    "how", "i", "i'm", "if", "in", "into", "is", "it", "it's", "its", "just", "like", "me",
    "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Default stop-word set as an owned set, ready to be extended from a
/// user-supplied word list.
pub fn default_stopwords() -> HashSet<String> {
    DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect()
}

/// Chars that belong inside a token: ASCII letters, digits, underscore, and
/// the `#`/`@` sigils so hashtags and mentions survive splitting.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '#' || c == '@'
}

/// Removes URLs, the HTML entities `&amp;`/`&lt;`/`&gt;`, and a leading
/// `RT ` retweet marker before splitting. URLs go first: archive text
/// escapes `&` inside query strings, so stripping entities earlier would
/// cut a URL in half and leak its query fragments as tokens.
fn strip_noise(text: &str) -> String {
    let cleaned = URL_RE.replace_all(text, " ");
    let cleaned = ENTITY_RE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim_start();
    let cleaned = cleaned.strip_prefix("RT ").unwrap_or(cleaned);
    cleaned.to_string()
}

/// Splits cleaned text into raw word candidates. A boundary is any char
/// outside the word-char class, except that an apostrophe only splits when
/// the char after it is itself a boundary (contractions stay joined,
/// trailing quotes split).
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if is_word_char(c) || (c == '\'' && chars.peek().copied().is_some_and(is_word_char)) {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Tokenizes raw text into an ordered sequence of lowercase tokens.
///
/// Pipeline: strip URLs/entities/retweet marker, split (keeping `#hashtag`
/// and `@mention` forms and contractions intact), lowercase, drop stop
/// words, and keep only tokens containing at least one `a-z` char (which
/// filters pure-number and pure-symbol splits). Deterministic, no side
/// effects.
///
/// # Example
/// ```
/// use corpus_compare::tokenize;
/// use std::collections::HashSet;
///
/// let stop = HashSet::new();
/// let tokens = tokenize("Loving this! #data @alice http://x.co/y", &stop);
/// assert_eq!(tokens, vec!["loving", "this", "#data", "@alice"]);
/// ```
pub fn tokenize(text: &str, stopwords: &HashSet<String>) -> Vec<String> {
    split_words(&strip_noise(text))
        .into_iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !stopwords.contains(w.as_str()))
        .filter(|w| w.chars().any(|c| c.is_ascii_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn tokenize_is_deterministic() {
        let s = stop(&["the"]);
        let text = "The #rustlang compiler yelled at me again &amp; again";
        assert_eq!(tokenize(text, &s), tokenize(text, &s));
    }

    #[test]
    fn keeps_hashtags_and_mentions_drops_urls() {
        let s = stop(&["this"]);
        let tokens = tokenize("Loving this! #data @alice http://x.co/y", &s);
        assert_eq!(tokens, vec!["loving", "#data", "@alice"]);
    }

    #[test]
    fn url_with_escaped_ampersand_is_removed_whole() {
        let s = HashSet::new();
        let tokens = tokenize("check this http://example.com/page?a=b&amp;c=d now", &s);
        assert_eq!(tokens, vec!["check", "this", "now"]);
    }

    #[test]
    fn strips_html_entities_and_retweet_marker() {
        let s = HashSet::new();
        let tokens = tokenize("RT fish &amp; chips &lt;tasty&gt;", &s);
        assert_eq!(tokens, vec!["fish", "chips", "tasty"]);
    }

    #[test]
    fn contractions_stay_joined_trailing_quotes_split() {
        let s = HashSet::new();
        assert_eq!(
            tokenize("can't stop won't stop", &s),
            vec!["can't", "stop", "won't", "stop"]
        );
        // trailing apostrophe is a boundary
        assert_eq!(tokenize("rockin'", &s), vec!["rockin"]);
    }

    #[test]
    fn pure_numbers_and_symbols_are_dropped() {
        let s = HashSet::new();
        let tokens = tokenize("release 2024 went 100% fine #1", &s);
        assert_eq!(tokens, vec!["release", "went", "fine"]);
    }

    #[test]
    fn stopwords_are_filtered_after_lowercasing() {
        let s = stop(&["the", "and"]);
        let tokens = tokenize("The cat AND the hat", &s);
        assert_eq!(tokens, vec!["cat", "hat"]);
    }

    #[test]
    fn empty_and_noise_only_text_yields_no_tokens() {
        let s = HashSet::new();
        assert!(tokenize("", &s).is_empty());
        assert!(tokenize("!!! ??? 123 --- https://x.co/abc", &s).is_empty());
    }
}
