//! Title normalization, tokenization, and word frequency.
//!
//! The normalization pipeline mirrors what the downstream charts expect:
//! lowercase, punctuation stripped, accented letters preserved. Stopword
//! filtering removes Spanish function words plus anything the config adds,
//! and drops short tokens, so the frequency ranking surfaces content words
//! rather than glue.

use crate::config::AnalysisSettings;
use crate::models::TermCount;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Everything that is neither a word character nor whitespace. `\w` is
/// Unicode-aware, so accented letters and `ñ` survive.
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Spanish function words excluded from frequency counts. The config's
/// `extra_stopwords` extends this list at runtime.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "al", "algo", "ante", "antes", "aquel", "aquella", "aquellos", "así", "aún",
        "bajo", "cada", "casi", "como", "cómo", "con", "contra", "cual", "cuales", "cuando",
        "cuándo", "de", "del", "desde", "donde", "dónde", "durante", "e", "el", "él", "ella",
        "ellas", "ellos", "en", "entre", "era", "eran", "es", "esa", "esas", "ese", "eso",
        "esos", "esta", "está", "están", "estas", "este", "esto", "estos", "fue", "fueron",
        "ha", "había", "habían", "han", "hasta", "hay", "hacia", "la", "las", "le", "les",
        "lo", "los", "más", "me", "mediante", "mi", "mientras", "muy", "ni", "no", "nos",
        "o", "otra", "otras", "otro", "otros", "para", "pero", "poco", "por", "porque",
        "que", "qué", "quien", "quienes", "se", "según", "ser", "será", "si", "sí", "sin",
        "sobre", "son", "su", "sus", "también", "tan", "tanto", "te", "tiene", "tienen",
        "toda", "todas", "todo", "todos", "tras", "u", "un", "una", "unas", "uno", "unos",
        "y", "ya", "yo",
    ]
    .into_iter()
    .collect()
});

/// Lowercase a title and strip punctuation, keeping word characters and
/// whitespace only.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_WORD_RE.replace_all(&lower, "").into_owned()
}

/// Split a title into lowercase word tokens.
///
/// Stopwords are kept here; sentiment scoring needs the function words
/// (negators in particular). Frequency counting filters afterwards.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    WORD_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Whether a (lowercase) token survives the stopword and length filters.
pub fn is_content_word(word: &str, settings: &AnalysisSettings) -> bool {
    word.chars().count() >= settings.min_word_len
        && !STOPWORDS.contains(word)
        && !settings
            .extra_stopwords
            .iter()
            .any(|s| s.to_lowercase() == word)
}

/// Count content words across all titles.
pub fn count_words<'a, I>(titles: I, settings: &AnalysisSettings) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for title in titles {
        for token in tokenize(title) {
            if is_content_word(&token, settings) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// The `n` most frequent terms, count-descending.
///
/// Ties break alphabetically so repeated runs over the same table rank
/// identically.
pub fn top_terms(counts: &HashMap<String, usize>, n: usize) -> Vec<TermCount> {
    let mut entries: Vec<TermCount> = counts
        .iter()
        .map(|(term, count)| TermCount::new(term.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    entries.truncate(n);
    entries
}
