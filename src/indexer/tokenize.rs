use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("static regex"));

/// Distinct lowercase words of at least `min_len` characters.
pub fn tokenize(text: &str, min_len: usize) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}
