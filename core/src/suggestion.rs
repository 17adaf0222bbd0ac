//! Suggestion types and ranking.
//!
//! This module provides:
//! - `Suggestion`: a rendered candidate with weight and learning timestamp
//! - `PatternMatch` / `DictionaryMatch`: results handed back by the stores
//! - `TransliterationResult`: the three ranked sequences returned to callers
//! - `rank`: the stable recency-then-weight ordering

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A candidate rendering of an input word.
///
/// Weights are signed; higher is better. `learned_on` is the Unix time (in
/// seconds) of the last time a user confirmed this word, 0 if never.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub weight: i32,
    pub learned_on: i64,
}

impl Suggestion {
    pub fn new<T: Into<String>>(text: T, weight: i32) -> Self {
        Self {
            text: text.into(),
            weight,
            learned_on: 0,
        }
    }

    pub fn learned<T: Into<String>>(text: T, weight: i32, learned_on: i64) -> Self {
        Self {
            text: text.into(),
            weight,
            learned_on,
        }
    }

    /// The last character of the rendered text, or "" if it is empty.
    pub fn last_char(&self) -> &str {
        last_char(&self.text)
    }
}

/// Slice holding the final character of `s`.
pub fn last_char(s: &str) -> &str {
    match s.char_indices().next_back() {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// A hit in the pattern store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Number of input characters covered by the stored pattern.
    pub matched_length: usize,
    pub suggestion: Suggestion,
}

/// Result of walking a tokenized word through the learned-word store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryMatch {
    pub suggestions: Vec<Suggestion>,
    /// True when the walk consumed every token of the word.
    pub exact_match: bool,
    /// Character offset just past the longest matched prefix.
    pub longest_match_position: usize,
}

/// Ranked output of a transliteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransliterationResult {
    /// Whole-word matches from the stores.
    pub exact_match: Vec<Suggestion>,
    /// Tokenizer expansions merged with partial store matches.
    pub candidates: Vec<Suggestion>,
    /// Tokenizer-only rendering using exact rules.
    pub greedy_exact: Vec<Suggestion>,
}

impl TransliterationResult {
    pub fn is_empty(&self) -> bool {
        self.exact_match.is_empty() && self.candidates.is_empty() && self.greedy_exact.is_empty()
    }

    /// Best single rendering: exact matches first, then candidates, then greedy.
    pub fn best(&self) -> Option<&Suggestion> {
        self.exact_match
            .first()
            .or_else(|| self.candidates.first())
            .or_else(|| self.greedy_exact.first())
    }
}

/// Ordering used by `rank`: more recently learned first, then higher weight.
///
/// Strictly lexicographic. A more recent entry wins whatever its weight;
/// weight only breaks ties on `learned_on`.
pub fn compare(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.learned_on
        .cmp(&a.learned_on)
        .then_with(|| b.weight.cmp(&a.weight))
}

/// Sort suggestions by recency then weight.
///
/// The sort is stable: entries that tie on both keys keep the order in
/// which they were produced.
pub fn rank(mut suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    suggestions.sort_by(compare);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recency_beats_weight() {
        let ranked = rank(vec![
            Suggestion::new("heavy", 50),
            Suggestion::learned("recent", 1, 1_700_000_000),
            Suggestion::learned("older", 99, 1_600_000_000),
        ]);
        let texts: Vec<&str> = ranked.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["recent", "older", "heavy"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let input = vec![
            Suggestion::new("first", 7),
            Suggestion::new("top", 9),
            Suggestion::new("second", 7),
            Suggestion::new("third", 7),
        ];
        let ranked = rank(input);
        let texts: Vec<&str> = ranked.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn last_char_is_unicode_aware() {
        assert_eq!(last_char("കാ"), "ാ");
        assert_eq!(last_char(""), "");
        assert_eq!(Suggestion::new("ab", 0).last_char(), "b");
    }

    #[test]
    fn best_prefers_exact() {
        let mut result = TransliterationResult::default();
        assert!(result.best().is_none());
        result.candidates.push(Suggestion::new("cand", 1));
        assert_eq!(result.best().unwrap().text, "cand");
        result.exact_match.push(Suggestion::new("exact", 0));
        assert_eq!(result.best().unwrap().text, "exact");
    }
}
