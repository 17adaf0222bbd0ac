// Merge order and error propagation of `Engine::transliterate`, driven by
// scripted stores.

use std::thread;
use std::time::Duration;

use varnam_core::{
    Dictionary, DictionaryMatch, Engine, LanguageRules, PatternDictionary, PatternMatch, Result,
    Suggestion, SymbolKind, SymbolRule, SymbolTable, Token, VarnamError,
};

fn table() -> SymbolTable {
    SymbolTable::from_rules(vec![
        SymbolRule::new("~", "\u{0d4d}", 0).with_kind(SymbolKind::Virama),
        SymbolRule::new("a", "x", 0),
        SymbolRule::new("b", "y", 0),
    ])
    .unwrap()
}

#[derive(Clone, Default)]
struct Scripted {
    matched: DictionaryMatch,
    patterns: Vec<PatternMatch>,
    delay: Duration,
    fail_patterns: bool,
    fail_more: bool,
}

impl Dictionary for Scripted {
    fn lookup(&self, _tokens: &[Token], _rules: &LanguageRules) -> Result<DictionaryMatch> {
        thread::sleep(self.delay);
        Ok(self.matched.clone())
    }

    fn lookup_more(&self, sugs: &[Suggestion]) -> Result<Vec<Vec<Suggestion>>> {
        if self.fail_more {
            return Err(VarnamError::StoreUnavailable("more lookup failed".into()));
        }
        Ok(vec![Vec::new(); sugs.len()])
    }
}

impl PatternDictionary for Scripted {
    fn lookup(&self, _word: &str) -> Result<Vec<PatternMatch>> {
        if self.fail_patterns {
            return Err(VarnamError::StoreUnavailable("pattern lookup failed".into()));
        }
        Ok(self.patterns.clone())
    }
}

fn engine(script: Scripted) -> Engine<SymbolTable, Scripted, Scripted> {
    Engine::new(table(), script.clone(), script).unwrap()
}

fn texts(sugs: &[Suggestion]) -> Vec<&str> {
    sugs.iter().map(|s| s.text.as_str()).collect()
}

fn pattern(matched_length: usize, text: &str) -> PatternMatch {
    PatternMatch {
        matched_length,
        suggestion: Suggestion::learned(text, 5, 100),
    }
}

#[test]
fn dictionary_candidates_precede_pattern_candidates_on_ties() {
    let engine = engine(Scripted {
        matched: DictionaryMatch {
            suggestions: vec![Suggestion::learned("D", 5, 100)],
            exact_match: false,
            longest_match_position: 1,
        },
        patterns: vec![pattern(1, "P")],
        ..Scripted::default()
    });

    let result = engine.transliterate("ab").unwrap();
    assert!(result.exact_match.is_empty());
    assert_eq!(texts(&result.candidates), vec!["Dy", "Py", "xy"]);
    assert_eq!(result.candidates[0].weight, result.candidates[1].weight);
}

#[test]
fn slow_dictionary_still_merges_first() {
    let engine = engine(Scripted {
        matched: DictionaryMatch {
            suggestions: vec![Suggestion::learned("D", 5, 100)],
            exact_match: true,
            longest_match_position: 2,
        },
        patterns: vec![pattern(2, "P")],
        delay: Duration::from_millis(100),
        ..Scripted::default()
    });

    for _ in 0..3 {
        let result = engine.transliterate("ab").unwrap();
        assert_eq!(texts(&result.exact_match), vec!["D", "P"]);
        assert_eq!(texts(&result.greedy_exact), vec!["xy"]);
        assert!(result.candidates.is_empty());
    }
}

#[test]
fn pattern_store_failure_propagates() {
    let engine = engine(Scripted {
        fail_patterns: true,
        ..Scripted::default()
    });
    let err = engine.transliterate("ab").unwrap_err();
    assert!(err.is_store_failure());
}

#[test]
fn completion_lookup_failure_propagates() {
    let engine = engine(Scripted {
        matched: DictionaryMatch {
            suggestions: vec![Suggestion::learned("D", 5, 100)],
            exact_match: true,
            longest_match_position: 2,
        },
        fail_more: true,
        ..Scripted::default()
    });
    let err = engine.transliterate("ab").unwrap_err();
    assert!(matches!(err, VarnamError::StoreUnavailable(_)));
}
