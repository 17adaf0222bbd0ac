// core/src/engine.rs
//
// Transliteration engine: tokenizes a word, fans out to the learned-word
// store, the pattern store and a greedy expansion, then merges and ranks.

use std::thread::{self, ScopedJoinHandle};

use crate::error::Result;
use crate::expander::{expand, extend_partial};
use crate::suggestion::{rank, DictionaryMatch, PatternMatch, Suggestion, TransliterationResult};
use crate::symbol::{MatchScope, SymbolRule, Token};
use crate::weight::LanguageRules;

/// Access to a language's symbol rules.
pub trait SymbolSource: Sync {
    /// First exact rule stored under `pattern`.
    fn lookup_exact(&self, pattern: &str) -> Option<SymbolRule>;

    /// Split `word` into tokens covering every character exactly once.
    fn tokenize(&self, word: &str, scope: MatchScope, rules: &LanguageRules) -> Vec<Token>;
}

/// Store of previously accepted words.
pub trait Dictionary: Sync {
    /// Longest run of leading tokens whose renderings lead to stored words.
    ///
    /// `rules` renders each step the way the expander does.
    fn lookup(&self, tokens: &[Token], rules: &LanguageRules) -> Result<DictionaryMatch>;

    /// Stored words extending each of `sugs`, one list per input suggestion.
    fn lookup_more(&self, sugs: &[Suggestion]) -> Result<Vec<Vec<Suggestion>>>;
}

/// Store of whole-word shortcut patterns.
pub trait PatternDictionary: Sync {
    fn lookup(&self, word: &str) -> Result<Vec<PatternMatch>>;
}

/// Generic transliteration engine over a symbol source and two stores.
pub struct Engine<S, D, P> {
    symbols: S,
    dictionary: D,
    patterns: P,
    rules: LanguageRules,
    debug: bool,
}

fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

impl<S, D, P> Engine<S, D, P>
where
    S: SymbolSource,
    D: Dictionary,
    P: PatternDictionary,
{
    /// Create an engine, deriving the language rules from `symbols`.
    pub fn new(symbols: S, dictionary: D, patterns: P) -> Result<Self> {
        let rules = LanguageRules::bootstrap(&symbols)?;
        tracing::info!(joiner = %rules.joiner.escape_unicode(), "engine initialized");
        Ok(Self {
            symbols,
            dictionary,
            patterns,
            rules,
            debug: false,
        })
    }

    pub fn rules(&self) -> &LanguageRules {
        &self.rules
    }

    pub fn symbols(&self) -> &S {
        &self.symbols
    }

    pub fn dictionary(&self) -> &D {
        &self.dictionary
    }

    pub fn patterns(&self) -> &P {
        &self.patterns
    }

    /// Log intermediate lookup results at info level.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Tokenize with every rule kind enabled.
    pub fn tokenize(&self, word: &str) -> Vec<Token> {
        self.symbols.tokenize(word, MatchScope::All, &self.rules)
    }

    /// Render `rest` onto the end of each of `seeds`.
    fn tokenize_rest_of_word(&self, rest: &str, seeds: Vec<Suggestion>) -> Vec<Suggestion> {
        let tokens = self.tokenize(rest);
        extend_partial(&self.rules, seeds, &tokens, rest)
    }

    /// Transliterate a word into three ranked suggestion lists.
    ///
    /// The dictionary, pattern and greedy lookups run concurrently; their
    /// results are merged in a fixed order regardless of completion order:
    /// dictionary, then patterns, then dictionary completions, then (only
    /// when nothing matched exactly) the full expansion.
    pub fn transliterate(&self, word: &str) -> Result<TransliterationResult> {
        if word.is_empty() {
            return Ok(TransliterationResult::default());
        }

        let tokens = self.tokenize(word);
        let word_len = word.chars().count();

        thread::scope(|scope| {
            let dict_task = scope.spawn(|| self.dictionary.lookup(&tokens, &self.rules));
            let pattern_task = scope.spawn(|| self.patterns.lookup(word));
            let greedy_task = scope.spawn(|| expand(&self.rules, &tokens, true, false));

            let mut result = TransliterationResult::default();
            let mut candidates: Vec<Suggestion> = Vec::new();
            let mut more_task = None;

            let dict = join(dict_task)?;
            if self.debug {
                tracing::info!(?dict, "dictionary results");
            }
            if !dict.suggestions.is_empty() {
                if dict.exact_match {
                    result.exact_match = dict.suggestions.clone();
                    let seeds = dict.suggestions;
                    more_task = Some(scope.spawn(move || self.dictionary.lookup_more(&seeds)));
                } else {
                    let rest: String = word.chars().skip(dict.longest_match_position).collect();
                    candidates = self.tokenize_rest_of_word(&rest, dict.suggestions);
                }
            }

            let pattern_matches = join(pattern_task)?;
            if self.debug && !pattern_matches.is_empty() {
                tracing::info!(?pattern_matches, "pattern dictionary results");
            }
            for m in pattern_matches {
                if m.matched_length < word_len {
                    let rest: String = word.chars().skip(m.matched_length).collect();
                    candidates.extend(self.tokenize_rest_of_word(&rest, vec![m.suggestion]));
                } else if m.matched_length == word_len {
                    result.exact_match.push(m.suggestion);
                } else {
                    candidates.push(m.suggestion);
                }
            }

            if let Some(task) = more_task {
                let more = join(task)?;
                if self.debug {
                    tracing::info!(?more, "more dictionary results");
                }
                candidates.extend(more.into_iter().flatten());
            }

            if result.exact_match.is_empty() {
                candidates.extend(expand(&self.rules, &tokens, false, false));
            }

            result.exact_match = rank(result.exact_match);
            result.candidates = rank(candidates);
            result.greedy_exact = rank(join(greedy_task));

            tracing::debug!(
                word,
                exact = result.exact_match.len(),
                candidates = result.candidates.len(),
                greedy = result.greedy_exact.len(),
                "transliterated"
            );
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VarnamError;
    use crate::symbol::SymbolKind;
    use crate::symbol_table::SymbolTable;
    use crate::weight::ZWNJ;

    struct NoWords;

    impl Dictionary for NoWords {
        fn lookup(&self, _tokens: &[Token], _rules: &LanguageRules) -> Result<DictionaryMatch> {
            Ok(DictionaryMatch::default())
        }

        fn lookup_more(&self, sugs: &[Suggestion]) -> Result<Vec<Vec<Suggestion>>> {
            Ok(vec![Vec::new(); sugs.len()])
        }
    }

    impl PatternDictionary for NoWords {
        fn lookup(&self, _word: &str) -> Result<Vec<PatternMatch>> {
            Ok(Vec::new())
        }
    }

    fn toy_table() -> SymbolTable {
        SymbolTable::from_rules(vec![
            SymbolRule::new("a", "x", 1),
            SymbolRule::new("~", "്", 0).with_kind(SymbolKind::Virama),
        ])
        .unwrap()
    }

    #[test]
    fn empty_word_is_empty_result() {
        let engine = Engine::new(toy_table(), NoWords, NoWords).unwrap();
        let result = engine.transliterate("").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn fallback_expansion_with_joiner() {
        let engine = Engine::new(toy_table(), NoWords, NoWords).unwrap();
        let result = engine.transliterate("a~a").unwrap();
        assert!(result.exact_match.is_empty());
        assert_eq!(result.candidates[0].text, format!("x്{}x", ZWNJ));
        assert_eq!(result.greedy_exact[0].text, result.candidates[0].text);
    }

    #[test]
    fn missing_joiner_rule_fails_init() {
        let table = SymbolTable::from_rules(vec![SymbolRule::new("a", "x", 1)]).unwrap();
        let err = Engine::new(table, NoWords, NoWords).err().unwrap();
        assert!(matches!(err, VarnamError::MalformedLanguageRules(_)));
    }
}
