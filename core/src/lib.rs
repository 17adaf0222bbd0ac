//! varnam-core
//!
//! Core transliteration machinery shared by the `libvarnam` facade and the
//! tools: symbol rules, tokenizer, weight engine, suggestion expander,
//! learned-word store and the merge/rank orchestrator.
//!
//! Symbol tables are stored as an FST pattern index plus a redb payload
//! table; learned words and patterns live in a separate redb file.
//!
//! Public API:
//! - `SymbolRule`, `Token` - rule records and tokenizer output
//! - `SymbolTable` - FST-indexed rule table implementing `SymbolSource`
//! - `LearnedStore` - redb store implementing `Dictionary` and `PatternDictionary`
//! - `Engine` - orchestrates tokenize, lookups, expansion and ranking
//! - `Suggestion`, `TransliterationResult` - ranked output
//! - `Config` - limits and flags, loadable from TOML
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Result, VarnamError};

pub mod symbol;
pub use symbol::{AcceptCondition, MatchKind, MatchScope, SymbolKind, SymbolRule, Token, TokenKind};

pub mod suggestion;
pub use suggestion::{
    rank, DictionaryMatch, PatternMatch, Suggestion, TransliterationResult,
};

pub mod weight;
pub use weight::LanguageRules;

pub mod expander;

pub mod symbol_table;
pub use symbol_table::{SchemeInfo, SymbolTable};

pub mod engine;
pub use engine::{Dictionary, Engine, PatternDictionary, SymbolSource};

pub mod store;
pub use store::{LearnedStore, WordEntry};

/// Engine configuration.
///
/// Only language-agnostic knobs live here; the facade adds paths on top.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of pattern-dictionary matches per lookup.
    pub pattern_limit: usize,
    /// Maximum number of completions fetched for each exact dictionary match.
    pub dictionary_more_limit: usize,
    /// Maximum number of entries in the input -> result cache
    pub max_cache_size: usize,
    /// Log intermediate lookup results.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern_limit: LearnedStore::DEFAULT_PATTERN_LIMIT,
            dictionary_more_limit: LearnedStore::DEFAULT_MORE_LIMIT,
            max_cache_size: 1000,
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| VarnamError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| VarnamError::io(path, e))
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VarnamError::Config(e.to_string()))
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VarnamError::Config(e.to_string()))
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
