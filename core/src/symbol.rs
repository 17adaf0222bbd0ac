//! Symbol rules and tokens.
//!
//! A `SymbolRule` is one row of a language's symbol table: an input pattern
//! (e.g. "ka") together with the glyphs it renders to and the metadata the
//! ranking needs. The tokenizer turns a word into a sequence of `Token`s,
//! each either a literal pass-through character or the set of rules that
//! matched that stretch of input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// How canonical a rule is. Exact rules are the primary transliteration,
/// possibilities are alternates accepted for fuzzy typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    Exact = 1,
    Possibility = 2,
}

impl MatchKind {
    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

/// Positional constraint of a rule within a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceptCondition {
    Any,
    OnlyAtStart,
    OnlyAtEnd,
    OnlyInBetween,
}

impl AcceptCondition {
    /// Position state of token `index` in a tokenization of `len` tokens.
    pub fn for_position(index: usize, len: usize) -> Self {
        if index == 0 {
            AcceptCondition::OnlyAtStart
        } else if index + 1 == len {
            AcceptCondition::OnlyAtEnd
        } else {
            AcceptCondition::OnlyInBetween
        }
    }

    /// Whether a rule carrying this condition may be used in `state`.
    pub fn accepts(self, state: AcceptCondition) -> bool {
        self == AcceptCondition::Any || self == state
    }
}

/// General class of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Ordinary,
    Vowel,
    Consonant,
    Number,
    /// The joiner that suppresses the inherent vowel (virama / halant).
    Virama,
    Symbol,
}

/// Which rules a tokenization may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchScope {
    All,
    ExactOnly,
}

impl MatchScope {
    pub fn admits(self, kind: MatchKind) -> bool {
        match self {
            MatchScope::All => true,
            MatchScope::ExactOnly => kind == MatchKind::Exact,
        }
    }
}

/// One entry of the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRule {
    /// Input sequence this rule matches.
    pub pattern: String,
    /// Glyph emitted at the start of a word.
    pub rendered_start: String,
    /// Glyph emitted inside a word. Empty when the rule has a single form.
    pub rendered_mid: String,
    /// Intrinsic priority; lower is more preferred.
    pub weight: i32,
    pub match_kind: MatchKind,
    pub accept_condition: AcceptCondition,
    pub kind: SymbolKind,
}

impl SymbolRule {
    /// An unconstrained exact rule with a single rendered form.
    pub fn new<P: Into<String>, V: Into<String>>(pattern: P, value: V, weight: i32) -> Self {
        Self {
            pattern: pattern.into(),
            rendered_start: value.into(),
            rendered_mid: String::new(),
            weight,
            match_kind: MatchKind::Exact,
            accept_condition: AcceptCondition::Any,
            kind: SymbolKind::Ordinary,
        }
    }

    pub fn with_mid<V: Into<String>>(mut self, mid: V) -> Self {
        self.rendered_mid = mid.into();
        self
    }

    pub fn with_match_kind(mut self, kind: MatchKind) -> Self {
        self.match_kind = kind;
        self
    }

    pub fn with_accept(mut self, condition: AcceptCondition) -> Self {
        self.accept_condition = condition;
        self
    }

    pub fn with_kind(mut self, kind: SymbolKind) -> Self {
        self.kind = kind;
        self
    }

    /// Rendered form for a token at `position`: the word-start form at 0,
    /// the mid-word form anywhere else.
    pub fn rendered_at(&self, position: usize) -> &str {
        if position == 0 || self.rendered_mid.is_empty() {
            &self.rendered_start
        } else {
            &self.rendered_mid
        }
    }

    pub fn is_virama(&self) -> bool {
        self.kind == SymbolKind::Virama
    }
}

/// Payload of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Passed through to the output unchanged.
    Literal(char),
    /// Candidate rules, in symbol-table order.
    Ambiguous(Vec<SymbolRule>),
}

/// One matched unit of an input word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character range of the input word covered by this token.
    pub span: Range<usize>,
}

impl Token {
    pub fn literal(ch: char, at: usize) -> Self {
        Self {
            kind: TokenKind::Literal(ch),
            span: at..at + 1,
        }
    }

    pub fn ambiguous(rules: Vec<SymbolRule>, span: Range<usize>) -> Self {
        Self {
            kind: TokenKind::Ambiguous(rules),
            span,
        }
    }

    /// Number of input characters this token consumed.
    pub fn input_len(&self) -> usize {
        self.span.len()
    }

    pub fn rules(&self) -> &[SymbolRule] {
        match &self.kind {
            TokenKind::Ambiguous(rules) => rules,
            TokenKind::Literal(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    what: &'static str,
    value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.what, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

fn parse_error(what: &'static str, value: &str) -> ParseEnumError {
    ParseEnumError {
        what,
        value: value.to_string(),
    }
}

impl FromStr for MatchKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "1" => Ok(MatchKind::Exact),
            "possibility" | "2" => Ok(MatchKind::Possibility),
            _ => Err(parse_error("match kind", s)),
        }
    }
}

impl FromStr for AcceptCondition {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "all" | "" => Ok(AcceptCondition::Any),
            "start" | "starts_with" => Ok(AcceptCondition::OnlyAtStart),
            "end" | "ends_with" => Ok(AcceptCondition::OnlyAtEnd),
            "between" | "in_between" => Ok(AcceptCondition::OnlyInBetween),
            _ => Err(parse_error("accept condition", s)),
        }
    }
}

impl FromStr for SymbolKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinary" | "" => Ok(SymbolKind::Ordinary),
            "vowel" => Ok(SymbolKind::Vowel),
            "consonant" => Ok(SymbolKind::Consonant),
            "number" => Ok(SymbolKind::Number),
            "virama" => Ok(SymbolKind::Virama),
            "symbol" => Ok(SymbolKind::Symbol),
            _ => Err(parse_error("symbol kind", s)),
        }
    }
}
