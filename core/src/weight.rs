//! Weight engine and per-engine language rules.
//!
//! Every ambiguous token contributes a fragment of rendered text and a
//! weight delta to the suggestion it extends:
//!
//! ```text
//! new = base - rule.weight + (tokens - position) + (MATCH_KIND_PENALTY - ordinal(match_kind))
//! ```
//!
//! Earlier tokens add more through `(tokens - position)`, and exact rules
//! always add more than possibility rules.

use crate::engine::SymbolSource;
use crate::error::{Result, VarnamError};
use crate::suggestion::last_char;
use crate::symbol::SymbolRule;

/// Starting weight of a suggestion created from the first token.
pub const BASIC_WEIGHT: i32 = 10;

/// Larger than every `MatchKind` ordinal.
pub const MATCH_KIND_PENALTY: i32 = 3;

/// Zero-width non-joiner.
pub const ZWNJ: &str = "\u{200c}";

/// Input sequence that the symbol table maps to the joiner glyph.
pub const JOINER_PATTERN: &str = "~";

/// Script constants derived from the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRules {
    /// The script's virama / joiner glyph.
    pub joiner: String,
    /// Render digits with the script's own numerals. Never derived from the
    /// symbol table; stays false unless a caller flips it.
    pub use_native_digits: bool,
}

impl LanguageRules {
    pub fn new<J: Into<String>>(joiner: J) -> Self {
        Self {
            joiner: joiner.into(),
            use_native_digits: false,
        }
    }

    /// Derive the rules from a symbol table.
    ///
    /// Fails with `MalformedLanguageRules` when the table has no exact rule
    /// for the joiner pattern.
    pub fn bootstrap<S: SymbolSource + ?Sized>(symbols: &S) -> Result<Self> {
        let rule = symbols.lookup_exact(JOINER_PATTERN).ok_or_else(|| {
            VarnamError::MalformedLanguageRules(format!(
                "no exact rule for joiner pattern '{}'",
                JOINER_PATTERN
            ))
        })?;
        let joiner = rule.rendered_at(0);
        if joiner.is_empty() {
            return Err(VarnamError::MalformedLanguageRules(
                "joiner rule renders to an empty string".to_string(),
            ));
        }
        Ok(Self::new(joiner))
    }

    /// Rendered fragment and new weight for applying `rule` at `position`.
    ///
    /// `previous` is the last character already rendered. A virama right
    /// after a joiner glyph collapses to a lone ZWNJ so the output never
    /// carries two joiners in a row.
    pub fn compute_step(
        &self,
        base_weight: i32,
        rule: &SymbolRule,
        previous: &str,
        total_tokens: usize,
        position: usize,
    ) -> (String, i32) {
        let distance = total_tokens.saturating_sub(position) as i32;
        let new_weight = base_weight - rule.weight
            + distance
            + (MATCH_KIND_PENALTY - rule.match_kind.ordinal());

        let value = if rule.is_virama() {
            if previous == self.joiner {
                ZWNJ.to_string()
            } else {
                let mut v = rule.rendered_at(position).to_string();
                v.push_str(ZWNJ);
                v
            }
        } else {
            rule.rendered_at(position).to_string()
        };

        (value, new_weight)
    }

    /// `text` without a single trailing joiner glyph.
    pub fn strip_trailing_joiner<'a>(&self, text: &'a str) -> &'a str {
        let last = last_char(text);
        if !last.is_empty() && last == self.joiner {
            &text[..text.len() - last.len()]
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{MatchKind, SymbolKind};

    const VIRAMA: &str = "\u{0d4d}";

    fn rules() -> LanguageRules {
        LanguageRules::new(VIRAMA)
    }

    #[test]
    fn weight_formula() {
        let rule = SymbolRule::new("ka", "ക", 2);
        let (value, weight) = rules().compute_step(10, &rule, "a", 4, 1);
        assert_eq!(value, "ക");
        // 10 - 2 + (4 - 1) + (3 - 1)
        assert_eq!(weight, 13);

        let fuzzy = rule.clone().with_match_kind(MatchKind::Possibility);
        let (_, fuzzy_weight) = rules().compute_step(10, &fuzzy, "a", 4, 1);
        assert_eq!(fuzzy_weight, weight - 1);
    }

    #[test]
    fn earlier_positions_weigh_more() {
        let rule = SymbolRule::new("ka", "ക", 0);
        let (_, early) = rules().compute_step(0, &rule, "", 5, 1);
        let (_, late) = rules().compute_step(0, &rule, "", 5, 4);
        assert!(early > late);
    }

    #[test]
    fn virama_appends_zwnj() {
        let rule = SymbolRule::new("~", VIRAMA, 0).with_kind(SymbolKind::Virama);
        let (value, _) = rules().compute_step(0, &rule, "ക", 3, 1);
        assert_eq!(value, format!("{}{}", VIRAMA, ZWNJ));
    }

    #[test]
    fn virama_after_joiner_collapses() {
        let rule = SymbolRule::new("~", VIRAMA, 0).with_kind(SymbolKind::Virama);
        let (value, _) = rules().compute_step(0, &rule, VIRAMA, 3, 2);
        assert_eq!(value, ZWNJ);
        assert!(!value.contains(VIRAMA));
    }

    #[test]
    fn strip_joiner() {
        let r = rules();
        assert_eq!(r.strip_trailing_joiner("ക\u{0d4d}"), "ക");
        assert_eq!(r.strip_trailing_joiner("ക"), "ക");
        assert_eq!(r.strip_trailing_joiner(""), "");
    }
}
