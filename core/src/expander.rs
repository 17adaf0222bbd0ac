//! Token sequence → rendered suggestions.
//!
//! Every ambiguous token may branch the set of in-progress suggestions: the
//! first usable rule extends each suggestion in place, every other usable
//! rule extends a clone of the suggestion as it was before the step. With
//! `k` ambiguous tokens offering `m` rules each this yields up to `m^k`
//! suggestions.

use crate::suggestion::Suggestion;
use crate::symbol::{AcceptCondition, MatchKind, SymbolRule, Token, TokenKind};
use crate::weight::{LanguageRules, BASIC_WEIGHT};

/// Expand `tokens` into rendered suggestions, unsorted.
///
/// - `greedy_only`: skip possibility rules.
/// - `partial`: the tokens continue an existing word, so the first token is
///   rendered with its mid-word form.
pub fn expand(
    rules: &LanguageRules,
    tokens: &[Token],
    greedy_only: bool,
    partial: bool,
) -> Vec<Suggestion> {
    let total = tokens.len();
    let mut results: Vec<Suggestion> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let candidates = match &token.kind {
            TokenKind::Literal(ch) => {
                for sug in results.iter_mut() {
                    sug.text.push(*ch);
                }
                continue;
            }
            TokenKind::Ambiguous(candidates) => candidates,
        };

        let state = AcceptCondition::for_position(i, total);
        let usable: Vec<&SymbolRule> = candidates
            .iter()
            .filter(|rule| !(greedy_only && rule.match_kind == MatchKind::Possibility))
            .filter(|rule| rule.accept_condition.accepts(state))
            .collect();

        if i == 0 {
            let position = if partial { 1 } else { 0 };
            results.extend(
                usable
                    .iter()
                    .map(|rule| Suggestion::new(rule.rendered_at(position), BASIC_WEIGHT - rule.weight)),
            );
            continue;
        }

        let Some((first, others)) = usable.split_first() else {
            continue;
        };

        let mut branches = Vec::new();
        for sug in results.iter_mut() {
            let till = sug.clone();
            let previous = till.last_char();

            let (value, weight) = rules.compute_step(till.weight, first, previous, total, i);
            sug.text.push_str(&value);
            sug.weight = weight;

            for rule in others {
                let (value, weight) = rules.compute_step(till.weight, rule, previous, total, i);
                let mut branch = till.clone();
                branch.text.push_str(&value);
                branch.weight = weight;
                branches.push(branch);
            }
        }
        results.extend(branches);
    }

    results
}

/// Attach the rendering of the rest of a word to already-matched prefixes.
///
/// `rest_tokens` is the tokenization of `rest`, the input left over after
/// the prefixes. Each seed loses a trailing joiner glyph, then is crossed
/// with every suffix candidate: the first candidate extends the seed in
/// place, the others become new suggestions appended after the seeds.
pub fn extend_partial(
    rules: &LanguageRules,
    mut seeds: Vec<Suggestion>,
    rest_tokens: &[Token],
    rest: &str,
) -> Vec<Suggestion> {
    let suffixes = expand(rules, rest_tokens, false, true);

    let Some((first, others)) = suffixes.split_first() else {
        for seed in seeds.iter_mut() {
            seed.text.push_str(rest);
        }
        return seeds;
    };

    let mut branches = Vec::new();
    for seed in seeds.iter_mut() {
        let till = rules.strip_trailing_joiner(&seed.text).to_string();
        let till_weight = seed.weight;

        seed.text = format!("{}{}", till, first.text);
        seed.weight += first.weight;

        for suffix in others {
            branches.push(Suggestion::new(
                format!("{}{}", till, suffix.text),
                till_weight + suffix.weight,
            ));
        }
    }
    seeds.extend(branches);
    seeds
}
