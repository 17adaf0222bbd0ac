//! Scheme source format.
//!
//! One rule per line, tab separated:
//!
//! ```text
//! pattern  start  mid  weight  match  accept  kind
//! ```
//!
//! Only `pattern` and `start` are required. `-` leaves `mid` empty. Blank
//! lines and lines starting with `#` are skipped.

use anyhow::{bail, Context, Result};
use std::io::BufRead;
use varnam_core::{AcceptCondition, MatchKind, SymbolKind, SymbolRule};

fn field<'a>(parts: &[&'a str], i: usize) -> Option<&'a str> {
    parts.get(i).map(|s| s.trim()).filter(|s| !s.is_empty() && *s != "-")
}

pub fn parse_line(line: &str) -> Result<Option<SymbolRule>> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split('\t').collect();
    if parts.len() < 2 || parts[0].is_empty() {
        bail!("expected at least pattern and rendering, got {:?}", trimmed);
    }

    let mut rule = SymbolRule::new(parts[0], parts[1], 0);
    if let Some(mid) = field(&parts, 2) {
        rule = rule.with_mid(mid);
    }
    if let Some(w) = field(&parts, 3) {
        rule.weight = w.parse().with_context(|| format!("bad weight {:?}", w))?;
    }
    if let Some(m) = field(&parts, 4) {
        rule = rule.with_match_kind(m.parse::<MatchKind>()?);
    }
    if let Some(a) = field(&parts, 5) {
        rule = rule.with_accept(a.parse::<AcceptCondition>()?);
    }
    if let Some(k) = field(&parts, 6) {
        rule = rule.with_kind(k.parse::<SymbolKind>()?);
    }
    Ok(Some(rule))
}

/// Parse every rule from `reader`, reporting the failing line number.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<SymbolRule>> {
    let mut rules = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(rule) = parse_line(&line).with_context(|| format!("line {}", i + 1))? {
            rules.push(rule);
        }
    }
    Ok(rules)
}
