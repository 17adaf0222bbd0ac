//! Symbol table: pattern index plus rule payloads.
//!
//! On disk a symbol table is a directory holding two artifacts:
//! - `symbols.fst`: fst map from input pattern to payload index
//! - `symbols.redb`: table `symbols` (index -> bincode `Vec<SymbolRule>`)
//!   and table `meta` (scheme id, language)
//!
//! Both are loaded fully into memory on open. Tokenization walks the fst
//! byte by byte to find the longest pattern starting at each position.

use fst::raw::Output;
use fst::{Map, MapBuilder};
use redb::{Database, ReadableTable, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

use crate::engine::SymbolSource;
use crate::error::{Result, VarnamError};
use crate::symbol::{MatchKind, MatchScope, SymbolKind, SymbolRule, Token};
use crate::weight::LanguageRules;

pub const INDEX_FILE: &str = "symbols.fst";
pub const PAYLOAD_FILE: &str = "symbols.redb";

const SYMBOLS: TableDefinition<u64, &[u8]> = TableDefinition::new("symbols");
const META: TableDefinition<&str, &str> = TableDefinition::new("meta");

/// Descriptive metadata stored alongside the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemeInfo {
    pub scheme: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    index: Map<Vec<u8>>,
    payloads: Vec<Vec<SymbolRule>>,
    info: SchemeInfo,
}

impl SymbolTable {
    /// Build a table from individual rules.
    ///
    /// Rules sharing a pattern are ordered exact-first, then by ascending
    /// weight; ties keep their input order.
    pub fn from_rules<I>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = SymbolRule>,
    {
        let mut grouped: BTreeMap<String, Vec<SymbolRule>> = BTreeMap::new();
        for rule in rules {
            if rule.pattern.is_empty() {
                continue;
            }
            grouped.entry(rule.pattern.clone()).or_default().push(rule);
        }

        let mut builder = MapBuilder::memory();
        let mut payloads = Vec::with_capacity(grouped.len());
        for (i, (pattern, mut bucket)) in grouped.into_iter().enumerate() {
            bucket.sort_by_key(|r| (r.match_kind, r.weight));
            builder.insert(pattern.as_bytes(), i as u64)?;
            payloads.push(bucket);
        }
        let index = Map::new(builder.into_inner()?)?;

        Ok(Self {
            index,
            payloads,
            info: SchemeInfo::default(),
        })
    }

    pub fn with_info(mut self, info: SchemeInfo) -> Self {
        self.info = info;
        self
    }

    /// Load a table from a directory containing `symbols.fst` and `symbols.redb`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let fst_path = dir.join(INDEX_FILE);
        let redb_path = dir.join(PAYLOAD_FILE);
        if !fst_path.is_file() || !redb_path.is_file() {
            return Err(VarnamError::ResourceNotFound(format!(
                "{} (expected {} and {})",
                dir.display(),
                INDEX_FILE,
                PAYLOAD_FILE
            )));
        }

        let bytes = std::fs::read(&fst_path).map_err(|e| VarnamError::io(&fst_path, e))?;
        let index = Map::new(bytes)?;

        let db = Database::open(&redb_path)?;
        let txn = db.begin_read()?;

        let mut payloads = vec![Vec::new(); index.len()];
        let table = txn.open_table(SYMBOLS)?;
        for item in table.iter()? {
            let (key, value) = item?;
            let idx = key.value() as usize;
            let slot = payloads.get_mut(idx).ok_or_else(|| {
                VarnamError::StoreUnavailable(
                    format!("symbol payload {} has no pattern in {}", idx, INDEX_FILE).into(),
                )
            })?;
            *slot = bincode::deserialize(value.value())?;
        }

        let mut info = SchemeInfo::default();
        match txn.open_table(META) {
            Ok(meta) => {
                if let Some(v) = meta.get("scheme")? {
                    info.scheme = v.value().to_string();
                }
                if let Some(v) = meta.get("language")? {
                    info.language = v.value().to_string();
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(
            path = %dir.display(),
            patterns = payloads.len(),
            scheme = %info.scheme,
            "loaded symbol table"
        );

        Ok(Self {
            index,
            payloads,
            info,
        })
    }

    /// Persist the table as `symbols.fst` + `symbols.redb` under `dir`,
    /// replacing any previous artifacts.
    pub fn write_artifacts<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| VarnamError::io(dir, e))?;

        let fst_path = dir.join(INDEX_FILE);
        std::fs::write(&fst_path, self.index.as_fst().as_bytes())
            .map_err(|e| VarnamError::io(&fst_path, e))?;

        let redb_path = dir.join(PAYLOAD_FILE);
        if redb_path.exists() {
            std::fs::remove_file(&redb_path).map_err(|e| VarnamError::io(&redb_path, e))?;
        }
        let db = Database::create(&redb_path)?;
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(SYMBOLS)?;
            for (i, bucket) in self.payloads.iter().enumerate() {
                let bytes = bincode::serialize(bucket)?;
                table.insert(i as u64, bytes.as_slice())?;
            }
            let mut meta = txn.open_table(META)?;
            meta.insert("scheme", self.info.scheme.as_str())?;
            meta.insert("language", self.info.language.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn info(&self) -> &SchemeInfo {
        &self.info
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// All rules stored under exactly `pattern`.
    pub fn search(&self, pattern: &str) -> &[SymbolRule] {
        match self.index.get(pattern) {
            Some(idx) => self
                .payloads
                .get(idx as usize)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => &[],
        }
    }

    /// Every rule in the table, grouped by pattern in lexical order.
    pub fn rules(&self) -> impl Iterator<Item = &SymbolRule> {
        self.payloads.iter().flatten()
    }

    fn has_rules_in_scope(&self, idx: u64, scope: MatchScope) -> bool {
        self.payloads
            .get(idx as usize)
            .is_some_and(|bucket| bucket.iter().any(|r| scope.admits(r.match_kind)))
    }

    fn rules_in_scope(&self, idx: u64, scope: MatchScope) -> Vec<SymbolRule> {
        self.payloads
            .get(idx as usize)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|r| scope.admits(r.match_kind))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Longest pattern with usable rules starting at character `start`.
    ///
    /// Returns the exclusive end position (in characters) and payload index.
    fn longest_match(&self, chars: &[char], start: usize, scope: MatchScope) -> Option<(usize, u64)> {
        let fst = self.index.as_fst();
        let mut node = fst.root();
        let mut out = Output::zero();
        let mut best = None;
        let mut buf = [0u8; 4];

        for (offset, ch) in chars[start..].iter().enumerate() {
            for &byte in ch.encode_utf8(&mut buf).as_bytes() {
                let Some(i) = node.find_input(byte) else {
                    return best;
                };
                let t = node.transition(i);
                out = out.cat(t.out);
                node = fst.node(t.addr);
            }
            if node.is_final() {
                let idx = out.cat(node.final_output()).value();
                if self.has_rules_in_scope(idx, scope) {
                    best = Some((start + offset + 1, idx));
                }
            }
        }
        best
    }
}

impl SymbolSource for SymbolTable {
    fn lookup_exact(&self, pattern: &str) -> Option<SymbolRule> {
        self.search(pattern)
            .iter()
            .find(|r| r.match_kind == MatchKind::Exact)
            .cloned()
    }

    fn tokenize(&self, word: &str, scope: MatchScope, rules: &LanguageRules) -> Vec<Token> {
        let chars: Vec<char> = word.chars().collect();
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            let Some((end, idx)) = self.longest_match(&chars, pos, scope) else {
                tokens.push(Token::literal(chars[pos], pos));
                pos += 1;
                continue;
            };

            let matched = self.rules_in_scope(idx, scope);
            let is_number = matched.first().is_some_and(|r| r.kind == SymbolKind::Number);
            if is_number && !rules.use_native_digits {
                for (offset, ch) in chars[pos..end].iter().enumerate() {
                    tokens.push(Token::literal(*ch, pos + offset));
                }
            } else {
                tokens.push(Token::ambiguous(matched, pos..end));
            }
            pos = end;
        }

        tokens
    }
}
