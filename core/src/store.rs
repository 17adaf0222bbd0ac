//! Learned-word and pattern store.
//!
//! Responsibilities implemented here:
//! - `LearnedStore`: redb database holding two tables
//!   - `words`: rendered word -> `WordEntry` (weight, last learned time)
//!   - `patterns`: input pattern -> list of rendered words
//! - `Dictionary` and `PatternDictionary` lookups used by the engine
//! - the write path (`learn`, `unlearn`, `train`, `import`) used by the
//!   facade and the tools
//!
//! Every redb or bincode failure surfaces as `VarnamError::StoreUnavailable`.

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::{Dictionary, PatternDictionary};
use crate::error::{Result, VarnamError};
use crate::suggestion::{rank, DictionaryMatch, PatternMatch, Suggestion};
use crate::symbol::{Token, TokenKind};
use crate::weight::LanguageRules;

const WORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("words");
const PATTERNS: TableDefinition<&str, &[u8]> = TableDefinition::new("patterns");

/// Stored metadata of a learned word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub weight: i32,
    pub learned_on: i64,
}

/// Seconds since the Unix epoch.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Redb-backed learned-word and pattern store.
///
/// Cloning is cheap and shares the underlying database handle.
#[derive(Clone)]
pub struct LearnedStore {
    db: Arc<Database>,
    path: Option<PathBuf>,
    pattern_limit: usize,
    more_limit: usize,
}

impl std::fmt::Debug for LearnedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearnedStore")
            .field("path", &self.path)
            .field("pattern_limit", &self.pattern_limit)
            .field("more_limit", &self.more_limit)
            .finish()
    }
}

impl LearnedStore {
    pub const DEFAULT_PATTERN_LIMIT: usize = 10;
    pub const DEFAULT_MORE_LIMIT: usize = 5;

    /// Create or open the store at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| VarnamError::io(parent, e))?;
            }
        }
        let db = Database::create(path)?;
        let store = Self::from_database(db, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "opened learnings store");
        Ok(store)
    }

    /// A store that lives only in memory.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::from_database(db, None)
    }

    fn from_database(db: Database, path: Option<PathBuf>) -> Result<Self> {
        // Make sure both tables exist so read transactions never miss them.
        let txn = db.begin_write()?;
        {
            txn.open_table(WORDS)?;
            txn.open_table(PATTERNS)?;
        }
        txn.commit()?;
        Ok(Self {
            db: Arc::new(db),
            path,
            pattern_limit: Self::DEFAULT_PATTERN_LIMIT,
            more_limit: Self::DEFAULT_MORE_LIMIT,
        })
    }

    /// Cap the number of pattern matches and per-word completions returned.
    pub fn with_limits(mut self, pattern_limit: usize, more_limit: usize) -> Self {
        self.pattern_limit = pattern_limit;
        self.more_limit = more_limit;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Learn a word: bump its weight by one and stamp it with the current time.
    pub fn learn(&self, word: &str) -> Result<()> {
        self.learn_with_weight(word, 1)
    }

    /// Learn a word, adding `delta` to its weight.
    pub fn learn_with_weight(&self, word: &str, delta: i32) -> Result<()> {
        if word.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(WORDS)?;
            let existing = match table.get(word)? {
                Some(v) => Some(bincode::deserialize::<WordEntry>(v.value())?),
                None => None,
            };
            let entry = WordEntry {
                weight: existing.map_or(delta, |e| e.weight.saturating_add(delta)),
                learned_on: now(),
            };
            let bytes = bincode::serialize(&entry)?;
            table.insert(word, bytes.as_slice())?;
        }
        txn.commit()?;
        tracing::debug!(word, "learned word");
        Ok(())
    }

    /// Forget a word and every pattern pointing at it.
    ///
    /// Returns whether the word was stored.
    pub fn unlearn(&self, word: &str) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed;
        {
            let mut words = txn.open_table(WORDS)?;
            removed = words.remove(word)?.is_some();

            let mut patterns = txn.open_table(PATTERNS)?;
            let mut rewritten: Vec<(String, Vec<String>)> = Vec::new();
            for item in patterns.iter()? {
                let (key, value) = item?;
                let list: Vec<String> = bincode::deserialize(value.value())?;
                if list.iter().any(|w| w == word) {
                    let kept = list.into_iter().filter(|w| w != word).collect();
                    rewritten.push((key.value().to_string(), kept));
                }
            }
            for (pattern, list) in rewritten {
                if list.is_empty() {
                    patterns.remove(pattern.as_str())?;
                } else {
                    let bytes = bincode::serialize(&list)?;
                    patterns.insert(pattern.as_str(), bytes.as_slice())?;
                }
            }
        }
        txn.commit()?;
        Ok(removed)
    }

    /// Map the input `pattern` directly to `word`, learning the word if needed.
    pub fn train(&self, pattern: &str, word: &str) -> Result<()> {
        if pattern.is_empty() || word.is_empty() {
            return Ok(());
        }
        if self.entry(word)?.is_none() {
            self.learn(word)?;
        }

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PATTERNS)?;
            let mut list: Vec<String> = match table.get(pattern)? {
                Some(v) => bincode::deserialize(v.value())?,
                None => Vec::new(),
            };
            if !list.iter().any(|w| w == word) {
                list.push(word.to_string());
                let bytes = bincode::serialize(&list)?;
                table.insert(pattern, bytes.as_slice())?;
            }
        }
        txn.commit()?;
        tracing::debug!(pattern, word, "trained pattern");
        Ok(())
    }

    /// Stored entry for `word`, if any.
    pub fn entry(&self, word: &str) -> Result<Option<WordEntry>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WORDS)?;
        match table.get(word)? {
            Some(v) => Ok(Some(bincode::deserialize(v.value())?)),
            None => Ok(None),
        }
    }

    /// All learned words with their entries, in key order.
    pub fn words(&self) -> Result<Vec<(String, WordEntry)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WORDS)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (k, v) = item?;
            out.push((k.value().to_string(), bincode::deserialize(v.value())?));
        }
        Ok(out)
    }

    /// All trained patterns with their words, in key order.
    pub fn patterns(&self) -> Result<Vec<(String, Vec<String>)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PATTERNS)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (k, v) = item?;
            out.push((k.value().to_string(), bincode::deserialize(v.value())?));
        }
        Ok(out)
    }

    /// Bulk insert entries in a single transaction, overwriting existing ones.
    pub fn import<I>(&self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (String, WordEntry)>,
    {
        let txn = self.db.begin_write()?;
        let mut count = 0;
        {
            let mut table = txn.open_table(WORDS)?;
            for (word, entry) in entries {
                if word.is_empty() {
                    continue;
                }
                let bytes = bincode::serialize(&entry)?;
                table.insert(word.as_str(), bytes.as_slice())?;
                count += 1;
            }
        }
        txn.commit()?;
        Ok(count)
    }
}

fn get_entry<T: ReadableTable<&'static str, &'static [u8]>>(
    table: &T,
    word: &str,
) -> Result<Option<WordEntry>> {
    match table.get(word)? {
        Some(v) => Ok(Some(bincode::deserialize(v.value())?)),
        None => Ok(None),
    }
}

/// True if some stored key equals or starts with `prefix`.
fn has_prefix<T: ReadableTable<&'static str, &'static [u8]>>(table: &T, prefix: &str) -> Result<bool> {
    let mut range = table.range(prefix..)?;
    match range.next() {
        Some(item) => {
            let (k, _) = item?;
            Ok(k.value().starts_with(prefix))
        }
        None => Ok(false),
    }
}

/// Stored keys that start with `prefix`, excluding `prefix` itself.
fn extensions<T: ReadableTable<&'static str, &'static [u8]>>(
    table: &T,
    prefix: &str,
) -> Result<Vec<(String, Vec<u8>)>> {
    let mut out = Vec::new();
    for item in table.range(prefix..)? {
        let (k, v) = item?;
        let key = k.value();
        if !key.starts_with(prefix) {
            break;
        }
        if key != prefix {
            out.push((key.to_string(), v.value().to_vec()));
        }
    }
    Ok(out)
}

impl Dictionary for LearnedStore {
    /// Walk the tokens, keeping every rendering that is a stored word or
    /// the start of one, and stop at the first token that keeps nothing.
    ///
    /// Renderings go through `LanguageRules::compute_step`, so a virama
    /// carries the same ZWNJ the expander gives it. Kept renderings carry
    /// the stored weight when they are themselves learned words, weight 0
    /// otherwise.
    fn lookup(&self, tokens: &[Token], lang: &LanguageRules) -> Result<DictionaryMatch> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WORDS)?;

        let mut found: Vec<Suggestion> = Vec::new();
        let mut consumed = 0;
        let mut position = 0;

        for (i, token) in tokens.iter().enumerate() {
            let mut renderings: Vec<String> = Vec::new();
            match &token.kind {
                TokenKind::Ambiguous(rules) if i == 0 => {
                    renderings.extend(rules.iter().map(|r| r.rendered_at(0).to_string()));
                }
                TokenKind::Ambiguous(rules) => {
                    for till in &found {
                        for rule in rules {
                            let (value, _) =
                                lang.compute_step(0, rule, till.last_char(), tokens.len(), i);
                            renderings.push(format!("{}{}", till.text, value));
                        }
                    }
                }
                TokenKind::Literal(ch) => {
                    for till in &found {
                        let mut text = till.text.clone();
                        text.push(*ch);
                        renderings.push(text);
                    }
                }
            }

            let mut seen = HashSet::new();
            let mut step = Vec::new();
            for text in renderings {
                if !seen.insert(text.clone()) || !has_prefix(&table, &text)? {
                    continue;
                }
                let sug = match get_entry(&table, &text)? {
                    Some(entry) => Suggestion::learned(text, entry.weight, entry.learned_on),
                    None => Suggestion::new(text, 0),
                };
                step.push(sug);
            }

            if step.is_empty() {
                break;
            }
            found = step;
            consumed = i + 1;
            position = token.span.end;
        }

        Ok(DictionaryMatch {
            exact_match: !found.is_empty() && consumed == tokens.len(),
            suggestions: found,
            longest_match_position: position,
        })
    }

    fn lookup_more(&self, sugs: &[Suggestion]) -> Result<Vec<Vec<Suggestion>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WORDS)?;

        let mut out = Vec::with_capacity(sugs.len());
        for sug in sugs {
            let mut more = Vec::new();
            for (word, bytes) in extensions(&table, &sug.text)? {
                let entry: WordEntry = bincode::deserialize(&bytes)?;
                more.push(Suggestion::learned(word, entry.weight, entry.learned_on));
            }
            let mut more = rank(more);
            more.truncate(self.more_limit);
            out.push(more);
        }
        Ok(out)
    }
}

impl PatternDictionary for LearnedStore {
    /// Patterns that are a prefix of `word`, then patterns that extend it,
    /// longest first.
    fn lookup(&self, word: &str) -> Result<Vec<PatternMatch>> {
        if word.is_empty() {
            return Ok(Vec::new());
        }
        let txn = self.db.begin_read()?;
        let patterns = txn.open_table(PATTERNS)?;
        let words = txn.open_table(WORDS)?;

        let mut hits: Vec<(usize, Vec<String>)> = Vec::new();
        let mut prefix = String::new();
        for (i, ch) in word.chars().enumerate() {
            prefix.push(ch);
            if let Some(v) = patterns.get(prefix.as_str())? {
                hits.push((i + 1, bincode::deserialize(v.value())?));
            }
        }
        for (key, bytes) in extensions(&patterns, word)? {
            hits.push((key.chars().count(), bincode::deserialize(&bytes)?));
        }
        hits.sort_by(|a, b| b.0.cmp(&a.0));

        let mut out = Vec::new();
        'outer: for (matched_length, list) in hits {
            for text in list {
                if out.len() >= self.pattern_limit {
                    break 'outer;
                }
                let suggestion = match get_entry(&words, &text)? {
                    Some(e) => Suggestion::learned(text, e.weight, e.learned_on),
                    None => Suggestion::new(text, 0),
                };
                out.push(PatternMatch {
                    matched_length,
                    suggestion,
                });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolRule;

    const VIRAMA: &str = "\u{0d4d}";

    fn lang() -> LanguageRules {
        LanguageRules::new(VIRAMA)
    }

    fn amb(values: &[&str], span: std::ops::Range<usize>) -> Token {
        Token::ambiguous(
            values.iter().map(|v| SymbolRule::new("", *v, 0)).collect(),
            span,
        )
    }

    #[test]
    fn learn_and_entry() {
        let store = LearnedStore::in_memory().unwrap();
        assert!(store.entry("മലയാളം").unwrap().is_none());
        store.learn("മലയാളം").unwrap();
        store.learn("മലയാളം").unwrap();
        let entry = store.entry("മലയാളം").unwrap().unwrap();
        assert_eq!(entry.weight, 2);
        assert!(entry.learned_on > 0);
    }

    #[test]
    fn lookup_walks_prefixes() {
        let store = LearnedStore::in_memory().unwrap();
        store.learn("abc").unwrap();

        let tokens = vec![amb(&["a", "x"], 0..1), amb(&["b"], 1..2), amb(&["c", "d"], 2..3)];
        let m = Dictionary::lookup(&store, &tokens, &lang()).unwrap();
        assert!(m.exact_match);
        assert_eq!(m.suggestions.len(), 1);
        assert_eq!(m.suggestions[0].text, "abc");
        assert_eq!(m.suggestions[0].weight, 1);
        assert_eq!(m.longest_match_position, 3);
    }

    #[test]
    fn lookup_reports_partial_prefix() {
        let store = LearnedStore::in_memory().unwrap();
        store.learn("ab").unwrap();

        let tokens = vec![amb(&["a"], 0..1), amb(&["b"], 1..3), amb(&["q"], 3..4)];
        let m = Dictionary::lookup(&store, &tokens, &lang()).unwrap();
        assert!(!m.exact_match);
        assert_eq!(m.suggestions[0].text, "ab");
        assert_eq!(m.longest_match_position, 3);
    }

    #[test]
    fn lookup_renders_virama_with_zwnj() {
        let store = LearnedStore::in_memory().unwrap();
        let word = format!("ക{}\u{200c}ക", VIRAMA);
        store.learn(&word).unwrap();

        let virama = SymbolRule::new("~", VIRAMA, 0).with_kind(crate::symbol::SymbolKind::Virama);
        let tokens = vec![
            amb(&["ക"], 0..2),
            Token::ambiguous(vec![virama], 2..3),
            amb(&["ക"], 3..5),
        ];
        let m = Dictionary::lookup(&store, &tokens, &lang()).unwrap();
        assert!(m.exact_match);
        assert_eq!(m.suggestions[0].text, word);
        assert_eq!(m.suggestions[0].weight, 1);
    }

    #[test]
    fn lookup_more_returns_completions() {
        let store = LearnedStore::in_memory().unwrap();
        store.learn("ab").unwrap();
        store.learn("abc").unwrap();
        store.learn_with_weight("abd", 5).unwrap();
        store.learn("b").unwrap();

        let more = store.lookup_more(&[Suggestion::new("ab", 0)]).unwrap();
        let texts: Vec<&str> = more[0].iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&"abc") && texts.contains(&"abd"));
    }

    #[test]
    fn pattern_lookup_lengths() {
        let store = LearnedStore::in_memory().unwrap();
        store.train("mal", "മൽ").unwrap();
        store.train("malayalam", "മലയാളം").unwrap();
        store.train("malayala", "മലയാള").unwrap();

        let hits = PatternDictionary::lookup(&store, "malayala").unwrap();
        let lengths: Vec<usize> = hits.iter().map(|h| h.matched_length).collect();
        assert_eq!(lengths, vec![9, 8, 3]);
        assert_eq!(hits[0].suggestion.text, "മലയാളം");
        assert!(store.entry("മൽ").unwrap().is_some());
    }

    #[test]
    fn unlearn_drops_patterns() {
        let store = LearnedStore::in_memory().unwrap();
        store.train("mal", "മൽ").unwrap();
        assert!(store.unlearn("മൽ").unwrap());
        assert!(!store.unlearn("മൽ").unwrap());
        assert!(store.patterns().unwrap().is_empty());
        assert!(PatternDictionary::lookup(&store, "mal").unwrap().is_empty());
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ml.learnings.redb");
        {
            let store = LearnedStore::open(&path).unwrap();
            store.learn("കേരളം").unwrap();
        }
        let store = LearnedStore::open(&path).unwrap();
        assert_eq!(store.words().unwrap().len(), 1);
        assert_eq!(store.path(), Some(path.as_path()));
    }
}
