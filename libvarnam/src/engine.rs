// libvarnam/src/engine.rs
//
// Language facade: resolves resources, owns the core engine and the
// learnings store, and caches results per normalized input.

use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use std::path::Path;

use lru::LruCache;
use varnam_core::{
    utils, Engine, LearnedStore, Result, SymbolTable, TransliterationResult, VarnamError,
};

use crate::config::VarnamConfig;
use crate::paths;

type CoreEngine = Engine<SymbolTable, LearnedStore, LearnedStore>;

/// A transliteration handle for one language.
///
/// Holds the symbol table, the learnings store and an LRU cache of recent
/// results. Not `Sync`: share one handle per thread.
pub struct Varnam {
    engine: Option<CoreEngine>,
    config: VarnamConfig,
    cache: RefCell<LruCache<String, TransliterationResult>>,
    cache_hits: Cell<usize>,
    cache_misses: Cell<usize>,
}

impl Varnam {
    /// Open a handle from an explicit symbol table directory and learnings file.
    pub fn init<P: AsRef<Path>, Q: AsRef<Path>>(
        vst_dir: P,
        learnings_path: Q,
        config: VarnamConfig,
    ) -> Result<Self> {
        let symbols = SymbolTable::open(vst_dir.as_ref())?;
        let store = LearnedStore::open(learnings_path.as_ref())?;
        Self::from_parts(symbols, store, config)
    }

    /// Open a handle for `lang`, locating its files on the search path.
    pub fn init_from_lang(lang: &str, config: VarnamConfig) -> Result<Self> {
        let vst_dir = paths::find_vst_dir(lang, &config)?;
        let learnings = paths::learnings_path(lang, &config);
        tracing::info!(
            lang,
            vst = %vst_dir.display(),
            learnings = %learnings.display(),
            "initializing varnam"
        );
        Self::init(vst_dir, learnings, config)
    }

    /// Build a handle around an already-loaded table and store.
    ///
    /// The store's result limits are taken from `config`.
    pub fn from_parts(symbols: SymbolTable, store: LearnedStore, config: VarnamConfig) -> Result<Self> {
        let store = store.with_limits(config.base.pattern_limit, config.base.dictionary_more_limit);
        let mut engine = Engine::new(symbols, store.clone(), store)?;
        engine.set_debug(config.base.debug);

        let capacity = NonZeroUsize::new(config.base.max_cache_size).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            engine: Some(engine),
            config,
            cache: RefCell::new(LruCache::new(capacity)),
            cache_hits: Cell::new(0),
            cache_misses: Cell::new(0),
        })
    }

    fn engine(&self) -> Result<&CoreEngine> {
        self.engine.as_ref().ok_or(VarnamError::Closed)
    }

    fn store(&self) -> Result<&LearnedStore> {
        Ok(self.engine()?.dictionary())
    }

    pub fn config(&self) -> &VarnamConfig {
        &self.config
    }

    /// Scheme metadata of the loaded symbol table.
    pub fn scheme(&self) -> Result<&varnam_core::SchemeInfo> {
        Ok(self.engine()?.symbols().info())
    }

    /// Transliterate one word.
    ///
    /// Input is NFC-normalized and trimmed first; results for the same
    /// normalized input are served from the cache until the next write.
    pub fn transliterate(&self, input: &str) -> Result<TransliterationResult> {
        let engine = self.engine()?;
        let word = utils::normalize(input);

        if let Some(cached) = self.cache.borrow_mut().get(&word) {
            self.cache_hits.set(self.cache_hits.get() + 1);
            return Ok(cached.clone());
        }
        self.cache_misses.set(self.cache_misses.get() + 1);

        let result = engine.transliterate(&word)?;
        self.cache.borrow_mut().put(word, result.clone());
        Ok(result)
    }

    /// Record that the user picked `word`.
    pub fn learn(&self, word: &str) -> Result<()> {
        let word = utils::normalize(word);
        self.store()?.learn(&word)?;
        self.clear_cache();
        Ok(())
    }

    /// Forget `word`. Returns whether it had been learned.
    pub fn unlearn(&self, word: &str) -> Result<bool> {
        let word = utils::normalize(word);
        let removed = self.store()?.unlearn(&word)?;
        self.clear_cache();
        Ok(removed)
    }

    /// Map the input `pattern` straight to `word`.
    pub fn train(&self, pattern: &str, word: &str) -> Result<()> {
        let pattern = utils::normalize(pattern);
        let word = utils::normalize(word);
        self.store()?.train(&pattern, &word)?;
        self.clear_cache();
        Ok(())
    }

    /// Toggle logging of intermediate lookup results.
    pub fn debug(&mut self, enabled: bool) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(VarnamError::Closed)?;
        engine.set_debug(enabled);
        self.config.base.debug = enabled;
        Ok(())
    }

    pub fn is_debug(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.is_debug())
    }

    /// Release the symbol table and the store. Safe to call more than once.
    pub fn close(&mut self) {
        if self.engine.take().is_some() {
            self.clear_cache();
            tracing::info!("varnam handle closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// Get cache statistics for monitoring: (hits, misses).
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.cache_hits.get(), self.cache_misses.get())
    }

    /// Get current cache size (number of entries).
    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Clear the cache and reset its statistics.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        self.cache_hits.set(0);
        self.cache_misses.set(0);
    }
}

impl Drop for Varnam {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use varnam_core::{SymbolKind, SymbolRule};

    fn handle() -> Varnam {
        handle_with(VarnamConfig::default())
    }

    fn handle_with(config: VarnamConfig) -> Varnam {
        let table = SymbolTable::from_rules(vec![
            SymbolRule::new("~", "\u{0d4d}", 0).with_kind(SymbolKind::Virama),
            SymbolRule::new("ka", "ക", 0),
            SymbolRule::new("la", "ല", 0),
        ])
        .unwrap();
        Varnam::from_parts(table, LearnedStore::in_memory().unwrap(), config).unwrap()
    }

    #[test]
    fn cache_hits_on_normalized_input() {
        let v = handle();
        let first = v.transliterate("kala").unwrap();
        let second = v.transliterate("  kala ").unwrap();
        assert_eq!(first, second);
        assert_eq!(v.cache_stats(), (1, 1));
        assert_eq!(v.cache_size(), 1);
    }

    #[test]
    fn learning_invalidates_cache() {
        let v = handle();
        assert!(v.transliterate("kala").unwrap().exact_match.is_empty());
        v.learn("കല").unwrap();
        assert_eq!(v.cache_size(), 0);
        assert_eq!(v.transliterate("kala").unwrap().exact_match[0].text, "കല");
    }

    #[test]
    fn closed_handle_rejects_calls() {
        let mut v = handle();
        v.close();
        v.close();
        assert!(v.is_closed());
        assert!(matches!(v.transliterate("ka"), Err(VarnamError::Closed)));
        assert!(matches!(v.learn("ക"), Err(VarnamError::Closed)));
        assert!(matches!(v.debug(true), Err(VarnamError::Closed)));
    }

    #[test]
    fn debug_flag_roundtrip() {
        let mut v = handle();
        assert!(!v.is_debug());
        v.debug(true).unwrap();
        assert!(v.is_debug());
        assert!(v.config().base.debug);
    }

    #[test]
    fn config_limits_apply_to_store() {
        let mut config = VarnamConfig::default();
        config.base.pattern_limit = 1;
        config.base.dictionary_more_limit = 1;
        let v = handle_with(config);

        for word in ["ഖ", "ഗ", "ഘ"] {
            v.train("ka", word).unwrap();
        }
        assert_eq!(v.transliterate("ka").unwrap().exact_match.len(), 1);

        for word in ["ലക", "ലകം", "ലകി"] {
            v.learn(word).unwrap();
        }
        let result = v.transliterate("laka").unwrap();
        assert_eq!(result.exact_match[0].text, "ലക");
        assert_eq!(result.candidates.len(), 1);
    }
}
