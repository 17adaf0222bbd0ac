//! Facade configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All generic options from `varnam_core::Config` (flattened via serde)
//! - Optional overrides for where symbol tables and learnings live
//!
//! # Example
//!
//! ```rust
//! use libvarnam::VarnamConfig;
//!
//! let config = VarnamConfig::from_toml_str("pattern_limit = 4\n").unwrap();
//! assert_eq!(config.base.pattern_limit, 4);
//! assert!(config.vst_dir.is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use varnam_core::{Config, Result, VarnamError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VarnamConfig {
    /// Limits and flags shared with the core engine
    #[serde(flatten)]
    pub base: Config,

    /// Directory searched first for `<lang>/symbols.{fst,redb}`
    pub vst_dir: Option<PathBuf>,

    /// Directory holding `<lang>.learnings.redb`
    pub learnings_dir: Option<PathBuf>,
}

impl VarnamConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| VarnamError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| VarnamError::io(path, e))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VarnamError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VarnamError::Config(e.to_string()))
    }
}

impl From<Config> for VarnamConfig {
    fn from(base: Config) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }
}
