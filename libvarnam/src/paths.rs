//! Locating symbol tables and learnings files on disk.

use std::path::{Path, PathBuf};
use varnam_core::symbol_table::{INDEX_FILE, PAYLOAD_FILE};
use varnam_core::{Result, VarnamError};

use crate::config::VarnamConfig;

pub const VST_DIR_ENV: &str = "VARNAM_VST_DIR";
pub const LEARNINGS_DIR_ENV: &str = "VARNAM_LEARNINGS_DIR";

const SYSTEM_VST_DIRS: &[&str] = &["/usr/local/share/varnam/schemes", "/usr/share/varnam/schemes"];

/// Directories searched for `<lang>/symbols.{fst,redb}`, in order.
pub fn vst_search_path(config: &VarnamConfig) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = &config.vst_dir {
        dirs.push(dir.clone());
    }
    if let Some(dir) = std::env::var_os(VST_DIR_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    dirs.push(PathBuf::from("schemes"));
    dirs.extend(SYSTEM_VST_DIRS.iter().map(PathBuf::from));
    dirs
}

fn has_symbol_table(dir: &Path) -> bool {
    dir.join(INDEX_FILE).is_file() && dir.join(PAYLOAD_FILE).is_file()
}

/// First directory on the search path holding the symbol table for `lang`.
pub fn find_vst_dir(lang: &str, config: &VarnamConfig) -> Result<PathBuf> {
    let searched = vst_search_path(config);
    for base in &searched {
        let dir = base.join(lang);
        if has_symbol_table(&dir) {
            tracing::debug!(lang, dir = %dir.display(), "found symbol table");
            return Ok(dir);
        }
    }
    let tried: Vec<String> = searched.iter().map(|d| d.display().to_string()).collect();
    Err(VarnamError::ResourceNotFound(format!(
        "no symbol table for '{}' (searched {})",
        lang,
        tried.join(", ")
    )))
}

/// Directory that holds learnings files when nothing overrides it.
fn default_learnings_dir() -> PathBuf {
    let data_home = std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        })
        .unwrap_or_else(|| PathBuf::from("."));
    data_home.join("varnam").join("learnings")
}

/// Learnings file for `lang`. The file itself may not exist yet.
pub fn learnings_path(lang: &str, config: &VarnamConfig) -> PathBuf {
    let dir = config
        .learnings_dir
        .clone()
        .or_else(|| std::env::var_os(LEARNINGS_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(default_learnings_dir);
    dir.join(format!("{}.learnings.redb", lang))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_is_searched_first() {
        let config = VarnamConfig {
            vst_dir: Some(PathBuf::from("/custom")),
            ..VarnamConfig::default()
        };
        let path = vst_search_path(&config);
        assert_eq!(path[0], PathBuf::from("/custom"));
        assert_eq!(path.last(), Some(&PathBuf::from("/usr/share/varnam/schemes")));
    }

    #[test]
    fn missing_language_is_resource_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = VarnamConfig {
            vst_dir: Some(dir.path().to_path_buf()),
            ..VarnamConfig::default()
        };
        let err = find_vst_dir("zz-nonexistent", &config).unwrap_err();
        assert!(matches!(err, VarnamError::ResourceNotFound(_)));
    }

    #[test]
    fn learnings_dir_override() {
        let config = VarnamConfig {
            learnings_dir: Some(PathBuf::from("/data/learn")),
            ..VarnamConfig::default()
        };
        assert_eq!(
            learnings_path("ml", &config),
            PathBuf::from("/data/learn/ml.learnings.redb")
        );
    }
}
