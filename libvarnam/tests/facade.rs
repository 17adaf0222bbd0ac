use libvarnam::{Varnam, VarnamConfig, VarnamError};
use std::path::Path;
use varnam_core::{MatchKind, SymbolKind, SymbolRule, SymbolTable};

fn write_scheme(root: &Path, lang: &str) {
    SymbolTable::from_rules(vec![
        SymbolRule::new("~", "\u{0d4d}", 0).with_kind(SymbolKind::Virama),
        SymbolRule::new("ma", "മ", 0),
        SymbolRule::new("la", "ല", 0),
        SymbolRule::new("la", "ള", 0).with_match_kind(MatchKind::Possibility),
        SymbolRule::new("ya", "യ", 0),
        SymbolRule::new("aa", "ആ", 0).with_mid("ാ"),
    ])
    .unwrap()
    .write_artifacts(root.join(lang))
    .unwrap();
}

fn config_for(root: &Path) -> VarnamConfig {
    VarnamConfig {
        vst_dir: Some(root.join("schemes")),
        learnings_dir: Some(root.join("learnings")),
        ..VarnamConfig::default()
    }
}

#[test]
fn init_from_lang_uses_configured_dirs() {
    let dir = tempfile::tempdir().unwrap();
    write_scheme(&dir.path().join("schemes"), "ml");

    let varnam = Varnam::init_from_lang("ml", config_for(dir.path())).unwrap();
    let result = varnam.transliterate("mala").unwrap();
    assert_eq!(result.greedy_exact[0].text, "മല");
    assert!(dir.path().join("learnings").join("ml.learnings.redb").is_file());
}

#[test]
fn unknown_language_is_resource_not_found() {
    let dir = tempfile::tempdir().unwrap();
    write_scheme(&dir.path().join("schemes"), "ml");

    let err = Varnam::init_from_lang("xx", config_for(dir.path())).err().unwrap();
    assert!(matches!(err, VarnamError::ResourceNotFound(_)));
}

#[test]
fn learnings_persist_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    write_scheme(&dir.path().join("schemes"), "ml");

    {
        let mut varnam = Varnam::init_from_lang("ml", config_for(dir.path())).unwrap();
        varnam.learn("മലയാളം").unwrap();
        varnam.train("mlm", "മലയാളം").unwrap();
        varnam.close();
    }

    let varnam = Varnam::init_from_lang("ml", config_for(dir.path())).unwrap();
    let exact = varnam.transliterate("mlm").unwrap().exact_match;
    assert_eq!(exact[0].text, "മലയാളം");
    assert!(exact[0].learned_on > 0);

    let result = varnam.transliterate("mala").unwrap();
    assert!(result.candidates.iter().any(|s| s.text == "മലയാളം"));
}

#[test]
fn unlearn_reverts_to_rule_output() {
    let dir = tempfile::tempdir().unwrap();
    write_scheme(&dir.path().join("schemes"), "ml");
    let varnam = Varnam::init_from_lang("ml", config_for(dir.path())).unwrap();

    varnam.learn("മള").unwrap();
    assert_eq!(varnam.transliterate("mala").unwrap().exact_match[0].text, "മള");

    assert!(varnam.unlearn("മള").unwrap());
    let result = varnam.transliterate("mala").unwrap();
    assert!(result.exact_match.is_empty());
    assert_eq!(result.candidates[0].text, "മല");
}

#[test]
fn explicit_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_scheme(dir.path(), "ta");
    let learnings = dir.path().join("custom.redb");

    let varnam = Varnam::init(dir.path().join("ta"), &learnings, VarnamConfig::default()).unwrap();
    assert!(varnam.transliterate("").unwrap().is_empty());
    assert!(learnings.is_file());
}
