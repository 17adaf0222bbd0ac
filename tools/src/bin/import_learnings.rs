//! Import words into a learnings database
//!
//! Supports multiple input formats:
//! - JSON: the `export_learnings` layout, `{"words": [...], "patterns": [...]}`
//! - CSV: word,weight[,learned_on] header with data rows
//! - TXT: one word per line (weight defaults to 1)
//!
//! Usage:
//!   cargo run -p varnam-tools --bin import_learnings -- --db ml.learnings.redb --input words.json
//!   cargo run -p varnam-tools --bin import_learnings -- --db ml.learnings.redb --input words.txt --format txt

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use varnam_core::store::now;
use varnam_core::{LearnedStore, WordEntry};

#[derive(Parser, Debug)]
#[command(name = "import_learnings")]
#[command(about = "Import words and patterns into a learnings database")]
struct Args {
    /// Path to the learnings database (created if missing)
    #[arg(short, long)]
    db: PathBuf,

    /// Input file
    #[arg(short, long)]
    input: PathBuf,

    /// Input format: json, csv, or txt
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Merge mode: add (default) sums weights, replace overwrites entries
    #[arg(short, long, default_value = "add")]
    mode: String,

    /// Dry run (show what would be imported without actually importing)
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Deserialize)]
struct WordRecord {
    word: String,
    #[serde(default = "default_weight")]
    weight: i32,
    #[serde(default)]
    learned_on: i64,
}

#[derive(Debug, Deserialize)]
struct PatternRecord {
    pattern: String,
    words: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Import {
    #[serde(default)]
    words: Vec<WordRecord>,
    #[serde(default)]
    patterns: Vec<PatternRecord>,
}

fn default_weight() -> i32 {
    1
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read input file: {}", e))?;

    let data = match args.format.as_str() {
        "json" => serde_json::from_str::<Import>(&content)?,
        "csv" => Import {
            words: parse_csv(&content)?,
            ..Import::default()
        },
        "txt" => Import {
            words: parse_txt(&content),
            ..Import::default()
        },
        _ => anyhow::bail!("Unsupported format: {}. Use 'json', 'csv', or 'txt'", args.format),
    };

    println!(
        "Parsed {} words and {} patterns from {}",
        data.words.len(),
        data.patterns.len(),
        args.input.display()
    );

    if args.dry_run {
        println!("\n[DRY RUN] Would import:");
        for w in data.words.iter().take(20) {
            println!("  {} (weight {})", w.word, w.weight);
        }
        if data.words.len() > 20 {
            println!("  ... and {} more", data.words.len() - 20);
        }
        return Ok(());
    }

    let store = LearnedStore::open(&args.db)?;
    let imported = match args.mode.as_str() {
        "replace" => {
            let stamp = now();
            store.import(data.words.into_iter().map(|w| {
                let learned_on = if w.learned_on > 0 { w.learned_on } else { stamp };
                (w.word, WordEntry { weight: w.weight, learned_on })
            }))?
        }
        "add" => {
            let count = data.words.len();
            for w in &data.words {
                store.learn_with_weight(&w.word, w.weight)?;
            }
            count
        }
        _ => anyhow::bail!("Unsupported mode: {}. Use 'add' or 'replace'", args.mode),
    };

    let mut trained = 0;
    for p in &data.patterns {
        for word in &p.words {
            store.train(&p.pattern, word)?;
            trained += 1;
        }
    }

    println!("Imported {} words and {} pattern links into {}", imported, trained, args.db.display());
    Ok(())
}

fn parse_csv(content: &str) -> anyhow::Result<Vec<WordRecord>> {
    let mut out = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (i == 0 && line.starts_with("word")) {
            continue;
        }
        let (word, rest) = split_word(line);
        let mut nums = rest.split(',').map(str::trim).filter(|s| !s.is_empty());
        let weight = match nums.next() {
            Some(w) => w
                .parse()
                .map_err(|e| anyhow::anyhow!("line {}: bad weight {:?}: {}", i + 1, w, e))?,
            None => default_weight(),
        };
        let learned_on = match nums.next() {
            Some(t) => t
                .parse()
                .map_err(|e| anyhow::anyhow!("line {}: bad timestamp {:?}: {}", i + 1, t, e))?,
            None => 0,
        };
        if !word.is_empty() {
            out.push(WordRecord {
                word,
                weight,
                learned_on,
            });
        }
    }
    Ok(out)
}

/// Split off the first CSV field, honouring `"..."` quoting with `""` escapes.
fn split_word(line: &str) -> (String, &str) {
    if let Some(body) = line.strip_prefix('"') {
        let mut word = String::new();
        let mut chars = body.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            if ch == '"' {
                if matches!(chars.peek(), Some((_, '"'))) {
                    word.push('"');
                    chars.next();
                } else {
                    let rest = &body[i + 1..];
                    return (word, rest.strip_prefix(',').unwrap_or(rest));
                }
            } else {
                word.push(ch);
            }
        }
        (word, "")
    } else {
        match line.split_once(',') {
            Some((w, rest)) => (w.trim().to_string(), rest),
            None => (line.to_string(), ""),
        }
    }
}

fn parse_txt(content: &str) -> Vec<WordRecord> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|word| WordRecord {
            word: word.to_string(),
            weight: default_weight(),
            learned_on: 0,
        })
        .collect()
}
