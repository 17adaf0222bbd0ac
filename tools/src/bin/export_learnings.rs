//! Export a learnings database to JSON or CSV format
//!
//! Usage:
//!   cargo run -p varnam-tools --bin export_learnings -- --db ml.learnings.redb --format json
//!   cargo run -p varnam-tools --bin export_learnings -- --db ml.learnings.redb --format csv --output words.csv

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use varnam_core::LearnedStore;

#[derive(Parser, Debug)]
#[command(name = "export_learnings")]
#[command(about = "Export learned words and patterns to JSON or CSV format")]
struct Args {
    /// Path to the learnings database
    #[arg(short, long)]
    db: PathBuf,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sort by weight (descending)
    #[arg(long)]
    sort_by_weight: bool,
}

#[derive(Serialize)]
struct WordRecord {
    word: String,
    weight: i32,
    learned_on: i64,
}

#[derive(Serialize)]
struct PatternRecord {
    pattern: String,
    words: Vec<String>,
}

#[derive(Serialize)]
struct Export {
    words: Vec<WordRecord>,
    patterns: Vec<PatternRecord>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.db.is_file() {
        anyhow::bail!("No learnings database at {}", args.db.display());
    }
    let store = LearnedStore::open(&args.db)?;

    let mut words: Vec<WordRecord> = store
        .words()?
        .into_iter()
        .map(|(word, e)| WordRecord {
            word,
            weight: e.weight,
            learned_on: e.learned_on,
        })
        .collect();
    if args.sort_by_weight {
        words.sort_by(|a, b| b.weight.cmp(&a.weight));
    }

    let output = match args.format.as_str() {
        "json" => {
            let patterns = store
                .patterns()?
                .into_iter()
                .map(|(pattern, words)| PatternRecord { pattern, words })
                .collect();
            serde_json::to_string_pretty(&Export { words, patterns })? + "\n"
        }
        "csv" => export_csv(&words),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json' or 'csv'", args.format),
    };

    if let Some(path) = args.output {
        std::fs::write(path, output)?;
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn export_csv(words: &[WordRecord]) -> String {
    let mut output = String::from("word,weight,learned_on\n");
    for w in words {
        let escaped = w.word.replace('"', "\"\"");
        output.push_str(&format!("\"{}\",{},{}\n", escaped, w.weight, w.learned_on));
    }
    output
}
