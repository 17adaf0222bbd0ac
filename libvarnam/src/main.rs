//! `varnam` command line
//!
//! Usage:
//!   varnam --lang ml transliterate malayalam
//!   varnam --vst schemes/ml --learnings ml.learnings.redb learn മലയാളം
//!   varnam --lang ml            (interactive: one word per line)

use anyhow::Context;
use clap::{Parser, Subcommand};
use libvarnam::{paths, TransliterationResult, Varnam, VarnamConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "varnam")]
#[command(about = "Transliterate romanized input into an Indic script")]
struct Args {
    /// Language code used to locate the symbol table and learnings
    #[arg(short, long, default_value = "ml")]
    lang: String,

    /// Symbol table directory (containing symbols.fst and symbols.redb)
    #[arg(long)]
    vst: Option<PathBuf>,

    /// Learnings database file
    #[arg(long)]
    learnings: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log lookup details
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print suggestions for each word
    Transliterate {
        words: Vec<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Suggestions shown per list
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
    /// Learn a word
    Learn { word: String },
    /// Forget a learned word
    Unlearn { word: String },
    /// Map an input pattern to a word
    Train { pattern: String, word: String },
    /// Read words from stdin, one per line
    Repl,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open(args: &Args) -> anyhow::Result<Varnam> {
    let mut config = match &args.config {
        Some(path) => VarnamConfig::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VarnamConfig::default(),
    };
    if args.verbose {
        config.base.debug = true;
    }

    let varnam = match (&args.vst, &args.learnings) {
        (None, None) => Varnam::init_from_lang(&args.lang, config)?,
        (vst, learnings) => {
            let vst = match vst {
                Some(dir) => dir.clone(),
                None => paths::find_vst_dir(&args.lang, &config)?,
            };
            let learnings = learnings
                .clone()
                .unwrap_or_else(|| paths::learnings_path(&args.lang, &config));
            Varnam::init(vst, learnings, config)?
        }
    };
    Ok(varnam)
}

fn print_result(word: &str, result: &TransliterationResult, limit: usize) {
    println!("{}", word);
    let lists = [
        ("exact", &result.exact_match),
        ("candidates", &result.candidates),
        ("greedy", &result.greedy_exact),
    ];
    for (name, list) in lists {
        if list.is_empty() {
            continue;
        }
        println!("  {}:", name);
        for (i, s) in list.iter().take(limit).enumerate() {
            println!("    {}. {} (weight: {}, learned: {})", i + 1, s.text, s.weight, s.learned_on);
        }
    }
}

fn repl(varnam: &Varnam) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let raw = line?;
        let input = raw.trim();
        if input.is_empty() {
            continue;
        }
        let result = varnam.transliterate(input)?;
        match result.best() {
            Some(best) => writeln!(stdout, "{}", best.text)?,
            None => writeln!(stdout, "{}", input)?,
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut varnam = open(&args)?;

    match &args.command {
        Some(Command::Transliterate { words, json, limit }) => {
            for word in words {
                let result = varnam.transliterate(word)?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_result(word, &result, *limit);
                }
            }
        }
        Some(Command::Learn { word }) => {
            varnam.learn(word)?;
            println!("learned {}", word);
        }
        Some(Command::Unlearn { word }) => {
            if varnam.unlearn(word)? {
                println!("unlearned {}", word);
            } else {
                println!("{} was not learned", word);
            }
        }
        Some(Command::Train { pattern, word }) => {
            varnam.train(pattern, word)?;
            println!("trained {} => {}", pattern, word);
        }
        Some(Command::Repl) | None => repl(&varnam)?,
    }

    varnam.close();
    Ok(())
}
