//! Build a symbol table (`symbols.fst` + `symbols.redb`) from scheme files.
//!
//! Usage:
//!   cargo run -p varnam-tools --bin build_vst -- --inputs schemes/ml.scheme --out schemes/ml --language ml

mod scheme;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use varnam_core::symbol_table::SchemeInfo;
use varnam_core::{LanguageRules, SymbolRule, SymbolTable};

#[derive(Parser, Debug)]
#[command(name = "build_vst")]
#[command(about = "Compile scheme files into a symbol table")]
struct Args {
    /// Scheme files, merged in order
    #[arg(long, num_args = 1.., required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// Scheme identifier stored in the table metadata
    #[arg(long, default_value = "")]
    scheme: String,

    /// Language code stored in the table metadata
    #[arg(long, default_value = "")]
    language: String,
}

fn read_rules(inputs: &[PathBuf]) -> Result<Vec<SymbolRule>> {
    let mut rules = Vec::new();
    for input in inputs {
        let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
        let parsed = scheme::parse(BufReader::new(file))
            .with_context(|| format!("parsing {}", input.display()))?;
        println!("Read {} rules from {}", parsed.len(), input.display());
        rules.extend(parsed);
    }
    Ok(rules)
}

fn build(inputs: &[PathBuf], out: &Path, info: SchemeInfo) -> Result<SymbolTable> {
    let rules = read_rules(inputs)?;
    let table = SymbolTable::from_rules(rules)?.with_info(info);
    // The engine refuses tables without a joiner rule, so fail here instead.
    LanguageRules::bootstrap(&table)?;
    table
        .write_artifacts(out)
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(table)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let info = SchemeInfo {
        scheme: args.scheme.clone(),
        language: args.language.clone(),
    };
    let table = build(&args.inputs, &args.out, info)?;
    println!(
        "Wrote {} patterns to {}",
        table.len(),
        args.out.display()
    );
    Ok(())
}
