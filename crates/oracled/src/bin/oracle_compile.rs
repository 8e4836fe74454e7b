//! Corpus compiler (`oracle-compile`).
//!
//! Reads newline-delimited passwords from stdin, trains a language model,
//! and writes the gzip-compressed persisted model to a file (or stdout,
//! when no path is given) — the Rust equivalent of
//! `language_model.py`'s `__main__` block, which piped
//! `cPickle.dump(compile(sys.stdin), sys.stdout)`.

use clap::Parser;
use oracle_core::persistence;
use oracle_core::LanguageModel;
use std::io::{self, Read, Write};

/// Compiles a password corpus into a gzip-compressed language model file.
#[derive(Debug, Parser)]
#[command(name = "oracle-compile", about, long_about = None)]
struct Args {
    /// Output path. Defaults to stdout when omitted.
    #[arg(long, short)]
    output: Option<String>,

    /// N-gram tuple length.
    #[arg(long, short, default_value_t = 3)]
    n: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut corpus = String::new();
    io::stdin().read_to_string(&mut corpus)?;

    let lines: Vec<&str> = corpus.lines().collect();
    eprintln!("compiling {} lines (n={})", lines.len(), args.n);
    let model = LanguageModel::compile(lines, args.n);

    match args.output {
        Some(path) => {
            persistence::save_language_model(&model, std::path::Path::new(&path))?;
            eprintln!("language model written to {path}");
        }
        None => {
            let gzipped = persistence::encode_language_model(&model)?;
            io::stdout().write_all(&gzipped)?;
        }
    }

    Ok(())
}
