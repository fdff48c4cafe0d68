mod input;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use crate::input::load_responses;
use crate::model::vectors::check_vector_file;
use crate::model::{Model, Oracle};
use crate::pipeline::DEFAULT_SUBSET_SIZE;
use crate::pipeline::stage1_validate::run_stage1;
use crate::pipeline::stage4_batch::run_stage4;
use crate::pipeline::stage5_report::write_reports;

#[derive(Parser, Debug)]
#[command(name = "dat-stability")]
#[command(about = "Divergent Association Task scoring and combinatorial stability analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a batch of participant word lists and write result tables.
    Run {
        /// Batch table, one row per participant (CSV/TSV, optionally .gz)
        #[arg(long)]
        input: PathBuf,
        /// GloVe-style text vectors file (optionally .gz)
        #[arg(long)]
        vectors: PathBuf,
        /// Vocabulary file, one word per line (optionally .gz)
        #[arg(long)]
        vocab: PathBuf,
        /// Output directory for the result tables
        #[arg(long)]
        out: PathBuf,
        /// Words per scored subset
        #[arg(long, default_value_t = DEFAULT_SUBSET_SIZE)]
        subset_size: usize,
    },
    /// Validate a single word list and print its DAT score.
    Score {
        /// GloVe-style text vectors file (optionally .gz)
        #[arg(long)]
        vectors: PathBuf,
        /// Vocabulary file, one word per line (optionally .gz)
        #[arg(long)]
        vocab: PathBuf,
        /// Words per scored subset
        #[arg(long, default_value_t = DEFAULT_SUBSET_SIZE)]
        subset_size: usize,
        /// The words to validate and score
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Verify that a vectors file has a consistent dimensionality.
    CheckVectors {
        /// GloVe-style text vectors file (optionally .gz)
        #[arg(long)]
        vectors: PathBuf,
        /// Number of data lines to inspect
        #[arg(long, default_value_t = 10)]
        lines: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dat_stability=info".into()),
        )
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Run {
            input,
            vectors,
            vocab,
            out,
            subset_size,
        } => run_batch(&input, &vectors, &vocab, &out, subset_size),
        Command::Score {
            vectors,
            vocab,
            subset_size,
            words,
        } => run_score(&vectors, &vocab, subset_size, &words),
        Command::CheckVectors { vectors, lines } => run_check_vectors(&vectors, lines),
    }
}

fn run_batch(
    input: &Path,
    vectors: &Path,
    vocab: &Path,
    out: &Path,
    subset_size: usize,
) -> Result<(), String> {
    check_subset_size(subset_size)?;
    let responses = load_responses(input).map_err(|e| e.to_string())?;

    info!("loading model; this may take several minutes for large vector files");
    let model = Model::load(vectors, vocab).map_err(|e| e.to_string())?;

    let batch = run_stage4(&model, &responses, subset_size);
    write_reports(&batch, out, subset_size).map_err(|e| e.to_string())?;
    Ok(())
}

fn run_score(
    vectors: &Path,
    vocab: &Path,
    subset_size: usize,
    words: &[String],
) -> Result<(), String> {
    check_subset_size(subset_size)?;
    let model = Model::load(vectors, vocab).map_err(|e| e.to_string())?;

    let validation = run_stage1(&model, words);
    for word in &validation.words {
        match &word.canonical {
            Some(canonical) => println!("{:2}: {} -> {}", word.position, word.raw.trim(), canonical),
            None => {
                let reason = word.reason.map(|r| r.as_str()).unwrap_or("invalid");
                println!("{:2}: {} ({})", word.position, word.raw.trim(), reason);
            }
        }
    }

    let n_valid = validation.valid_words.len();
    if n_valid < subset_size {
        return Err(format!(
            "not enough valid words ({} < {})",
            n_valid, subset_size
        ));
    }
    let score = model
        .score(&validation.valid_words, subset_size)
        .ok_or_else(|| "model could not score the word set".to_string())?;
    println!("DAT score: {:.2}", score);
    Ok(())
}

fn run_check_vectors(vectors: &Path, lines: usize) -> Result<(), String> {
    let check = check_vector_file(vectors, lines).map_err(|e| e.to_string())?;
    println!(
        "checked {} lines: {} columns (1 word + {} vector components)",
        check.n_lines_checked,
        check.n_columns,
        check.n_columns.saturating_sub(1)
    );
    if check.issues.is_empty() {
        println!("all checked lines share the same column count");
        Ok(())
    } else {
        for issue in &check.issues {
            println!(
                "line {} has {} columns, expected {}",
                issue.line_no, issue.n_columns, check.n_columns
            );
        }
        Err(format!(
            "{} line(s) deviate from the expected column count",
            check.issues.len()
        ))
    }
}

fn check_subset_size(subset_size: usize) -> Result<(), String> {
    if subset_size < 2 {
        return Err("--subset-size must be at least 2".to_string());
    }
    Ok(())
}
