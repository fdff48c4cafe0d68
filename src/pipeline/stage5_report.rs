use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::pipeline::stage1_validate::InvalidReason;
use crate::pipeline::stage2_combine::{FIRST_LABEL, LAST_LABEL};
use crate::pipeline::stage4_batch::BatchOutput;
use crate::report::{csv_field, format_f32_2, format_f32_3, format_opt_score, mean, min_max};

const TOP_INVALID_WORDS: usize = 20;

/// Write every batch artifact to `out_dir`: the three result tables, the
/// invalid-word diagnostics with their two summaries, and summary.json.
pub fn write_reports(
    batch: &BatchOutput,
    out_dir: &Path,
    subset_size: usize,
) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    write_basic(batch, &out_dir.join("basic_results.csv"))?;
    write_stability(batch, &out_dir.join("stability_metrics.csv"))?;
    write_combinations(batch, &out_dir.join("all_combinations.csv"))?;
    write_invalid_words(batch, &out_dir.join("invalid_words.csv"))?;
    write_invalid_summary(batch, &out_dir.join("invalid_summary.csv"))?;
    write_most_common_invalid(batch, &out_dir.join("most_common_invalid.csv"))?;

    let summary = build_summary(batch, subset_size);
    write_summary_json(&summary, &out_dir.join("summary.json"))?;

    info!(
        "reports written to {}: {} participants, {} scored, {} with stability statistics, {} invalid word entries",
        out_dir.display(),
        summary.n_participants,
        summary.n_scored,
        summary.n_stability_rows,
        summary.invalid_word_entries
    );
    Ok(())
}

fn write_row<W: Write>(w: &mut W, fields: &[String]) -> std::io::Result<()> {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&csv_field(field, ','));
    }
    writeln!(w, "{}", line)
}

fn write_basic(batch: &BatchOutput, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_row(
        &mut w,
        &[
            "participant_id".to_string(),
            FIRST_LABEL.to_string(),
            LAST_LABEL.to_string(),
            "valid_words_count".to_string(),
        ],
    )?;
    for row in &batch.basic {
        write_row(
            &mut w,
            &[
                row.participant_id.clone(),
                format_opt_score(row.first_k),
                format_opt_score(row.last_k),
                row.valid_words_count.to_string(),
            ],
        )?;
    }
    Ok(())
}

fn write_stability(batch: &BatchOutput, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_row(
        &mut w,
        &[
            "participant_id".to_string(),
            "n_combinations".to_string(),
            "mean".to_string(),
            "std_dev".to_string(),
            "min".to_string(),
            "max".to_string(),
            "range".to_string(),
            "valid_words_count".to_string(),
        ],
    )?;
    for row in &batch.stability {
        let s = &row.summary;
        write_row(
            &mut w,
            &[
                row.participant_id.clone(),
                s.n_combinations.to_string(),
                format_f32_2(s.mean),
                format_f32_3(s.std_dev),
                format_f32_2(s.min),
                format_f32_2(s.max),
                format_f32_2(s.range),
                row.valid_words_count.to_string(),
            ],
        )?;
    }
    Ok(())
}

/// The label columns are the batch-wide union: `first_k`, the widest middle
/// run `combi_1..combi_M`, `last_k`. Cells a participant did not produce stay
/// empty.
fn write_combinations(batch: &BatchOutput, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);

    let max_middle = batch
        .combinations
        .iter()
        .map(|row| row.scores.len().saturating_sub(2))
        .max()
        .unwrap_or(0);

    let mut header = vec!["participant_id".to_string(), FIRST_LABEL.to_string()];
    for i in 1..=max_middle {
        header.push(format!("combi_{}", i));
    }
    header.push(LAST_LABEL.to_string());
    header.push("valid_words_count".to_string());
    write_row(&mut w, &header)?;

    for row in &batch.combinations {
        let by_label: HashMap<&str, Option<f32>> = row
            .scores
            .iter()
            .map(|s| (s.label.as_str(), s.score))
            .collect();
        let mut fields = Vec::with_capacity(header.len());
        fields.push(row.participant_id.clone());
        for label in &header[1..header.len() - 1] {
            fields.push(format_opt_score(
                by_label.get(label.as_str()).copied().flatten(),
            ));
        }
        fields.push(row.valid_words_count.to_string());
        write_row(&mut w, &fields)?;
    }
    Ok(())
}

fn write_invalid_words(batch: &BatchOutput, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_row(
        &mut w,
        &[
            "participant_id".to_string(),
            "invalid_word".to_string(),
            "reason".to_string(),
        ],
    )?;
    for row in &batch.invalid_words {
        write_row(
            &mut w,
            &[
                row.participant_id.clone(),
                row.text.clone(),
                row.reason.as_str().to_string(),
            ],
        )?;
    }
    Ok(())
}

fn write_invalid_summary(batch: &BatchOutput, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_row(
        &mut w,
        &[
            "participant_id".to_string(),
            "total_invalid_words".to_string(),
            "empty_or_missing".to_string(),
            "not_in_vocabulary".to_string(),
        ],
    )?;

    // Grouped by participant, first-appearance order.
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, (usize, usize, usize)> = HashMap::new();
    for row in &batch.invalid_words {
        let id = row.participant_id.as_str();
        if !counts.contains_key(id) {
            order.push(id);
        }
        let entry = counts.entry(id).or_default();
        entry.0 += 1;
        match row.reason {
            InvalidReason::EmptyOrMissing => entry.1 += 1,
            InvalidReason::NotInVocabulary => entry.2 += 1,
        }
    }
    for id in order {
        let (total, empty, not_in_vocab) = counts[id];
        write_row(
            &mut w,
            &[
                id.to_string(),
                total.to_string(),
                empty.to_string(),
                not_in_vocab.to_string(),
            ],
        )?;
    }
    Ok(())
}

fn write_most_common_invalid(batch: &BatchOutput, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_row(&mut w, &["word".to_string(), "frequency".to_string()])?;

    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for row in &batch.invalid_words {
        if row.reason == InvalidReason::NotInVocabulary {
            *frequency.entry(row.text.as_str()).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (word, count) in ranked.into_iter().take(TOP_INVALID_WORDS) {
        write_row(&mut w, &[word.to_string(), count.to_string()])?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreStats {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub subset_size: usize,
    pub n_participants: usize,
    pub n_scored: usize,
    pub n_insufficient: usize,
    pub n_stability_rows: usize,
    pub invalid_word_entries: usize,
    pub umlaut_conversions: usize,
    pub first_k: Option<ScoreStats>,
    pub last_k: Option<ScoreStats>,
}

pub fn build_summary(batch: &BatchOutput, subset_size: usize) -> RunSummary {
    let first_scores: Vec<f32> = batch.basic.iter().filter_map(|r| r.first_k).collect();
    let last_scores: Vec<f32> = batch.basic.iter().filter_map(|r| r.last_k).collect();
    RunSummary {
        tool: "dat-stability".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        subset_size,
        n_participants: batch.basic.len(),
        n_scored: first_scores.len(),
        n_insufficient: batch
            .basic
            .iter()
            .filter(|r| r.valid_words_count < subset_size)
            .count(),
        n_stability_rows: batch.stability.len(),
        invalid_word_entries: batch.invalid_words.len(),
        umlaut_conversions: batch.umlaut_conversions,
        first_k: score_stats(&first_scores),
        last_k: score_stats(&last_scores),
    }
}

fn score_stats(scores: &[f32]) -> Option<ScoreStats> {
    let (min, max) = min_max(scores)?;
    Some(ScoreStats {
        mean: mean(scores),
        min,
        max,
    })
}

fn write_summary_json(summary: &RunSummary, path: &Path) -> std::io::Result<()> {
    let rendered = serde_json::to_string_pretty(summary).map_err(std::io::Error::other)?;
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(rendered.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_report.rs"]
mod tests;
