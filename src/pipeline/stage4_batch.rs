use tracing::info;

use crate::input::RawResponse;
use crate::model::Oracle;
use crate::pipeline::stage1_validate::{InvalidReason, run_stage1};
use crate::pipeline::stage2_combine::{FIRST_LABEL, LAST_LABEL, SubsetScore, run_stage2};
use crate::pipeline::stage3_stability::{StabilitySummary, run_stage3};

#[derive(Debug, Clone)]
pub struct BasicResult {
    pub participant_id: String,
    pub first_k: Option<f32>,
    pub last_k: Option<f32>,
    pub valid_words_count: usize,
}

#[derive(Debug, Clone)]
pub struct StabilityRow {
    pub participant_id: String,
    pub summary: StabilitySummary,
    pub valid_words_count: usize,
}

#[derive(Debug, Clone)]
pub struct CombinationRow {
    pub participant_id: String,
    pub scores: Vec<SubsetScore>,
    pub valid_words_count: usize,
}

#[derive(Debug, Clone)]
pub struct InvalidWordRow {
    pub participant_id: String,
    pub text: String,
    pub reason: InvalidReason,
}

/// The four result collections of a batch run, each in input order.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub basic: Vec<BasicResult>,
    pub stability: Vec<StabilityRow>,
    pub combinations: Vec<CombinationRow>,
    pub invalid_words: Vec<InvalidWordRow>,
    pub umlaut_conversions: usize,
}

/// Drive the per-participant pipeline over the whole batch. Participants are
/// independent: a row with too few valid words, or an oracle failure on some
/// combination, is absorbed into the result collections and never aborts the
/// run.
pub fn run_stage4(
    oracle: &dyn Oracle,
    responses: &[RawResponse],
    subset_size: usize,
) -> BatchOutput {
    let mut out = BatchOutput::default();

    for response in responses {
        process_participant(oracle, response, subset_size, &mut out);
    }

    out
}

fn process_participant(
    oracle: &dyn Oracle,
    response: &RawResponse,
    subset_size: usize,
    out: &mut BatchOutput,
) {
    let id = &response.participant_id;
    let validation = run_stage1(oracle, &response.words);

    for word in &validation.words {
        if word.umlaut_fallback {
            out.umlaut_conversions += 1;
        }
        if let Some(reason) = word.reason {
            let text = match reason {
                InvalidReason::EmptyOrMissing => {
                    format!("[Empty/Missing in position {}]", word.position)
                }
                InvalidReason::NotInVocabulary => word.raw.trim().to_string(),
            };
            out.invalid_words.push(InvalidWordRow {
                participant_id: id.clone(),
                text,
                reason,
            });
        }
    }

    let valid_count = validation.valid_words.len();
    if valid_count < subset_size {
        info!(
            "processed {}: insufficient valid words ({} < {})",
            id, valid_count, subset_size
        );
        out.basic.push(BasicResult {
            participant_id: id.clone(),
            first_k: None,
            last_k: None,
            valid_words_count: valid_count,
        });
        return;
    }

    let scores = run_stage2(oracle, &validation.valid_words, subset_size);
    let first_k = labeled_score(&scores, FIRST_LABEL);
    let last_k = labeled_score(&scores, LAST_LABEL);

    match run_stage3(&scores) {
        Some(summary) => {
            info!(
                "processed {}: {} combinations, mean = {:.2}, sd = {:.3}",
                id, summary.n_combinations, summary.mean, summary.std_dev
            );
            out.basic.push(BasicResult {
                participant_id: id.clone(),
                first_k,
                last_k,
                valid_words_count: valid_count,
            });
            out.stability.push(StabilityRow {
                participant_id: id.clone(),
                summary,
                valid_words_count: valid_count,
            });
            out.combinations.push(CombinationRow {
                participant_id: id.clone(),
                scores,
                valid_words_count: valid_count,
            });
        }
        None => {
            // Single scoreable combination (or oracle failures): keep the
            // basic row, no stability statistics.
            info!(
                "processed {}: {} combination(s), no stability statistics",
                id,
                scores.len()
            );
            out.basic.push(BasicResult {
                participant_id: id.clone(),
                first_k,
                last_k,
                valid_words_count: valid_count,
            });
        }
    }
}

fn labeled_score(scores: &[SubsetScore], label: &str) -> Option<f32> {
    scores.iter().find(|s| s.label == label).and_then(|s| s.score)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_batch.rs"]
mod tests;
