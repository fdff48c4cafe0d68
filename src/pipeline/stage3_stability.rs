use crate::pipeline::stage2_combine::SubsetScore;
use crate::report::{mean, min_max, sample_std};

/// Descriptive statistics over a participant's scored combinations.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilitySummary {
    pub n_combinations: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
    pub range: f32,
}

/// Reduce subset scores to a stability summary. Absent scores are filtered
/// out first; fewer than 2 remaining scores yields None, since statistics of
/// variance are undefined below 2 samples. Operates purely on the score
/// values, never on labels.
pub fn run_stage3(scores: &[SubsetScore]) -> Option<StabilitySummary> {
    let present: Vec<f32> = scores.iter().filter_map(|s| s.score).collect();
    if present.len() < 2 {
        return None;
    }
    let (min, max) = min_max(&present)?;
    Some(StabilitySummary {
        n_combinations: present.len(),
        mean: mean(&present),
        std_dev: sample_std(&present),
        min,
        max,
        range: max - min,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_stability.rs"]
mod tests;
