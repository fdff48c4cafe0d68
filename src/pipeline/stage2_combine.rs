use tracing::debug;

use crate::model::Oracle;

pub const FIRST_LABEL: &str = "first_k";
pub const LAST_LABEL: &str = "last_k";

/// Score of one enumerated word subset. `score` is None when the oracle
/// could not score the combination; the label is kept either way.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetScore {
    pub label: String,
    pub score: Option<f32>,
}

/// Lexicographic k-combinations of indices 0..n, in the order produced by
/// iterating index tuples of increasing positions.
pub struct Combinations {
    indices: Vec<usize>,
    n: usize,
    k: usize,
    started: bool,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Combinations {
        Combinations {
            indices: (0..k).collect(),
            n,
            k,
            started: false,
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        // Advance the rightmost index that can still move.
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                return None;
            }
            i -= 1;
            if self.indices[i] != i + self.n - self.k {
                break;
            }
        }
        self.indices[i] += 1;
        for j in (i + 1)..self.k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.indices.clone())
    }
}

pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
    }
    result as usize
}

/// Label for the combination at enumeration position `index` out of `total`:
/// position 0 is `first_k`, the final position is `last_k`, and the middle
/// positions 1..=total-2 are `combi_1` .. `combi_(total-2)` in order.
pub fn combination_label(index: usize, total: usize) -> String {
    if index == 0 {
        FIRST_LABEL.to_string()
    } else if index == total - 1 {
        LAST_LABEL.to_string()
    } else {
        format!("combi_{}", index)
    }
}

/// Enumerate every `subset_size`-combination of `valid_words` and obtain a
/// score for each from the oracle. Every combination appears in the result
/// under its own label; an oracle failure for one combination is recorded as
/// an absent score, never dropped. Fewer words than `subset_size` yields the
/// empty result (the orchestrator checks the count first).
pub fn run_stage2(
    oracle: &dyn Oracle,
    valid_words: &[String],
    subset_size: usize,
) -> Vec<SubsetScore> {
    let n = valid_words.len();
    if n < subset_size {
        return Vec::new();
    }
    let total = binomial(n, subset_size);
    let mut results = Vec::with_capacity(total);

    for (index, combo) in Combinations::new(n, subset_size).enumerate() {
        let subset: Vec<String> = combo.iter().map(|&i| valid_words[i].clone()).collect();
        let score = oracle.score(&subset, subset_size);
        let label = combination_label(index, total);
        if score.is_none() {
            debug!("oracle returned no score for combination {}", label);
        }
        results.push(SubsetScore { label, score });
    }

    results
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_combine.rs"]
mod tests;
