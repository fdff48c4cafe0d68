use std::cell::RefCell;

use super::*;

/// Scores a subset by summing word lengths; records every subset it is
/// handed. `fail_on` makes it return no score for subsets containing that
/// word.
struct RecordingOracle {
    fail_on: Option<String>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl RecordingOracle {
    fn new() -> RecordingOracle {
        RecordingOracle {
            fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing_on(word: &str) -> RecordingOracle {
        RecordingOracle {
            fail_on: Some(word.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Oracle for RecordingOracle {
    fn validate(&self, word: &str) -> Option<String> {
        Some(word.trim().to_lowercase())
    }

    fn distance(&self, _a: &str, _b: &str) -> Option<f32> {
        Some(1.0)
    }

    fn score(&self, words: &[String], subset_size: usize) -> Option<f32> {
        self.calls.borrow_mut().push(words.to_vec());
        if words.len() < subset_size {
            return None;
        }
        if let Some(bad) = &self.fail_on {
            if words.iter().any(|w| w == bad) {
                return None;
            }
        }
        Some(words[..subset_size].iter().map(|w| w.len() as f32).sum())
    }
}

fn words(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_binomial() {
    assert_eq!(binomial(10, 7), 120);
    assert_eq!(binomial(7, 7), 1);
    assert_eq!(binomial(8, 7), 8);
    assert_eq!(binomial(5, 7), 0);
    assert_eq!(binomial(4, 2), 6);
    assert_eq!(binomial(0, 0), 1);
}

#[test]
fn test_combinations_lexicographic_order() {
    let combos: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
    assert_eq!(
        combos,
        vec![
            vec![0, 1],
            vec![0, 2],
            vec![0, 3],
            vec![1, 2],
            vec![1, 3],
            vec![2, 3],
        ]
    );
}

#[test]
fn test_combinations_single_and_empty() {
    let combos: Vec<Vec<usize>> = Combinations::new(3, 3).collect();
    assert_eq!(combos, vec![vec![0, 1, 2]]);

    let combos: Vec<Vec<usize>> = Combinations::new(2, 3).collect();
    assert!(combos.is_empty());
}

#[test]
fn test_combination_label_policy() {
    assert_eq!(combination_label(0, 1), "first_k");

    assert_eq!(combination_label(0, 2), "first_k");
    assert_eq!(combination_label(1, 2), "last_k");

    assert_eq!(combination_label(0, 5), "first_k");
    assert_eq!(combination_label(1, 5), "combi_1");
    assert_eq!(combination_label(2, 5), "combi_2");
    assert_eq!(combination_label(3, 5), "combi_3");
    assert_eq!(combination_label(4, 5), "last_k");
}

#[test]
fn test_run_stage2_below_subset_size_is_empty() {
    let oracle = RecordingOracle::new();
    let result = run_stage2(&oracle, &words(&["a", "b", "c"]), 7);
    assert!(result.is_empty());
    assert!(oracle.calls.borrow().is_empty());
}

#[test]
fn test_run_stage2_exactly_k_words() {
    let oracle = RecordingOracle::new();
    let list = words(&["a", "bb", "ccc", "dddd", "eeeee", "ffffff", "ggggggg"]);
    let result = run_stage2(&oracle, &list, 7);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].label, "first_k");
    assert_eq!(result[0].score, Some(28.0));
}

#[test]
fn test_run_stage2_every_combination_keeps_its_own_score() {
    let oracle = RecordingOracle::new();
    let list = words(&["a", "bb", "ccc", "dddd", "eeeee", "ffffff", "ggggggg", "hhhhhhhh"]);
    let result = run_stage2(&oracle, &list, 7);

    assert_eq!(result.len(), 8);
    assert_eq!(result[0].label, "first_k");
    assert_eq!(result[7].label, "last_k");
    for (i, subset) in result[1..7].iter().enumerate() {
        assert_eq!(subset.label, format!("combi_{}", i + 1));
    }
    // Dropping word lengths 1..=8 in turn gives 8 distinct sums.
    let scores: Vec<f32> = result.iter().map(|s| s.score.unwrap()).collect();
    let mut unique = scores.clone();
    unique.sort_by(|a, b| a.partial_cmp(b).unwrap());
    unique.dedup();
    assert_eq!(unique.len(), 8);
}

#[test]
fn test_run_stage2_first_and_last_subsets() {
    let oracle = RecordingOracle::new();
    let list = words(&["w1", "w2", "w3", "w4", "w5", "w6", "w7", "w8"]);
    run_stage2(&oracle, &list, 7);

    let calls = oracle.calls.borrow();
    assert_eq!(calls.len(), 8);
    assert_eq!(calls[0], words(&["w1", "w2", "w3", "w4", "w5", "w6", "w7"]));
    assert_eq!(calls[7], words(&["w2", "w3", "w4", "w5", "w6", "w7", "w8"]));
}

#[test]
fn test_run_stage2_absent_scores_are_kept() {
    let oracle = RecordingOracle::failing_on("h");
    let list = words(&["a", "b", "c", "d", "e", "f", "g", "h"]);
    let result = run_stage2(&oracle, &list, 7);

    assert_eq!(result.len(), 8);
    // Every subset except the first contains "h".
    assert!(result[0].score.is_some());
    for subset in &result[1..] {
        assert_eq!(subset.score, None);
    }
}

#[test]
fn test_run_stage2_ten_words() {
    let oracle = RecordingOracle::new();
    let list: Vec<String> = (1..=10).map(|i| format!("word{:02}", i)).collect();
    let result = run_stage2(&oracle, &list, 7);

    assert_eq!(result.len(), 120);
    assert_eq!(result[0].label, "first_k");
    assert_eq!(result[119].label, "last_k");
    assert_eq!(result[1].label, "combi_1");
    assert_eq!(result[118].label, "combi_118");
    for subset in &result {
        assert!(subset.score.is_some());
    }
}
