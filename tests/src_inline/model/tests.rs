use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::model::vectors::check_vector_file;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("dat_stability_model_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

/// 2-dimensional vectors laid out so pairwise distances are exact:
/// hund/katze orthogonal (1.0), hund/maus opposite (2.0), hund/tiger at
/// 1 - 1/sqrt(2), and `zero` degenerate.
fn make_model() -> Model {
    let dir = make_temp_dir();
    let vocab_path = dir.join("vocab.txt");
    let vectors_path = dir.join("vectors.txt");
    write_file(&vocab_path, "hund\nkatze\nmaus\ntiger\nzero\n");
    write_file(
        &vectors_path,
        "hund 1.0 0.0\nkatze 0.0 1.0\nmaus -1.0 0.0\ntiger 1.0 1.0\nzero 0.0 0.0\nunlisted 1.0 1.0\n",
    );
    Model::load(&vectors_path, &vocab_path).unwrap()
}

#[test]
fn test_load_keeps_vocab_words_only() {
    let model = make_model();
    assert_eq!(model.n_words(), 5);
    assert_eq!(model.n_dims(), 2);
    assert_eq!(model.validate("unlisted"), None);
}

#[test]
fn test_validate_trims_and_lowercases() {
    let model = make_model();
    assert_eq!(model.validate("  Hund  "), Some("hund".to_string()));
    assert_eq!(model.validate("KATZE"), Some("katze".to_string()));
    assert_eq!(model.validate("xyzinvalid"), None);
    assert_eq!(model.validate("   "), None);
}

#[test]
fn test_distance() {
    let model = make_model();
    let d = model.distance("hund", "katze").unwrap();
    assert!((d - 1.0).abs() < 1e-6);
    let d = model.distance("hund", "maus").unwrap();
    assert!((d - 2.0).abs() < 1e-6);
    let d = model.distance("hund", "hund").unwrap();
    assert!(d.abs() < 1e-6);
    assert_eq!(model.distance("hund", "missing"), None);
}

#[test]
fn test_distance_zero_vector_is_unscorable() {
    let model = make_model();
    assert_eq!(model.distance("hund", "zero"), None);
}

#[test]
fn test_score_two_words() {
    let model = make_model();
    let words = vec!["hund".to_string(), "katze".to_string()];
    let score = model.score(&words, 2).unwrap();
    assert!((score - 100.0).abs() < 1e-3);
}

#[test]
fn test_score_uses_first_subset_size_words() {
    let model = make_model();
    let words = vec![
        "hund".to_string(),
        "tiger".to_string(),
        "katze".to_string(),
    ];
    // Only hund/tiger are scored: one pair at distance 1 - 1/sqrt(2).
    let score = model.score(&words, 2).unwrap();
    let expected = (1.0 - 1.0 / 2.0f32.sqrt()) * 100.0;
    assert!((score - expected).abs() < 1e-3);
}

#[test]
fn test_score_too_few_words() {
    let model = make_model();
    let words = vec!["hund".to_string()];
    assert_eq!(model.score(&words, 2), None);
    assert_eq!(model.score(&words, 0), None);
}

#[test]
fn test_vectors_skip_mismatched_lines() {
    let dir = make_temp_dir();
    let vocab_path = dir.join("vocab.txt");
    let vectors_path = dir.join("vectors.txt");
    write_file(&vocab_path, "hund\nkatze\nbroken\n");
    write_file(
        &vectors_path,
        "hund 1.0 0.0\nbroken 1.0\nkatze 0.0 1.0\n",
    );
    let model = Model::load(&vectors_path, &vocab_path).unwrap();
    assert_eq!(model.n_words(), 2);
    assert_eq!(model.validate("broken"), None);
}

#[test]
fn test_empty_vocab_is_invalid() {
    let dir = make_temp_dir();
    let vocab_path = dir.join("vocab.txt");
    let vectors_path = dir.join("vectors.txt");
    write_file(&vocab_path, "\n\n");
    write_file(&vectors_path, "hund 1.0 0.0\n");
    let err = Model::load(&vectors_path, &vocab_path).unwrap_err();
    assert!(matches!(err, ModelError::InvalidModel(_)));
}

#[test]
fn test_no_usable_vectors_is_invalid() {
    let dir = make_temp_dir();
    let vocab_path = dir.join("vocab.txt");
    let vectors_path = dir.join("vectors.txt");
    write_file(&vocab_path, "hund\n");
    write_file(&vectors_path, "katze 1.0 0.0\n");
    let err = Model::load(&vectors_path, &vocab_path).unwrap_err();
    assert!(matches!(err, ModelError::InvalidModel(_)));
}

#[test]
fn test_check_vector_file_consistent() {
    let dir = make_temp_dir();
    let path = dir.join("vectors.txt");
    write_file(&path, "hund 1.0 0.0\nkatze 0.0 1.0\n");
    let check = check_vector_file(&path, 10).unwrap();
    assert_eq!(check.n_lines_checked, 2);
    assert_eq!(check.n_columns, 3);
    assert!(check.issues.is_empty());
}

#[test]
fn test_check_vector_file_reports_deviations() {
    let dir = make_temp_dir();
    let path = dir.join("vectors.txt");
    write_file(&path, "hund 1.0 0.0\nbroken 1.0\nkatze 0.0 1.0\n");
    let check = check_vector_file(&path, 10).unwrap();
    assert_eq!(check.issues.len(), 1);
    assert_eq!(check.issues[0].line_no, 2);
    assert_eq!(check.issues[0].n_columns, 2);
}

#[test]
fn test_check_vector_file_empty() {
    let dir = make_temp_dir();
    let path = dir.join("vectors.txt");
    write_file(&path, "");
    let err = check_vector_file(&path, 10).unwrap_err();
    assert!(matches!(err, ModelError::InvalidModel(_)));
}
