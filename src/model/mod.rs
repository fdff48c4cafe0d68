use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

pub mod vectors;

use vectors::{load_vectors, load_vocab};

/// The embedding oracle consumed by the scoring pipeline. The pipeline never
/// looks past this trait; tests substitute fixed-vocabulary fakes.
pub trait Oracle {
    /// Canonical form of `word` if it is in the model vocabulary.
    fn validate(&self, word: &str) -> Option<String>;

    /// Cosine distance in [0, 2] between two canonical words.
    fn distance(&self, a: &str, b: &str) -> Option<f32>;

    /// DAT score in [0, 100]: average pairwise cosine distance over the first
    /// `subset_size` of `words`, rescaled. None when `words` is too short or a
    /// required vector is unavailable.
    fn score(&self, words: &[String], subset_size: usize) -> Option<f32>;
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// GloVe-style embedding model: a vocabulary file (one word per line) and a
/// text vectors file (`word c1 .. cD` per line). Only vectors for vocabulary
/// words are retained. Read-only after load.
#[derive(Debug)]
pub struct Model {
    vectors: HashMap<String, Vec<f32>>,
    n_dims: usize,
}

impl Model {
    pub fn load(vectors_path: &Path, vocab_path: &Path) -> Result<Model, ModelError> {
        let started = Instant::now();
        let vocab = load_vocab(vocab_path)?;
        info!(
            "vocabulary loaded: {} words from {}",
            vocab.len(),
            vocab_path.display()
        );
        let (vectors, n_dims) = load_vectors(vectors_path, &vocab)?;
        info!(
            "model loaded: {} vectors, {} dimensions ({:.1}s)",
            vectors.len(),
            n_dims,
            started.elapsed().as_secs_f32()
        );
        Ok(Model { vectors, n_dims })
    }

    pub fn n_words(&self) -> usize {
        self.vectors.len()
    }

    pub fn n_dims(&self) -> usize {
        self.n_dims
    }
}

impl Oracle for Model {
    fn validate(&self, word: &str) -> Option<String> {
        let clean = word.trim().to_lowercase();
        if clean.is_empty() {
            return None;
        }
        if self.vectors.contains_key(&clean) {
            Some(clean)
        } else {
            None
        }
    }

    fn distance(&self, a: &str, b: &str) -> Option<f32> {
        let va = self.vectors.get(a)?;
        let vb = self.vectors.get(b)?;
        cosine_distance(va, vb)
    }

    fn score(&self, words: &[String], subset_size: usize) -> Option<f32> {
        if subset_size < 2 || words.len() < subset_size {
            return None;
        }
        let subset = &words[..subset_size];
        let mut sum = 0.0f32;
        let mut pairs = 0usize;
        for i in 0..subset.len() {
            for j in (i + 1)..subset.len() {
                sum += self.distance(&subset[i], &subset[j])?;
                pairs += 1;
            }
        }
        Some(sum / pairs as f32 * 100.0)
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(1.0 - dot / denom)
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
