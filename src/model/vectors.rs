use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, warn};

use crate::input::table::open_maybe_gz;
use crate::model::ModelError;

pub fn load_vocab(path: &Path) -> Result<HashSet<String>, ModelError> {
    let reader = open_maybe_gz(path)?;
    let mut vocab = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        vocab.insert(word.to_lowercase());
    }
    if vocab.is_empty() {
        return Err(ModelError::InvalidModel(format!(
            "vocabulary file {} is empty",
            path.display()
        )));
    }
    Ok(vocab)
}

/// Parse a GloVe-style text vectors file, keeping only vocabulary words.
/// The first data line fixes the dimensionality; lines with a different
/// column count or unparsable components are skipped with a warning.
pub fn load_vectors(
    path: &Path,
    vocab: &HashSet<String>,
) -> Result<(HashMap<String, Vec<f32>>, usize), ModelError> {
    let reader = open_maybe_gz(path)?;
    let mut vectors: HashMap<String, Vec<f32>> = HashMap::new();
    let mut n_dims = 0usize;
    let mut line_no = 0usize;
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        line_no += 1;
        let mut parts = line.split_whitespace();
        let word = match parts.next() {
            Some(w) => w.to_lowercase(),
            None => continue,
        };
        let components: Vec<&str> = parts.collect();
        if components.is_empty() {
            skipped += 1;
            continue;
        }
        if n_dims == 0 {
            n_dims = components.len();
        } else if components.len() != n_dims {
            warn!(
                "vector line {} has {} components, expected {}; skipping",
                line_no,
                components.len(),
                n_dims
            );
            skipped += 1;
            continue;
        }
        if !vocab.contains(&word) {
            continue;
        }
        if vectors.contains_key(&word) {
            debug!("duplicate vector for '{}'; keeping first (line {})", word, line_no);
            continue;
        }
        let mut vector = Vec::with_capacity(n_dims);
        let mut ok = true;
        for c in &components {
            match c.parse::<f32>() {
                Ok(v) => vector.push(v),
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if !ok {
            warn!("vector line {} has unparsable components; skipping", line_no);
            skipped += 1;
            continue;
        }
        vectors.insert(word, vector);
    }

    if vectors.is_empty() {
        return Err(ModelError::InvalidModel(format!(
            "no usable vectors in {} ({} lines skipped)",
            path.display(),
            skipped
        )));
    }
    if skipped > 0 {
        warn!("{} vector lines skipped while loading {}", skipped, path.display());
    }
    Ok((vectors, n_dims))
}

#[derive(Debug, Clone)]
pub struct VectorLineIssue {
    pub line_no: usize,
    pub n_columns: usize,
}

#[derive(Debug, Clone)]
pub struct VectorFileCheck {
    pub n_lines_checked: usize,
    pub n_columns: usize,
    pub issues: Vec<VectorLineIssue>,
}

/// Inspect the first `max_lines` data lines of a vectors file and report the
/// column count fixed by the first line plus every line deviating from it.
pub fn check_vector_file(path: &Path, max_lines: usize) -> Result<VectorFileCheck, ModelError> {
    let reader = open_maybe_gz(path)?;
    let mut n_columns = 0usize;
    let mut n_lines_checked = 0usize;
    let mut issues = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        if n_lines_checked >= max_lines {
            break;
        }
        let line = line?;
        let cols = line.split_whitespace().count();
        if cols == 0 {
            continue;
        }
        n_lines_checked += 1;
        if n_columns == 0 {
            n_columns = cols;
        } else if cols != n_columns {
            issues.push(VectorLineIssue {
                line_no: idx + 1,
                n_columns: cols,
            });
        }
    }

    if n_lines_checked == 0 {
        return Err(ModelError::InvalidModel(format!(
            "vectors file {} has no data lines",
            path.display()
        )));
    }
    Ok(VectorFileCheck {
        n_lines_checked,
        n_columns,
        issues,
    })
}
