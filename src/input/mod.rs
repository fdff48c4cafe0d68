use std::io::BufRead;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

pub mod table;

use table::{detect_delimiter, open_maybe_gz, split_record};

/// Maximum number of word-response slots per participant row.
pub const WORD_SLOTS: usize = 10;

/// One participant row: a stable identifier plus the raw content of every
/// word-response column present in the file, in slot order. Cells may be
/// empty; trailing slots missing from the file are simply not represented.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub participant_id: String,
    pub words: Vec<String>,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Read the batch table: one row per participant, an identifier column
/// (`participant-id`, `participant_id`, `id` or `vpn`, else the first
/// column) and word columns `word-response-1` .. `word-response-10` in any
/// position. Missing word columns are tolerated.
pub fn load_responses(path: &Path) -> Result<Vec<RawResponse>, InputError> {
    if !path.exists() {
        return Err(InputError::MissingInput(format!(
            "batch file {} not found",
            path.display()
        )));
    }
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    let read = reader.read_line(&mut buf)?;
    if read == 0 {
        return Err(InputError::Parse("batch file is empty".to_string()));
    }
    let header_line = buf.trim_end_matches(['\r', '\n']);
    let delimiter = detect_delimiter(header_line);
    let header = split_record(header_line, delimiter);

    let id_col = find_id_column(&header);
    let word_cols = find_word_columns(&header);
    if word_cols.is_empty() {
        return Err(InputError::InvalidInput(
            "no word-response-N columns in batch file header".to_string(),
        ));
    }
    info!(
        "batch header: id column {}, {} word columns, delimiter {:?}",
        header.get(id_col).map(String::as_str).unwrap_or("?"),
        word_cols.len(),
        delimiter
    );

    let mut responses = Vec::new();
    let mut line_no = 1usize;
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let fields = split_record(line, delimiter);
        let participant_id = fields
            .get(id_col)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if participant_id.is_empty() {
            warn!("row without participant id; skipping (line {})", line_no);
            continue;
        }
        let words = word_cols
            .iter()
            .map(|&idx| {
                fields
                    .get(idx)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            })
            .collect();
        responses.push(RawResponse {
            participant_id,
            words,
        });
    }

    info!("batch loaded: {} participants from {}", responses.len(), path.display());
    Ok(responses)
}

fn find_id_column(header: &[String]) -> usize {
    for (idx, name) in header.iter().enumerate() {
        let lower = name.trim().to_ascii_lowercase();
        if lower == "participant-id" || lower == "participant_id" || lower == "id" || lower == "vpn"
        {
            return idx;
        }
    }
    0
}

/// Column indices of `word-response-1` .. `word-response-10`, in slot order.
fn find_word_columns(header: &[String]) -> Vec<usize> {
    let mut cols = Vec::new();
    for slot in 1..=WORD_SLOTS {
        let wanted = format!("word-response-{}", slot);
        if let Some(idx) = header
            .iter()
            .position(|name| name.trim().eq_ignore_ascii_case(&wanted))
        {
            cols.push(idx);
        }
    }
    cols
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
