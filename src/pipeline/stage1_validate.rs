use tracing::{debug, info};

use crate::model::Oracle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    EmptyOrMissing,
    NotInVocabulary,
}

impl InvalidReason {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidReason::EmptyOrMissing => "empty_or_missing",
            InvalidReason::NotInVocabulary => "not_in_vocabulary",
        }
    }
}

/// Validation outcome for one word slot. `position` is the 1-based slot
/// number from the input row.
#[derive(Debug, Clone)]
pub struct ValidatedWord {
    pub raw: String,
    pub position: usize,
    pub canonical: Option<String>,
    pub reason: Option<InvalidReason>,
    pub umlaut_fallback: bool,
}

impl ValidatedWord {
    pub fn is_valid(&self) -> bool {
        self.canonical.is_some()
    }
}

/// Umlauts and their ASCII digraph equivalents, case-preserving.
const UMLAUT_MAP: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
];

pub fn contains_umlaut(word: &str) -> bool {
    word.chars()
        .any(|ch| UMLAUT_MAP.iter().any(|&(u, _)| u == ch))
}

pub fn convert_umlauts(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for ch in word.chars() {
        match UMLAUT_MAP.iter().find(|&&(u, _)| u == ch) {
            Some(&(_, digraph)) => out.push_str(digraph),
            None => out.push(ch),
        }
    }
    out
}

/// Validate one raw word slot. Empty slots never reach the oracle. A word the
/// oracle rejects gets one umlaut-substitution retry; success on the retry is
/// informational, not an invalid-word diagnostic.
pub fn validate_word(oracle: &dyn Oracle, raw: &str, position: usize) -> ValidatedWord {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ValidatedWord {
            raw: raw.to_string(),
            position,
            canonical: None,
            reason: Some(InvalidReason::EmptyOrMissing),
            umlaut_fallback: false,
        };
    }

    let lowered = trimmed.to_lowercase();
    if let Some(canonical) = oracle.validate(&lowered) {
        return ValidatedWord {
            raw: raw.to_string(),
            position,
            canonical: Some(canonical),
            reason: None,
            umlaut_fallback: false,
        };
    }

    if contains_umlaut(&lowered) {
        let converted = convert_umlauts(&lowered);
        if let Some(canonical) = oracle.validate(&converted) {
            info!("converted '{}' to '{}' - now valid", trimmed, converted);
            return ValidatedWord {
                raw: raw.to_string(),
                position,
                canonical: Some(canonical),
                reason: None,
                umlaut_fallback: true,
            };
        }
    }

    ValidatedWord {
        raw: raw.to_string(),
        position,
        canonical: None,
        reason: Some(InvalidReason::NotInVocabulary),
        umlaut_fallback: false,
    }
}

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub words: Vec<ValidatedWord>,
    /// Canonical forms in first-occurrence order, deduplicated.
    pub valid_words: Vec<String>,
}

pub fn run_stage1(oracle: &dyn Oracle, raw_words: &[String]) -> Stage1Output {
    let mut words = Vec::with_capacity(raw_words.len());
    let mut valid_words: Vec<String> = Vec::new();

    for (idx, raw) in raw_words.iter().enumerate() {
        let validated = validate_word(oracle, raw, idx + 1);
        if let Some(canonical) = &validated.canonical {
            if valid_words.iter().any(|w| w == canonical) {
                debug!(
                    "duplicate canonical word '{}' in slot {}; counted once",
                    canonical,
                    idx + 1
                );
            } else {
                valid_words.push(canonical.clone());
            }
        }
        words.push(validated);
    }

    Stage1Output { words, valid_words }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_validate.rs"]
mod tests;
