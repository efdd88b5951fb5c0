//! Text normalization for case outcomes and plaintiff names
//!
//! Both cleaners are pure functions of the field value. Missing fields map to
//! [`BLANK_LABEL`]; numeric or boolean fields are rejected with
//! [`NormalizeError::InvalidInputKind`] so that the caller decides whether the
//! row is flagged or the run aborts.

mod entity_terms;
mod outcome;
mod plaintiff;

use thiserror::Error;

use crate::table::CellValue;

pub use entity_terms::{EntityTerms, DEFAULT_ENTITY_TERMS};
pub use outcome::{clean_outcome, clean_outcome_text};
pub use plaintiff::{clean_plaintiff, clean_plaintiff_text};

/// Label used for missing or blank fields
pub const BLANK_LABEL: &str = "Blank or NULL";

/// Errors raised by the cleaning rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("expected text, got {kind} value '{raw}'")]
    InvalidInputKind { kind: &'static str, raw: String },

    #[error("'{raw}' cleans to an empty string")]
    EmptyResult { raw: String },
}

impl NormalizeError {
    pub(crate) fn invalid_kind(value: &CellValue<'_>) -> Self {
        let raw = match value {
            CellValue::Missing => String::new(),
            CellValue::Text(s) => s.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
        };
        NormalizeError::InvalidInputKind {
            kind: value.kind_name(),
            raw,
        }
    }
}

/// A cleaning rule applied to one column of a table
pub trait FieldNormalizer: Sync {
    fn normalize(&self, value: CellValue<'_>) -> Result<String, NormalizeError>;
}

/// Case outcome cleaner
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeCleaner;

impl FieldNormalizer for OutcomeCleaner {
    fn normalize(&self, value: CellValue<'_>) -> Result<String, NormalizeError> {
        clean_outcome(value)
    }
}

/// Plaintiff name cleaner with its entity-term lexicon
#[derive(Debug, Clone, Default)]
pub struct PlaintiffCleaner {
    terms: EntityTerms,
}

impl PlaintiffCleaner {
    pub fn new(terms: EntityTerms) -> Self {
        Self { terms }
    }
}

impl FieldNormalizer for PlaintiffCleaner {
    fn normalize(&self, value: CellValue<'_>) -> Result<String, NormalizeError> {
        clean_plaintiff(value, &self.terms)
    }
}
