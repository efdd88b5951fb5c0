//! Plaintiff name cleaning

use lazy_static::lazy_static;
use regex::Regex;

use super::{EntityTerms, NormalizeError, BLANK_LABEL};
use crate::table::CellValue;

lazy_static! {
    // First LLC, comma, or subrogation marker; the name ends before it
    static ref NAME_END_MARKER: Regex =
        Regex::new(r"(?i)llc|,|a/s/o|as subrogee of|\saso\s").unwrap();
}

/// Clean a plaintiff name field
///
/// - Missing values become [`BLANK_LABEL`]
/// - Text from the first `llc`, comma, `a/s/o`, `as subrogee of` or ` aso ` on is removed
/// - Trailing entity designators (Inc, Corp, Co, ...) are removed
/// - Everything that is not an ASCII letter, digit or space is removed
/// - The result is trimmed and uppercased
pub fn clean_plaintiff(value: CellValue<'_>, terms: &EntityTerms) -> Result<String, NormalizeError> {
    match value {
        CellValue::Missing => Ok(BLANK_LABEL.to_string()),
        CellValue::Text(text) => clean_plaintiff_text(text, terms),
        other => Err(NormalizeError::invalid_kind(&other)),
    }
}

/// Clean plaintiff text that is known to be present
pub fn clean_plaintiff_text(text: &str, terms: &EntityTerms) -> Result<String, NormalizeError> {
    let truncated = match NAME_END_MARKER.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    let truncated = truncated.trim();

    let mut base = terms.strip_suffixes(truncated);
    if base.is_empty() {
        tracing::debug!("entity suffix stripping emptied '{}', keeping it", truncated);
        base = truncated.to_string();
    }

    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_uppercase();

    if cleaned.is_empty() {
        return Err(NormalizeError::EmptyResult {
            raw: text.to_string(),
        });
    }

    Ok(cleaned)
}
