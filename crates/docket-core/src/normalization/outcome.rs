//! Case outcome cleaning

use lazy_static::lazy_static;
use regex::Regex;

use super::{NormalizeError, BLANK_LABEL};
use crate::table::CellValue;

lazy_static! {
    // Run of ALL CAPS words (optionally followed by periods) at the end of the text
    static ref TRAILING_CAPS: Regex =
        Regex::new(r"\b[A-Z]+\b(?:\s[A-Z]+\b)*\.*$").unwrap();

    // Date and time to end of text, e.g. " 07/17/2017 1:15 PM ...". The
    // meridiem is optional because the caps rule runs first and removes a
    // trailing "AM"/"PM" token.
    static ref TRAILING_DATETIME: Regex =
        Regex::new(r"\s\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}(?: [AP]M)?.*$").unwrap();
}

/// Clean a case outcome field
///
/// - Missing values become [`BLANK_LABEL`]
/// - Trailing ALL CAPS words are removed
/// - Everything from the first period on is removed
/// - A trailing date/time and everything after it is removed
pub fn clean_outcome(value: CellValue<'_>) -> Result<String, NormalizeError> {
    match value {
        CellValue::Missing => Ok(BLANK_LABEL.to_string()),
        CellValue::Text(text) => Ok(clean_outcome_text(text)),
        other => Err(NormalizeError::invalid_kind(&other)),
    }
}

/// Clean outcome text that is known to be present
pub fn clean_outcome_text(text: &str) -> String {
    let without_caps = TRAILING_CAPS.replace(text, "");
    let without_caps = without_caps.trim();

    let first_sentence = match without_caps.find('.') {
        Some(pos) => &without_caps[..pos],
        None => without_caps,
    };

    TRAILING_DATETIME
        .replace(first_sentence, "")
        .trim()
        .to_string()
}
