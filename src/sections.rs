//! Structured-section parsing
//!
//! Turns the raw JSON blocks of a request into typed record lists and the
//! comma separated language string into a list of names.

use crate::models::{ResumeRequest, StructuredSections};
use crate::{Error, Result};
use serde::de::DeserializeOwned;

pub const LANGUAGE_DELIMITER: char = ',';

/// Parse every structured section of `request`.
///
/// A single malformed block fails the whole call; no partial lists are
/// returned.
pub fn parse_sections(request: &ResumeRequest) -> Result<StructuredSections> {
    Ok(StructuredSections {
        education: parse_records("education", &request.education)?,
        experience: parse_records("experience", &request.experience)?,
        references: parse_records("references", &request.references)?,
        languages: split_languages(&request.languages),
    })
}

/// Parse one JSON list of records, tagging failures with the section name.
pub fn parse_records<T: DeserializeOwned>(section: &str, raw: &str) -> Result<Vec<T>> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::debug!("Rejected {} section: {}", section, e);
        Error::Parse(format!("{} section: {}", section, e))
    })
}

pub fn split_languages(raw: &str) -> Vec<String> {
    raw.split(LANGUAGE_DELIMITER)
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(String::from)
        .collect()
}
