//! Markup validation — raw YAML text to a validated `PageSpec`.
//!
//! The document is first read as an untyped value so that a missing
//! `comic_page` or an empty `panels` list is reported as a presence failure
//! instead of a generic deserialization error.

use serde_yaml::Value;
use thiserror::Error;

use crate::models::page::PageSpec;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("page markup is empty")]
    Empty,

    #[error("invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("comic_page key not found")]
    MissingComicPage,

    #[error("panels are not defined")]
    MissingPanels,

    #[error("comic_page has an unexpected shape: {0}")]
    Shape(serde_yaml::Error),
}

/// Parses and validates a page document.
///
/// Fails before any typed conversion when the text is blank, when
/// `comic_page` is missing or null, or when `comic_page.panels` is missing,
/// not a sequence, or empty.
pub fn parse_page(text: &str) -> Result<PageSpec, MarkupError> {
    if text.trim().is_empty() {
        return Err(MarkupError::Empty);
    }

    let document: Value = serde_yaml::from_str(text)?;

    let comic_page = document
        .get("comic_page")
        .filter(|v| !v.is_null())
        .ok_or(MarkupError::MissingComicPage)?;

    let panel_count = comic_page
        .get("panels")
        .and_then(Value::as_sequence)
        .map(Vec::len)
        .unwrap_or(0);
    if panel_count == 0 {
        return Err(MarkupError::MissingPanels);
    }

    serde_yaml::from_value(comic_page.clone()).map_err(MarkupError::Shape)
}
