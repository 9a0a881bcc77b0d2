//! Text Sources
//!
//! Loads ground truth and saved OCR output from disk. OCR output is either
//! plain text or the JSON document an engine returned, from which the
//! `custom_text` field is extracted.

pub mod engines;

use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::similarity::{InputError, TextSource};

pub use engines::{EngineRegistry, SavedOutputEngine, TextEngine, KNOWN_MODELS};

/// Keys searched for text, in priority order
const TEXT_KEYS: &[&str] = &["custom_text", "custom_texts", "text"];

/// Extract the text field from an OCR JSON document.
///
/// Top-level keys are checked first, then the first element of a `data`
/// array. Arrays of lines are joined with newlines.
pub fn extract_custom_text(doc: &Value) -> Option<String> {
    find_text(doc).or_else(|| {
        doc.get("data")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(find_text)
    })
}

fn find_text(obj: &Value) -> Option<String> {
    TEXT_KEYS
        .iter()
        .find_map(|key| obj.get(*key))
        .map(value_to_text)
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Load text from a `.json` OCR output or a plain text file
pub fn load_text_file(path: &Path) -> Result<String, InputError> {
    let bytes = std::fs::read(path).map_err(|e| InputError::io(path, e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let doc: Value = serde_json::from_slice(&bytes).map_err(|e| InputError::json(path, e))?;
        debug!("Extracting text from OCR JSON {:?}", path);
        return extract_custom_text(&doc).ok_or_else(|| InputError::MissingText {
            path: path.to_path_buf(),
        });
    }

    let source = TextSource::from_bytes(path.display().to_string(), &bytes)?;
    Ok(source.content().to_owned())
}

/// Load a file as a labelled text source
pub fn load_source(label: impl Into<String>, path: &Path) -> Result<TextSource, InputError> {
    Ok(TextSource::new(label, load_text_file(path)?))
}

/// Clean raw OCR text: trim each line and drop leading/trailing blank lines
pub fn create_custom_text(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// Save cleaned text to a `.txt` file, creating parent directories
pub fn save_custom_text(text: &str, path: &Path) -> anyhow::Result<()> {
    crate::storage::write_text(path, text)
}
