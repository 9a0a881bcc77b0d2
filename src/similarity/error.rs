//! Input errors for the scoring engine

use std::path::PathBuf;
use thiserror::Error;

/// Input that cannot be turned into text for comparison.
///
/// Fatal to the call that produced it. Batch callers record it against the
/// item and move on to the next comparison.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{label} text is not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidUtf8 { label: String, offset: usize },
    #[error("no text field found in OCR output {}", path.display())]
    MissingText { path: PathBuf },
    #[error("I/O error while reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl InputError {
    pub(crate) fn invalid_utf8(label: impl Into<String>, err: &std::str::Utf8Error) -> Self {
        Self::InvalidUtf8 {
            label: label.into(),
            offset: err.valid_up_to(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
