//! Text Similarity Scoring
//!
//! Normalizes a reference (ground truth) text and a candidate (OCR) text,
//! matches them at word granularity and reports accuracy.
//!
//! Everything here is pure and synchronous: no I/O, no shared mutable
//! state. Comparisons can run concurrently from any number of threads.

pub mod compare;
pub mod error;
pub mod multiset;
pub mod normalize;

use serde::{Deserialize, Serialize};

pub use compare::{
    compare, compare_bytes, compare_multisets, compare_sources, ComparisonResult,
    ComparisonWarning, Substitution, WordCount,
};
pub use error::InputError;
pub use multiset::TokenMultiset;
pub use normalize::{normalize, normalize_to_text, Token, PRESERVED_SYMBOLS};

/// Labelled text content, e.g. "reference" or "candidate"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSource {
    label: String,
    content: String,
}

impl TextSource {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }

    /// Capture raw bytes, which must be valid UTF-8
    pub fn from_bytes(label: impl Into<String>, bytes: &[u8]) -> Result<Self, InputError> {
        let label = label.into();
        match std::str::from_utf8(bytes) {
            Ok(content) => Ok(Self::new(label, content)),
            Err(err) => Err(InputError::invalid_utf8(label, &err)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Normalized tokens of the content
    pub fn tokens(&self) -> Vec<Token> {
        normalize(&self.content)
    }

    /// Token multiset of the content
    pub fn multiset(&self) -> TokenMultiset {
        TokenMultiset::from_tokens(self.tokens())
    }
}
