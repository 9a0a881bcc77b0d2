//! OCR Bench - word-level accuracy scoring for OCR engines
//!
//! Compares the text an OCR engine extracted against a ground-truth
//! transcription and reports how many reference words were recognized.

pub mod batch;
pub mod config;
pub mod report;
pub mod similarity;
pub mod source;
pub mod storage;

pub use similarity::{
    compare, compare_bytes, compare_sources, normalize, ComparisonResult, ComparisonWarning,
    InputError, TextSource, Token, WordCount,
};
