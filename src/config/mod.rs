//! Benchmark Configuration
//!
//! Report thresholds and batch settings stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Benchmark settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Report settings
    pub report: ReportConfig,
    /// Batch run settings
    pub batch: BatchConfig,
}

/// Report and scoring-band settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Scores at or above this are "high"
    pub high_threshold: f64,
    /// Scores at or above this (and below high) are "medium"
    pub medium_threshold: f64,
    /// `compare` exits with failure below this score
    pub pass_threshold: f64,
    /// Maximum distinct missing/extra words listed in text reports
    pub max_listed_words: usize,
    /// Minimum similarity (0.0 - 1.0) for a likely substitution to be shown
    pub substitution_similarity: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            high_threshold: 90.0,
            medium_threshold: 70.0,
            pass_threshold: 70.0,
            max_listed_words: 20,
            substitution_similarity: 0.6,
        }
    }
}

/// Batch run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads comparing items
    pub workers: usize,
    /// Image file extensions picked up from the images folder
    pub image_extensions: Vec<String>,
    /// Where per-image text and reports are written
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            image_extensions: ["jpg", "jpeg", "png", "webp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<BenchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {:?}", path))?;
    let config: BenchConfig =
        toml::from_str(&content).with_context(|| format!("invalid config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &BenchConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    crate::storage::write_text(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_bench_config() {
        let config = BenchConfig::default();

        // Check report defaults
        assert!((config.report.high_threshold - 90.0).abs() < f64::EPSILON);
        assert!((config.report.medium_threshold - 70.0).abs() < f64::EPSILON);
        assert!((config.report.pass_threshold - 70.0).abs() < f64::EPSILON);
        assert_eq!(config.report.max_listed_words, 20);
        assert!((config.report.substitution_similarity - 0.6).abs() < 0.01);

        // Check batch defaults
        assert_eq!(config.batch.workers, 4);
        assert_eq!(config.batch.image_extensions, vec!["jpg", "jpeg", "png", "webp"]);
        assert_eq!(config.batch.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = BenchConfig::default();
        config.report.pass_threshold = 85.0;
        config.batch.workers = 8;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: BenchConfig = toml::from_str(&toml_str).unwrap();

        assert!((parsed.report.pass_threshold - 85.0).abs() < f64::EPSILON);
        assert_eq!(parsed.batch.workers, 8);
        assert_eq!(parsed.batch.image_extensions, config.batch.image_extensions);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: BenchConfig = toml::from_str("[report]\nmax_listed_words = 5\n").unwrap();

        assert_eq!(parsed.report.max_listed_words, 5);
        assert!((parsed.report.high_threshold - 90.0).abs() < f64::EPSILON);
        assert_eq!(parsed.batch.workers, 4);
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = BenchConfig::default();

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(config.report.max_listed_words, loaded.report.max_listed_words);
        assert_eq!(config.batch.output_dir, loaded.batch.output_dir);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
