//! OCR engine capability set
//!
//! Maps a model identifier to something that produces text for an image.
//! Invoking real engines (local models, remote APIs) lives outside this
//! crate; the built-in engine replays output those engines already saved.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::load_text_file;

/// Models the benchmark knows how to route
pub const KNOWN_MODELS: &[&str] = &["doctr", "surya", "paddle"];

/// A text-producing OCR engine
pub trait TextEngine: Send + Sync {
    /// Model identifier
    fn name(&self) -> &str;

    /// Extract text for one image
    fn extract(&self, image: &Path) -> Result<String>;
}

/// Reads previously saved engine output for an image.
///
/// For `invoice_1.png` and model `doctr` it looks for
/// `invoice_1_doctr.txt`, then `invoice_1_doctr.json`.
#[derive(Debug, Clone)]
pub struct SavedOutputEngine {
    model: String,
    output_dir: PathBuf,
}

impl SavedOutputEngine {
    pub fn new(model: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into().to_lowercase(),
            output_dir: output_dir.into(),
        }
    }

    /// Candidate output paths for an image
    pub fn output_paths(&self, image: &Path) -> Vec<PathBuf> {
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        ["txt", "json"]
            .iter()
            .map(|ext| self.output_dir.join(format!("{}_{}.{}", stem, self.model, ext)))
            .collect()
    }
}

impl TextEngine for SavedOutputEngine {
    fn name(&self) -> &str {
        &self.model
    }

    fn extract(&self, image: &Path) -> Result<String> {
        let paths = self.output_paths(image);
        let Some(path) = paths.iter().find(|p| p.is_file()) else {
            bail!(
                "no saved {} output for {:?} in {:?}",
                self.model,
                image,
                self.output_dir
            );
        };

        debug!("Replaying {} output from {:?}", self.model, path);
        let text = load_text_file(path)
            .with_context(|| format!("failed to load {} output {:?}", self.model, path))?;
        Ok(text)
    }
}

/// Model identifier to engine lookup
#[derive(Default)]
pub struct EngineRegistry {
    engines: BTreeMap<String, Box<dyn TextEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a [`SavedOutputEngine`] for each model
    pub fn with_saved_outputs(output_dir: &Path, models: &[&str]) -> Self {
        let mut registry = Self::new();
        for model in models {
            registry.register(Box::new(SavedOutputEngine::new(*model, output_dir)));
        }
        registry
    }

    /// Register an engine, replacing any engine with the same name
    pub fn register(&mut self, engine: Box<dyn TextEngine>) {
        self.engines.insert(engine.name().to_lowercase(), engine);
    }

    /// Look up an engine by model identifier (case-insensitive)
    pub fn get(&self, model: &str) -> Result<&dyn TextEngine> {
        match self.engines.get(&model.to_lowercase()) {
            Some(engine) => Ok(engine.as_ref()),
            None => bail!(
                "unknown model '{}', expected one of: {}",
                model,
                self.models().join(", ")
            ),
        }
    }

    /// Registered model identifiers, sorted
    pub fn models(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    /// Run the engine registered for `model`
    pub fn extract(&self, model: &str, image: &Path) -> Result<String> {
        self.get(model)?.extract(image)
    }
}
