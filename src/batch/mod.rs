//! Batch Benchmark
//!
//! Scores every image in a folder against its ground truth. Each image is
//! an independent item: engine failures and unreadable ground truth are
//! recorded on the item and the run carries on with the rest.

pub mod summary;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ReportConfig;
use crate::similarity::{compare, normalize, ComparisonResult, ComparisonWarning};
use crate::source::{create_custom_text, load_text_file, save_custom_text, EngineRegistry};

pub use summary::{BatchSummary, ScoreBand};

/// Inputs of a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Folder holding the images
    pub images_dir: PathBuf,
    /// Folder holding `<image stem>.json` or `<image stem>.txt` ground truth
    pub ground_truth_dir: PathBuf,
    /// Model scored against ground truth
    pub model: String,
    /// Second model scored against the first model's output
    pub compare_model: Option<String>,
    /// Save each model's cleaned text here when set
    pub text_output_dir: Option<PathBuf>,
    /// Worker threads
    pub workers: usize,
    /// Image extensions to pick up (case-insensitive)
    pub image_extensions: Vec<String>,
}

/// Ground-truth comparison figures for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthComparison {
    pub similarity: f64,
    pub total_reference_words: usize,
    pub correct_words: usize,
    pub missing_count: usize,
    pub extra_count: usize,
}

impl From<&ComparisonResult> for GroundTruthComparison {
    fn from(result: &ComparisonResult) -> Self {
        Self {
            similarity: result.similarity_score(),
            total_reference_words: result.total_reference_words(),
            correct_words: result.correct_words(),
            missing_count: result.incorrect_word_count(),
            extra_count: result.extra_word_count(),
        }
    }
}

/// Agreement between the primary model and the comparison model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub model: String,
    pub similarity: f64,
}

/// Outcome for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub image: String,
    pub basename: String,
    pub model: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Token count of the model output
    pub candidate_words: usize,
    pub ground_truth: Option<GroundTruthComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_comparison: Option<ModelComparison>,
    /// Why the comparison model produced no output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_comparison_error: Option<String>,
}

/// All results of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub compare_model: Option<String>,
    pub results: Vec<ItemResult>,
}

impl BatchReport {
    pub fn summary(&self, config: &ReportConfig) -> BatchSummary {
        BatchSummary::from_results(&self.results, config)
    }
}

/// Images in `dir` with one of `extensions`, sorted by path
pub fn collect_images(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read images folder {:?}", dir))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if matches && path.is_file() {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

/// Ground truth file for an image stem, `.json` preferred over `.txt`
pub fn find_ground_truth(dir: &Path, stem: &str) -> Option<PathBuf> {
    ["json", "txt"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
}

/// Score one image
pub fn process_image(image: &Path, options: &BatchOptions, registry: &EngineRegistry) -> ItemResult {
    let image_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let basename = image
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!("Processing: {}", image_name);

    let mut item = ItemResult {
        image: image_name,
        basename,
        model: options.model.clone(),
        success: false,
        error: None,
        candidate_words: 0,
        ground_truth: None,
        model_comparison: None,
        model_comparison_error: None,
    };

    let candidate = match registry.extract(&options.model, image) {
        Ok(text) => create_custom_text(&text),
        Err(e) => {
            warn!("{}: {} failed: {:#}", item.image, options.model, e);
            item.error = Some(format!("{:#}", e));
            return item;
        }
    };
    item.candidate_words = normalize(&candidate).len();
    save_text(options, &item.basename, &options.model, &candidate);

    match find_ground_truth(&options.ground_truth_dir, &item.basename) {
        Some(gt_path) => match load_text_file(&gt_path) {
            Ok(gt_text) => {
                let result = compare(&gt_text, &candidate);
                if result.has_warning(ComparisonWarning::EmptyReference) {
                    warn!("{}: ground truth {:?} has no words", item.image, gt_path);
                }
                debug!("{}: similarity {:.2}%", item.image, result.similarity_score());
                item.ground_truth = Some(GroundTruthComparison::from(&result));
            }
            Err(e) => {
                warn!("{}: {}", item.image, e);
                item.error = Some(e.to_string());
            }
        },
        None => warn!("GT not found for {} in {:?}", item.image, options.ground_truth_dir),
    }

    if let Some(second) = &options.compare_model {
        match registry.extract(second, image) {
            Ok(text) => {
                let second_text = create_custom_text(&text);
                let result = compare(&candidate, &second_text);
                item.model_comparison = Some(ModelComparison {
                    model: second.clone(),
                    similarity: result.similarity_score(),
                });
                save_text(options, &item.basename, second, &second_text);
            }
            Err(e) => {
                warn!("{}: {} failed: {:#}", item.image, second, e);
                item.model_comparison_error = Some(format!("{:#}", e));
            }
        }
    }

    item.success = item.error.is_none();
    item
}

fn save_text(options: &BatchOptions, basename: &str, model: &str, text: &str) {
    if let Some(dir) = &options.text_output_dir {
        let path = dir.join(format!("{}_{}.txt", basename, model));
        if let Err(e) = save_custom_text(text, &path) {
            warn!("Failed to save {:?}: {:#}", path, e);
        }
    }
}

/// Run the whole batch on a pool of worker threads.
///
/// Results come back in image order regardless of completion order.
pub fn run_batch(options: &BatchOptions, registry: &EngineRegistry) -> Result<BatchReport> {
    // Resolve models up front so a typo fails the run instead of every item
    registry.get(&options.model)?;
    if let Some(second) = &options.compare_model {
        registry.get(second)?;
    }

    let images = collect_images(&options.images_dir, &options.image_extensions)?;
    info!("Found {} images in {:?}", images.len(), options.images_dir);

    let (job_tx, job_rx) = unbounded::<(usize, PathBuf)>();
    let (result_tx, result_rx) = unbounded::<(usize, ItemResult)>();

    for job in images.iter().cloned().enumerate() {
        job_tx.send(job).context("job queue closed")?;
    }
    drop(job_tx);

    let workers = options.workers.clamp(1, images.len().max(1));
    debug!("Starting {} batch workers", workers);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, image) in job_rx.iter() {
                    let item = process_image(&image, options, registry);
                    if result_tx.send((index, item)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<ItemResult>> = vec![None; images.len()];
    for (index, item) in result_rx.iter() {
        slots[index] = Some(item);
    }

    Ok(BatchReport {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        model: options.model.clone(),
        compare_model: options.compare_model.clone(),
        results: slots.into_iter().flatten().collect(),
    })
}
