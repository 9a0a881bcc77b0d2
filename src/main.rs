//! OCR Bench - benchmark OCR engines against ground truth
//!
//! Scores saved OCR output word by word and reports what each engine
//! missed or hallucinated.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ocr_bench::batch::{run_batch, BatchOptions};
use ocr_bench::config::{self, BenchConfig};
use ocr_bench::report;
use ocr_bench::similarity::compare_sources;
use ocr_bench::source::{load_source, EngineRegistry, KNOWN_MODELS};
use ocr_bench::storage;

/// OCR Bench - word-level OCR accuracy scoring
#[derive(Parser, Debug)]
#[command(name = "ocr-bench")]
#[command(about = "Benchmark OCR engine output against ground truth text")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare one text against a reference
    Compare(CompareArgs),
    /// Score every image in a folder against its ground truth
    Batch(BatchArgs),
    /// Write the default configuration file
    InitConfig {
        /// Destination (defaults to the platform config directory)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Reference text file (e.g. ground truth)
    #[arg(short, long, requires = "candidate", conflicts_with_all = ["source1", "source2"])]
    reference: Option<PathBuf>,

    /// Text file to score against the reference
    #[arg(short, long, requires = "reference")]
    candidate: Option<PathBuf>,

    /// First source, labelled by its file stem
    #[arg(long, requires = "source2")]
    source1: Option<PathBuf>,

    /// Second source, labelled by its file stem
    #[arg(long, requires = "source1")]
    source2: Option<PathBuf>,

    /// Output the result as JSON
    #[arg(short, long)]
    json: bool,

    /// Save the result to a file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Folder with the benchmark images
    #[arg(short, long)]
    images_folder: PathBuf,

    /// Folder with `<image stem>.json` / `.txt` ground truth
    #[arg(short, long)]
    gt_folder: PathBuf,

    /// Model to score
    #[arg(short, long, value_parser = clap::builder::PossibleValuesParser::new(KNOWN_MODELS.iter().copied()))]
    model: String,

    /// Second model, scored against the first model's output
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(KNOWN_MODELS.iter().copied()))]
    compare_model: Option<String>,

    /// Folder with saved engine output `<stem>_<model>.txt|json` (defaults to the images folder)
    #[arg(long)]
    saved_outputs: Option<PathBuf>,

    /// Folder for cleaned per-image text (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write the full results as JSON
    #[arg(long)]
    output_json: Option<PathBuf>,

    /// Write the text summary
    #[arg(long)]
    output_summary: Option<PathBuf>,

    /// Worker threads (overrides config)
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::InitConfig { path, force } => {
            init_config(path, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Compare(args) => {
            let config = load_or_default_config(cli.config.as_deref())?;
            run_compare(args, &config)
        }
        Command::Batch(args) => {
            let config = load_or_default_config(cli.config.as_deref())?;
            run_batch_command(args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load configuration from an explicit path, the config directory, or defaults
fn load_or_default_config(explicit: Option<&Path>) -> Result<BenchConfig> {
    if let Some(path) = explicit {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_path) = storage::default_config_path() {
        if config_path.exists() {
            match config::load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return Ok(config);
                }
                Err(e) => warn!("Ignoring unreadable config {:?}: {:#}", config_path, e),
            }
        }
    }

    Ok(BenchConfig::default())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => storage::default_config_path()?,
    };
    if path.exists() && !force {
        anyhow::bail!("{:?} already exists (use --force to overwrite)", path);
    }

    config::save_config(&BenchConfig::default(), &path)?;
    info!("Wrote default configuration to {:?}", path);
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_compare(args: CompareArgs, config: &BenchConfig) -> Result<ExitCode> {
    let CompareArgs {
        reference,
        candidate,
        source1,
        source2,
        json,
        output,
    } = args;

    let (first, second, first_label, second_label) = match (reference, candidate, source1, source2) {
        (Some(reference), Some(candidate), _, _) => {
            (reference, candidate, "Reference".to_string(), "Candidate".to_string())
        }
        (_, _, Some(source1), Some(source2)) => {
            let (l1, l2) = (file_label(&source1), file_label(&source2));
            (source1, source2, l1, l2)
        }
        _ => anyhow::bail!("provide either --reference/--candidate or --source1/--source2"),
    };

    let reference = load_source(first_label, &first)
        .with_context(|| format!("failed to load {:?}", first))?;
    let candidate = load_source(second_label, &second)
        .with_context(|| format!("failed to load {:?}", second))?;

    let result = compare_sources(&reference, &candidate);
    if !result.warnings().is_empty() {
        let labels: Vec<&str> = result.warnings().iter().map(|w| w.label()).collect();
        warn!("Degenerate input: {}", labels.join(", "));
    }

    let rendered = if json {
        report::comparison_json(&result, reference.label(), candidate.label())?
    } else {
        report::format_comparison(&result, reference.label(), candidate.label(), &config.report)
    };

    match &output {
        Some(path) => {
            storage::write_text(path, &rendered)?;
            info!("Result saved to {:?}", path);
        }
        None => println!("{}", rendered),
    }

    if result.similarity_score() >= config.report.pass_threshold {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_batch_command(args: BatchArgs, config: &BenchConfig) -> Result<()> {
    let saved_outputs = args
        .saved_outputs
        .clone()
        .unwrap_or_else(|| args.images_folder.clone());
    let registry = EngineRegistry::with_saved_outputs(&saved_outputs, KNOWN_MODELS);

    let options = BatchOptions {
        images_dir: args.images_folder,
        ground_truth_dir: args.gt_folder,
        model: args.model,
        compare_model: args.compare_model,
        text_output_dir: Some(args.output_dir.unwrap_or_else(|| config.batch.output_dir.clone())),
        workers: args.workers.unwrap_or(config.batch.workers),
        image_extensions: config.batch.image_extensions.clone(),
    };

    let batch = run_batch(&options, &registry)?;
    let summary = batch.summary(&config.report);
    let text = report::format_batch_summary(&batch, &summary);
    println!("{}", text);

    if let Some(path) = &args.output_summary {
        storage::write_text(path, &text)?;
        info!("Summary: {:?}", path);
    }
    if let Some(path) = &args.output_json {
        storage::write_text(path, &report::batch_json(&batch)?)?;
        info!("JSON: {:?}", path);
    }

    Ok(())
}
