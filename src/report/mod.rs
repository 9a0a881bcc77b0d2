//! Reports
//!
//! Plain-text and JSON renderings of comparison results and batch runs.

use anyhow::Result;
use serde::Serialize;

use crate::batch::{BatchReport, BatchSummary, ScoreBand};
use crate::config::ReportConfig;
use crate::similarity::{ComparisonResult, WordCount};

const WIDTH: usize = 60;

/// A comparison result together with the labels of its two sides
#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub source1: &'a str,
    pub source2: &'a str,
    #[serde(flatten)]
    pub result: &'a ComparisonResult,
}

fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(WIDTH).collect()
}

/// Words with the most occurrences first, ties keep their order
fn push_word_list(lines: &mut Vec<String>, title: &str, words: &[WordCount], max: usize) {
    if words.is_empty() {
        lines.push(format!("{}: None", title));
        return;
    }

    let mut sorted: Vec<&WordCount> = words.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));

    lines.push(format!("{}:", title));
    for word in sorted.iter().take(max) {
        if word.count > 1 {
            lines.push(format!("  - '{}' (x{})", word.word, word.count));
        } else {
            lines.push(format!("  - '{}'", word.word));
        }
    }
    if sorted.len() > max {
        lines.push(format!("  ... and {} more unique words", sorted.len() - max));
    }
}

/// Human-readable report for a single comparison
pub fn format_comparison(
    result: &ComparisonResult,
    reference_label: &str,
    candidate_label: &str,
    config: &ReportConfig,
) -> String {
    let band = ScoreBand::classify(result.similarity_score(), config);
    let mut lines = vec![
        rule('='),
        "OCR COMPARISON REPORT".to_string(),
        rule('='),
        format!("Reference         : {}", reference_label),
        format!("Candidate         : {}", candidate_label),
        rule('-'),
        format!("Similarity Score  : {:.2}% ({})", result.similarity_score(), band.label()),
        format!("Reference Words   : {}", result.total_reference_words()),
        format!("Candidate Words   : {}", result.total_candidate_words()),
        format!("Correct Words     : {}", result.correct_words()),
        format!("Missing/Incorrect : {}", result.incorrect_word_count()),
        format!("Extra Words       : {}", result.extra_word_count()),
        rule('-'),
    ];

    push_word_list(&mut lines, "Missing Words", result.missing_words(), config.max_listed_words);
    push_word_list(&mut lines, "Extra Words", result.extra_words(), config.max_listed_words);

    let substitutions = result.likely_substitutions(config.substitution_similarity);
    if !substitutions.is_empty() {
        lines.push("Likely Misreads:".to_string());
        for sub in substitutions.iter().take(config.max_listed_words) {
            lines.push(format!(
                "  - '{}' -> '{}' ({:.0}%)",
                sub.expected,
                sub.found,
                sub.similarity * 100.0
            ));
        }
    }

    if !result.warnings().is_empty() {
        let warnings: Vec<&str> = result.warnings().iter().map(|w| w.label()).collect();
        lines.push(format!("Warnings: {}", warnings.join(", ")));
    }

    lines.push(rule('='));
    lines.join("\n")
}

/// JSON report for a single comparison
pub fn comparison_json(
    result: &ComparisonResult,
    reference_label: &str,
    candidate_label: &str,
) -> Result<String> {
    let report = ComparisonReport {
        source1: reference_label,
        source2: candidate_label,
        result,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Human-readable summary of a batch run, best scores first
pub fn format_batch_summary(report: &BatchReport, summary: &BatchSummary) -> String {
    let mut lines = vec![
        rule('='),
        "BATCH OCR BENCHMARK REPORT".to_string(),
        rule('='),
        format!("Model: {}", report.model),
    ];
    if let Some(second) = &report.compare_model {
        lines.push(format!("Compared with: {}", second));
    }
    lines.push(format!(
        "Total: {} | Success: {} | With GT: {}",
        summary.total, summary.successful, summary.with_ground_truth
    ));
    lines.push(rule('-'));

    if let Some(average) = summary.average_similarity {
        lines.push(format!("Avg Similarity: {:.2}%", average));
        lines.push(format!(
            "High: {} | Medium: {} | Low: {}",
            summary.high, summary.medium, summary.low
        ));
        lines.push(rule('-'));
        lines.push(format!("{:<30} {:>8} {:>8} {:>8}", "File", "Score", "Words", "Missing"));
        lines.push(rule('-'));

        let mut scored: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.ground_truth.as_ref().map(|gt| (r, gt)))
            .collect();
        scored.sort_by(|a, b| b.1.similarity.total_cmp(&a.1.similarity));

        for (item, gt) in scored {
            lines.push(format!(
                "{:<30} {:>7.1}% {:>8} {:>8}",
                item.image, gt.similarity, gt.total_reference_words, gt.missing_count
            ));
        }
    }

    let failed: Vec<_> = report.results.iter().filter(|r| !r.success).collect();
    if !failed.is_empty() {
        lines.push(rule('-'));
        lines.push("Failed:".to_string());
        for item in failed {
            lines.push(format!(
                "  - {}: {}",
                item.image,
                item.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    lines.push(rule('='));
    lines.join("\n")
}

/// JSON document for a batch run
pub fn batch_json(report: &BatchReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
