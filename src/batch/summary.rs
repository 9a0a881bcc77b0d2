//! Aggregate figures over a batch run

use serde::{Deserialize, Serialize};

use super::ItemResult;
use crate::config::ReportConfig;

/// Score band used for batch summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn classify(score: f64, config: &ReportConfig) -> Self {
        if score >= config.high_threshold {
            ScoreBand::High
        } else if score >= config.medium_threshold {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }
}

/// Totals and score distribution of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub with_ground_truth: usize,
    /// Mean ground-truth similarity, `None` when no item had ground truth
    pub average_similarity: Option<f64>,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ItemResult], config: &ReportConfig) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            successful: results.iter().filter(|r| r.success).count(),
            ..Default::default()
        };

        let scores: Vec<f64> = results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.ground_truth.as_ref())
            .map(|gt| gt.similarity)
            .collect();

        summary.with_ground_truth = scores.len();
        if !scores.is_empty() {
            summary.average_similarity = Some(scores.iter().sum::<f64>() / scores.len() as f64);
        }

        for score in scores {
            match ScoreBand::classify(score, config) {
                ScoreBand::High => summary.high += 1,
                ScoreBand::Medium => summary.medium += 1,
                ScoreBand::Low => summary.low += 1,
            }
        }

        summary
    }
}
