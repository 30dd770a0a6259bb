//! Inter-evaluator agreement.
//!
//! Agreement is a heuristic proxy based on relative dispersion:
//! `max(0, 1 - stddev / mean)`. It is not Cohen's kappa or an ICC, and
//! dashboards are calibrated to this exact formula. A single score (or
//! none) counts as perfect agreement.

use super::stats::{mean, population_variance};
use crate::models::{Criterion, Evaluation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Dispersion statistics for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementStats {
    pub mean: f64,
    pub variance: f64,
    pub stddev: f64,
    pub coefficient_of_variation: f64,
    /// 1 means identical scores, 0 means high relative dispersion.
    pub agreement: f64,
}

/// Agreement record for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionAgreement {
    pub criterion_id: String,
    pub criterion_name: String,
    /// Number of evaluations that scored this criterion.
    pub sample_size: usize,
    #[serde(flatten)]
    pub stats: AgreementStats,
}

/// Result of an agreement analysis over a whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AgreementTable {
    /// Fewer than two evaluations were supplied.
    InsufficientData { evaluations: usize },
    /// Per-criterion records, lowest agreement first.
    Computed { criteria: Vec<CriterionAgreement> },
}

impl AgreementTable {
    /// Per-criterion records, empty when data was insufficient.
    pub fn records(&self) -> &[CriterionAgreement] {
        match self {
            AgreementTable::InsufficientData { .. } => &[],
            AgreementTable::Computed { criteria } => criteria,
        }
    }

    /// Overall agreement, or `None` when data was insufficient.
    pub fn overall(&self) -> Option<f64> {
        match self {
            AgreementTable::InsufficientData { .. } => None,
            AgreementTable::Computed { criteria } => Some(compute_overall_agreement(criteria)),
        }
    }

    /// Criteria whose agreement is below `threshold`, worst first.
    pub fn problem_areas(&self, threshold: f64) -> Vec<&CriterionAgreement> {
        self.records()
            .iter()
            .filter(|r| r.stats.agreement < threshold)
            .collect()
    }
}

/// Compute agreement statistics for the scores given to one criterion.
pub fn compute_criterion_agreement(scores: &[f64]) -> AgreementStats {
    if scores.len() < 2 {
        return AgreementStats {
            mean: scores.first().copied().unwrap_or(0.0),
            variance: 0.0,
            stddev: 0.0,
            coefficient_of_variation: 0.0,
            agreement: 1.0,
        };
    }

    let mean = mean(scores);
    let variance = population_variance(scores, mean);
    let stddev = variance.sqrt();
    let coefficient_of_variation = if mean > 0.0 { stddev / mean } else { 0.0 };

    AgreementStats {
        mean,
        variance,
        stddev,
        coefficient_of_variation,
        agreement: (1.0 - coefficient_of_variation).max(0.0),
    }
}

/// Unweighted mean of per-criterion agreement. Criterion weight is ignored.
///
/// Returns 0 for an empty slice.
pub fn compute_overall_agreement(records: &[CriterionAgreement]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    records.iter().map(|r| r.stats.agreement).sum::<f64>() / records.len() as f64
}

/// Build the agreement table for a session, lowest agreement first.
pub fn compute_agreement_table(evaluations: &[Evaluation], criteria: &[Criterion]) -> AgreementTable {
    if evaluations.len() < 2 {
        debug!(
            "Agreement analysis skipped: {} evaluation(s)",
            evaluations.len()
        );
        return AgreementTable::InsufficientData {
            evaluations: evaluations.len(),
        };
    }

    let mut records: Vec<CriterionAgreement> = criteria
        .iter()
        .map(|criterion| {
            let scores: Vec<f64> = evaluations
                .iter()
                .filter_map(|e| e.score_for(&criterion.id))
                .collect();

            CriterionAgreement {
                criterion_id: criterion.id.clone(),
                criterion_name: criterion.name.clone(),
                sample_size: scores.len(),
                stats: compute_criterion_agreement(&scores),
            }
        })
        .collect();

    records.sort_by(|a, b| a.stats.agreement.total_cmp(&b.stats.agreement));

    AgreementTable::Computed { criteria: records }
}
