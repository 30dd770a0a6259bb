//! Score distributions.
//!
//! Descriptive statistics and fixed-width histograms for the values given
//! to a single criterion. Bins assume integer or ordinal score domains:
//! at most ten bins, each at least one unit wide.

use super::stats::{mean, population_variance};
use crate::error::{AnalyticsError, Result};
use crate::models::{Criterion, Evaluation};
use serde::{Deserialize, Serialize};

/// Target number of histogram bins.
const MAX_BINS: f64 = 10.0;

/// Summary statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population variance.
    pub variance: f64,
    pub stddev: f64,
}

/// One histogram bin. `count` is zero for empty bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub label: String,
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Statistics and histogram for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionDistribution {
    pub criterion_id: String,
    pub criterion_name: String,
    pub stats: DescriptiveStats,
    pub histogram: Vec<HistogramBin>,
}

/// Compute descriptive statistics. Returns `None` for an empty sample.
pub fn compute_descriptive_stats(scores: &[f64]) -> Option<DescriptiveStats> {
    if scores.is_empty() {
        return None;
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let mean = mean(scores);
    let variance = population_variance(scores, mean);

    Some(DescriptiveStats {
        count: n,
        mean,
        median,
        min: sorted[0],
        max: sorted[n - 1],
        variance,
        stddev: variance.sqrt(),
    })
}

/// Bin scores over `[min, max]`.
///
/// Every bin is present even when empty. Scores outside the range are
/// counted in the nearest edge bin, so the counts always sum to
/// `scores.len()`.
pub fn compute_histogram(scores: &[f64], min: f64, max: f64) -> Result<Vec<HistogramBin>> {
    if !min.is_finite() || !max.is_finite() {
        return Err(AnalyticsError::InvalidArgument(format!(
            "histogram bounds must be finite (min {}, max {})",
            min, max
        )));
    }
    if max < min {
        return Err(AnalyticsError::InvalidArgument(format!(
            "histogram max {} is below min {}",
            max, min
        )));
    }

    let bin_size = ((max - min) / MAX_BINS).ceil().max(1.0);
    let bin_count = ((max - min) / bin_size).floor() as usize + 1;

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| {
            let start = min + i as f64 * bin_size;
            let end = (start + bin_size - 1.0).min(max);
            HistogramBin {
                label: format!("{}-{}", start, end),
                start,
                end,
                count: 0,
            }
        })
        .collect();

    let last = bins.len() - 1;
    for score in scores {
        let offset = ((score - min) / bin_size).floor();
        let index = if offset.is_nan() || offset < 0.0 {
            0
        } else {
            (offset as usize).min(last)
        };
        bins[index].count += 1;
    }

    Ok(bins)
}

/// Statistics and histogram for one criterion across evaluations.
///
/// Returns `Ok(None)` when no evaluation scored the criterion.
pub fn compute_criterion_distribution(
    criterion: &Criterion,
    evaluations: &[Evaluation],
) -> Result<Option<CriterionDistribution>> {
    criterion.validate()?;

    let scores: Vec<f64> = evaluations
        .iter()
        .filter_map(|e| e.score_for(&criterion.id))
        .collect();

    let Some(stats) = compute_descriptive_stats(&scores) else {
        return Ok(None);
    };

    let histogram = compute_histogram(&scores, criterion.min_value, criterion.max_value)?;

    Ok(Some(CriterionDistribution {
        criterion_id: criterion.id.clone(),
        criterion_name: criterion.name.clone(),
        stats,
        histogram,
    }))
}
