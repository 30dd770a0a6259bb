//! Score aggregation.
//!
//! Weighted per-evaluator totals, evaluator ranking and per-category
//! averages. Scores referencing criteria that are not in the supplied list
//! are skipped without error.

use crate::models::{criterion_index, Category, Criterion, Evaluation, EvaluationScore, Template};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Average raw score of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAverage {
    pub category_id: String,
    pub category_name: String,
    /// Mean of the raw (non-normalized) scores, 0 when there are none.
    pub average: f64,
    /// Highest `max_value` among the category's criteria, 0 when it has none.
    pub max_score: f64,
    /// Number of scores that went into the average.
    pub sample_size: usize,
}

/// Weighted total of one evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorScore {
    pub evaluation_id: String,
    pub evaluator_id: String,
    /// Weighted total on a 0-100 scale.
    pub score: f64,
}

/// Compute the weighted total (0-100) of one evaluation.
pub fn compute_evaluator_total(evaluation: &Evaluation, criteria: &[Criterion]) -> f64 {
    let index = criterion_index(criteria);

    let mut weighted_sum = 0.0;
    let mut max_possible = 0.0;

    for entry in &evaluation.scores {
        let Some(criterion) = index.get(entry.criterion_id.as_str()) else {
            trace!(
                "Skipping score for unknown criterion '{}' in evaluation {}",
                entry.criterion_id,
                evaluation.id
            );
            continue;
        };

        let normalized = if criterion.max_value != 0.0 {
            entry.score / criterion.max_value
        } else {
            0.0
        };

        weighted_sum += normalized * criterion.weight * 100.0;
        max_possible += criterion.weight * 100.0;
    }

    if max_possible > 0.0 {
        (weighted_sum / max_possible) * 100.0
    } else {
        0.0
    }
}

/// Compute the average raw score of a category.
pub fn compute_category_average(category: &Category, scores: &[EvaluationScore]) -> CategoryAverage {
    let values: Vec<f64> = scores
        .iter()
        .filter(|s| category.contains(&s.criterion_id))
        .map(|s| s.score)
        .collect();

    let average = if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    };

    let max_score = category
        .criteria
        .iter()
        .map(|c| c.max_value)
        .reduce(f64::max)
        .unwrap_or(0.0);

    CategoryAverage {
        category_id: category.id.clone(),
        category_name: category.name.clone(),
        average,
        max_score,
        sample_size: values.len(),
    }
}

/// Rank evaluators by weighted total (highest first).
///
/// The sort is stable: evaluators with equal totals keep their input order.
pub fn compute_evaluator_ranking(
    evaluations: &[Evaluation],
    criteria: &[Criterion],
) -> Vec<EvaluatorScore> {
    let mut ranking: Vec<EvaluatorScore> = evaluations
        .iter()
        .map(|e| EvaluatorScore {
            evaluation_id: e.id.clone(),
            evaluator_id: e.user_id.clone(),
            score: compute_evaluator_total(e, criteria),
        })
        .collect();

    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));

    ranking
}

/// Category averages for every category of a template, over all evaluations.
pub fn compute_template_breakdown(
    template: &Template,
    evaluations: &[Evaluation],
) -> Vec<CategoryAverage> {
    let scores: Vec<EvaluationScore> = evaluations
        .iter()
        .flat_map(|e| e.scores.iter().cloned())
        .collect();

    template
        .categories
        .iter()
        .map(|category| compute_category_average(category, &scores))
        .collect()
}
