//! Session report assembly.
//!
//! Runs every analytics component over one session snapshot and collects
//! the results into a [`SessionReport`]. The components are invoked
//! independently; this module only wires inputs to outputs and attaches
//! display names.

use crate::analysis::{
    collect_comments, compute_agreement_table, compute_criterion_distribution,
    compute_evaluator_ranking, compute_hotspots, compute_intervals, compute_peak_intervals,
    compute_template_breakdown, AgreementTable, CategoryAverage, CriterionAgreement,
    CriterionDistribution, Hotspot, TimelineIntervals, DEFAULT_CLUSTER_WIDTH, DEFAULT_TOP_N,
};
use crate::config::Config;
use crate::error::Result;
use crate::models::{user_directory, Evaluation, SessionSnapshot, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Knobs for one report run.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub complete_only: bool,
    pub problem_threshold: f64,
    pub cluster_width: f64,
    pub top_n: usize,
    /// Replaces the snapshot's video duration when set.
    pub video_duration: Option<f64>,
    pub include_histograms: bool,
    pub include_timeline: bool,
    pub include_comments_per_evaluator: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            complete_only: false,
            problem_threshold: 0.7,
            cluster_width: DEFAULT_CLUSTER_WIDTH,
            top_n: DEFAULT_TOP_N,
            video_duration: None,
            include_histograms: true,
            include_timeline: true,
            include_comments_per_evaluator: true,
        }
    }
}

impl From<&Config> for AnalysisSettings {
    fn from(config: &Config) -> Self {
        Self {
            complete_only: config.analysis.complete_only,
            problem_threshold: config.analysis.problem_threshold,
            cluster_width: config.timeline.cluster_width,
            top_n: config.timeline.top_n,
            video_duration: None,
            include_histograms: config.report.include_histograms,
            include_timeline: config.report.include_timeline,
            include_comments_per_evaluator: config.report.include_comments_per_evaluator,
        }
    }
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub session_id: String,
    pub session_title: String,
    pub template_name: String,
    pub generated_at: DateTime<Utc>,
    /// Evaluations in the snapshot.
    pub evaluations_total: usize,
    /// Evaluations submitted as complete.
    pub evaluations_complete: usize,
    /// Evaluations that went into the analysis.
    pub evaluations_analyzed: usize,
    pub comments_total: usize,
    pub video_duration: f64,
}

/// One row of the evaluator ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEvaluator {
    /// 1-based position.
    pub rank: usize,
    pub evaluator_id: String,
    pub display_name: String,
    pub score: f64,
}

/// Comment activity of one evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorComments {
    pub evaluator_id: String,
    pub display_name: String,
    pub count: usize,
}

/// Agreement results of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementSection {
    pub table: AgreementTable,
    /// `None` when fewer than two evaluations were analyzed.
    pub overall: Option<f64>,
    pub problem_threshold: f64,
    pub problem_areas: Vec<CriterionAgreement>,
}

/// Comment timeline of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSection {
    pub intervals: TimelineIntervals,
    /// Empty when there are no comments on the timeline.
    pub peaks: Vec<String>,
    pub hotspots: Vec<Hotspot>,
}

/// The complete analytics report of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub metadata: ReportMetadata,
    pub ranking: Vec<RankedEvaluator>,
    pub categories: Vec<CategoryAverage>,
    pub agreement: AgreementSection,
    pub distributions: Vec<CriterionDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineSection>,
    pub comments_per_evaluator: Vec<EvaluatorComments>,
}

/// Display name of a user, falling back to the id.
fn display_name(directory: &HashMap<&str, &User>, user_id: &str) -> String {
    directory
        .get(user_id)
        .map(|u| u.display_name.clone())
        .unwrap_or_else(|| user_id.to_string())
}

/// Count comments per evaluator, in evaluation order.
fn comments_per_evaluator(
    evaluations: &[Evaluation],
    directory: &HashMap<&str, &User>,
) -> Vec<EvaluatorComments> {
    let mut rows: Vec<EvaluatorComments> = Vec::new();

    for evaluation in evaluations {
        match rows.iter_mut().find(|r| r.evaluator_id == evaluation.user_id) {
            Some(row) => row.count += evaluation.comments.len(),
            None => rows.push(EvaluatorComments {
                evaluator_id: evaluation.user_id.clone(),
                display_name: display_name(directory, &evaluation.user_id),
                count: evaluation.comments.len(),
            }),
        }
    }

    rows
}

/// Build the analytics report of a session.
pub fn build_report(snapshot: &SessionSnapshot, settings: &AnalysisSettings) -> Result<SessionReport> {
    snapshot.validate()?;

    let evaluations = snapshot.select_evaluations(settings.complete_only);
    let criteria = snapshot.template.criteria();
    let directory = user_directory(&snapshot.users);
    let comments = collect_comments(&evaluations);
    let video_duration = settings
        .video_duration
        .unwrap_or(snapshot.session.video_duration);

    info!(
        "Analyzing session {} ({} of {} evaluations, {} criteria)",
        snapshot.session.id,
        evaluations.len(),
        snapshot.evaluations.len(),
        criteria.len()
    );

    let ranking = compute_evaluator_ranking(&evaluations, &criteria)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankedEvaluator {
            rank: i + 1,
            display_name: display_name(&directory, &entry.evaluator_id),
            evaluator_id: entry.evaluator_id,
            score: entry.score,
        })
        .collect();

    let categories = compute_template_breakdown(&snapshot.template, &evaluations);

    let table = compute_agreement_table(&evaluations, &criteria);
    let agreement = AgreementSection {
        overall: table.overall(),
        problem_threshold: settings.problem_threshold,
        problem_areas: table
            .problem_areas(settings.problem_threshold)
            .into_iter()
            .cloned()
            .collect(),
        table,
    };

    let mut distributions = Vec::new();
    if settings.include_histograms {
        for criterion in &criteria {
            if let Some(distribution) = compute_criterion_distribution(criterion, &evaluations)? {
                distributions.push(distribution);
            }
        }
    }

    let timeline = if settings.include_timeline {
        let intervals = compute_intervals(&comments, video_duration)?;
        let peaks = if intervals.counts.iter().any(|c| *c > 0) {
            compute_peak_intervals(&intervals)
        } else {
            Vec::new()
        };
        let hotspots = compute_hotspots(&comments, settings.cluster_width, settings.top_n)?;
        debug!(
            "Timeline: {} interval(s) of {}s, {} peak(s), {} hotspot(s)",
            intervals.labels.len(),
            intervals.interval_size,
            peaks.len(),
            hotspots.len()
        );
        Some(TimelineSection {
            intervals,
            peaks,
            hotspots,
        })
    } else {
        None
    };

    let comments_per_evaluator = if settings.include_comments_per_evaluator {
        comments_per_evaluator(&evaluations, &directory)
    } else {
        Vec::new()
    };

    let metadata = ReportMetadata {
        session_id: snapshot.session.id.clone(),
        session_title: snapshot.session.title.clone(),
        template_name: snapshot.template.name.clone(),
        generated_at: Utc::now(),
        evaluations_total: snapshot.evaluations.len(),
        evaluations_complete: snapshot.evaluations.iter().filter(|e| e.is_complete).count(),
        evaluations_analyzed: evaluations.len(),
        comments_total: comments.len(),
        video_duration,
    };

    Ok(SessionReport {
        metadata,
        ranking,
        categories,
        agreement,
        distributions,
        timeline,
        comments_per_evaluator,
    })
}
