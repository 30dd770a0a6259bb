//! Markdown and JSON report generation.
//!
//! This module renders a [`SessionReport`] for people (Markdown) or for
//! downstream tooling (JSON).

use super::builder::{
    AgreementSection, EvaluatorComments, RankedEvaluator, ReportMetadata, SessionReport,
    TimelineSection,
};
use crate::analysis::{AgreementTable, CategoryAverage, CriterionDistribution};
use anyhow::Result;

/// Width of the widest bar in text histograms.
const BAR_WIDTH: usize = 20;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SessionReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!(
        "# Evaluation Report: {}\n\n",
        if report.metadata.session_title.is_empty() {
            &report.metadata.session_id
        } else {
            &report.metadata.session_title
        }
    ));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_ranking_section(&report.ranking));
    output.push_str(&generate_categories_section(&report.categories));
    output.push_str(&generate_agreement_section(&report.agreement));
    output.push_str(&generate_distributions_section(&report.distributions));

    if let Some(ref timeline) = report.timeline {
        output.push_str(&generate_timeline_section(timeline));
    }

    output.push_str(&generate_comments_section(&report.comments_per_evaluator));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Session:** {}\n", metadata.session_id));
    if !metadata.template_name.is_empty() {
        section.push_str(&format!("- **Template:** {}\n", metadata.template_name));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Evaluations:** {} analyzed of {} ({} complete)\n",
        metadata.evaluations_analyzed, metadata.evaluations_total, metadata.evaluations_complete
    ));
    section.push_str(&format!("- **Comments:** {}\n", metadata.comments_total));
    section.push_str(&format!(
        "- **Video Duration:** {:.0}s\n",
        metadata.video_duration
    ));
    section.push('\n');

    section
}

/// Generate the evaluator ranking.
fn generate_ranking_section(ranking: &[RankedEvaluator]) -> String {
    let mut section = String::new();

    section.push_str("## Evaluator Ranking\n\n");

    if ranking.is_empty() {
        section.push_str("No evaluations to rank.\n\n");
        return section;
    }

    section.push_str("| # | Evaluator | Weighted Total |\n");
    section.push_str("|:---:|:---|:---:|\n");
    for entry in ranking {
        section.push_str(&format!(
            "| {} | {} | {:.1} |\n",
            entry.rank, entry.display_name, entry.score
        ));
    }
    section.push('\n');

    section
}

/// Generate the category averages.
fn generate_categories_section(categories: &[CategoryAverage]) -> String {
    if categories.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Categories\n\n");
    section.push_str("| Category | Average | Max | Scores |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for category in categories {
        section.push_str(&format!(
            "| {} | {:.2} | {} | {} |\n",
            category.category_name, category.average, category.max_score, category.sample_size
        ));
    }
    section.push('\n');

    section
}

/// Generate the agreement section (worst criteria first).
fn generate_agreement_section(agreement: &AgreementSection) -> String {
    let mut section = String::new();

    section.push_str("## Agreement\n\n");

    let records = match agreement.table {
        AgreementTable::InsufficientData { evaluations } => {
            section.push_str(&format!(
                "Not enough data: agreement needs at least 2 evaluations, found {}.\n\n",
                evaluations
            ));
            return section;
        }
        AgreementTable::Computed { ref criteria } => criteria,
    };

    if let Some(overall) = agreement.overall {
        section.push_str(&format!("**Overall agreement:** {:.1}%\n\n", overall * 100.0));
    }

    section.push_str("| Criterion | Agreement | Mean | Std Dev | Scores |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    for record in records {
        section.push_str(&format!(
            "| {} | {:.1}% | {:.2} | {:.2} | {} |\n",
            record.criterion_name,
            record.stats.agreement * 100.0,
            record.stats.mean,
            record.stats.stddev,
            record.sample_size
        ));
    }
    section.push('\n');

    if !agreement.problem_areas.is_empty() {
        section.push_str(&format!(
            "### Problem Areas (agreement below {:.0}%)\n\n",
            agreement.problem_threshold * 100.0
        ));
        for record in &agreement.problem_areas {
            section.push_str(&format!(
                "- **{}**: {:.1}%\n",
                record.criterion_name,
                record.stats.agreement * 100.0
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate per-criterion statistics and histograms.
fn generate_distributions_section(distributions: &[CriterionDistribution]) -> String {
    if distributions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Score Distributions\n\n");
    for distribution in distributions {
        let stats = &distribution.stats;
        section.push_str(&format!("### {}\n\n", distribution.criterion_name));
        section.push_str(&format!(
            "*n = {} | mean {:.2} | median {:.2} | min {} | max {} | std dev {:.2}*\n\n",
            stats.count, stats.mean, stats.median, stats.min, stats.max, stats.stddev
        ));

        let widest = distribution
            .histogram
            .iter()
            .map(|b| b.count)
            .max()
            .unwrap_or(0);

        section.push_str("```\n");
        for bin in &distribution.histogram {
            section.push_str(&format!(
                "{:>9} | {:<width$} {}\n",
                bin.label,
                bar(bin.count, widest),
                bin.count,
                width = BAR_WIDTH
            ));
        }
        section.push_str("```\n\n");
    }

    section
}

/// Generate the comment timeline section.
fn generate_timeline_section(timeline: &TimelineSection) -> String {
    let mut section = String::new();

    section.push_str("## Comment Timeline\n\n");
    section.push_str(&format!(
        "*Interval: {}s*\n\n",
        timeline.intervals.interval_size
    ));

    section.push_str("| Interval | Comments |\n");
    section.push_str("|:---|:---:|\n");
    for (label, count) in timeline
        .intervals
        .labels
        .iter()
        .zip(&timeline.intervals.counts)
    {
        section.push_str(&format!("| {} | {} |\n", label, count));
    }
    section.push('\n');

    if !timeline.peaks.is_empty() {
        section.push_str(&format!(
            "**Peak intervals:** {}\n\n",
            timeline.peaks.join(", ")
        ));
    }

    if !timeline.hotspots.is_empty() {
        section.push_str("### Hotspots\n\n");
        for (i, hotspot) in timeline.hotspots.iter().enumerate() {
            section.push_str(&format!(
                "{}. {} ({} comments)\n",
                i + 1,
                hotspot.time,
                hotspot.count
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the comments-per-evaluator section.
fn generate_comments_section(rows: &[EvaluatorComments]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Comments by Evaluator\n\n");
    section.push_str("| Evaluator | Comments |\n");
    section.push_str("|:---|:---:|\n");

    let mut rows: Vec<_> = rows.iter().collect();
    rows.sort_by_key(|r| std::cmp::Reverse(r.count));
    for row in rows {
        section.push_str(&format!("| {} | {} |\n", row.display_name, row.count));
    }
    section.push('\n');

    section
}

/// Scale a count to a bar of `#` characters.
fn bar(count: usize, widest: usize) -> String {
    if widest == 0 {
        return String::new();
    }
    "#".repeat(count * BAR_WIDTH / widest)
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by Evalens*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SessionReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
