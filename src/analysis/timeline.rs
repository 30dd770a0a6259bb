//! Comment timeline bucketing.
//!
//! Groups comment timestamps (seconds from video start) into fixed-width
//! intervals for the timeline chart, and finds short, dense windows
//! ("hotspots").

use crate::error::{AnalyticsError, Result};
use crate::models::{Comment, Evaluation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default hotspot window in seconds.
pub const DEFAULT_CLUSTER_WIDTH: f64 = 10.0;

/// Default number of hotspots returned.
pub const DEFAULT_TOP_N: usize = 3;

/// Shortest timeline interval in seconds.
const MIN_INTERVAL_SECONDS: f64 = 30.0;

/// Target number of timeline intervals.
const TARGET_INTERVALS: f64 = 20.0;

/// Comment counts per timeline interval. `labels` and `counts` are parallel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineIntervals {
    /// Width of each interval in whole seconds.
    pub interval_size: f64,
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

/// A dense comment window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Window start as `m:ss`.
    pub time: String,
    pub start_seconds: f64,
    pub count: usize,
}

/// Format seconds as `m:ss`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// All comments of the given evaluations, in evaluation order.
pub fn collect_comments(evaluations: &[Evaluation]) -> Vec<Comment> {
    evaluations
        .iter()
        .flat_map(|e| e.comments.iter().cloned())
        .collect()
}

/// Count comments per fixed-width interval of the video.
///
/// Comments whose interval does not exist (at or past the end of the last
/// interval, or negative) are dropped.
pub fn compute_intervals(comments: &[Comment], video_duration: f64) -> Result<TimelineIntervals> {
    if !video_duration.is_finite() || video_duration < 0.0 {
        return Err(AnalyticsError::InvalidArgument(format!(
            "video duration must be a non-negative number of seconds, got {}",
            video_duration
        )));
    }

    let interval_size = (video_duration / TARGET_INTERVALS)
        .ceil()
        .max(MIN_INTERVAL_SECONDS);
    let bucket_count = (video_duration / interval_size).ceil() as usize;

    let labels: Vec<String> = (0..bucket_count)
        .map(|i| {
            let start = i as f64 * interval_size;
            let end = (start + interval_size).min(video_duration);
            format!("{}-{}", format_timestamp(start), format_timestamp(end))
        })
        .collect();

    let mut counts = vec![0; labels.len()];
    let mut dropped = 0;
    for comment in comments {
        let slot = (comment.timestamp / interval_size).floor();
        if slot >= 0.0 && (slot as usize) < counts.len() {
            counts[slot as usize] += 1;
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!(
            "Dropped {} comment(s) outside the {}s timeline",
            dropped, video_duration
        );
    }

    Ok(TimelineIntervals {
        interval_size,
        labels,
        counts,
    })
}

/// Labels of every interval tied at the highest count, in timeline order.
pub fn compute_peak_intervals(intervals: &TimelineIntervals) -> Vec<String> {
    let Some(peak) = intervals.counts.iter().copied().max() else {
        return Vec::new();
    };

    intervals
        .labels
        .iter()
        .zip(&intervals.counts)
        .filter(|(_, count)| **count == peak)
        .map(|(label, _)| label.clone())
        .collect()
}

/// The `top_n` windows of `cluster_width` seconds with the most comments.
///
/// Ties keep the order in which their window was first seen.
pub fn compute_hotspots(
    comments: &[Comment],
    cluster_width: f64,
    top_n: usize,
) -> Result<Vec<Hotspot>> {
    if !cluster_width.is_finite() || cluster_width <= 0.0 {
        return Err(AnalyticsError::InvalidArgument(format!(
            "cluster width must be a positive number of seconds, got {}",
            cluster_width
        )));
    }

    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut clusters: Vec<(f64, usize)> = Vec::new();

    for comment in comments {
        if !comment.timestamp.is_finite() || comment.timestamp < 0.0 {
            continue;
        }

        // + 0.0 folds -0.0 into 0.0 so both share a key
        let slot = (comment.timestamp / cluster_width).floor() + 0.0;
        let position = *positions.entry(slot.to_bits()).or_insert_with(|| {
            clusters.push((slot * cluster_width, 0));
            clusters.len() - 1
        });
        clusters[position].1 += 1;
    }

    clusters.sort_by(|a, b| b.1.cmp(&a.1));
    clusters.truncate(top_n);

    Ok(clusters
        .into_iter()
        .map(|(start, count)| Hotspot {
            time: format_timestamp(start),
            start_seconds: start,
            count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(timestamp: f64) -> Comment {
        Comment {
            id: format!("c{}", timestamp),
            user_id: "u1".to_string(),
            timestamp,
            text: String::new(),
        }
    }

    fn comments(timestamps: &[f64]) -> Vec<Comment> {
        timestamps.iter().map(|t| comment(*t)).collect()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(65.9), "1:05");
        assert_eq!(format_timestamp(600.0), "10:00");
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = compute_intervals(&[], 300.0).unwrap();

        assert_eq!(timeline.interval_size, 30.0);
        assert_eq!(timeline.labels.len(), 10);
        assert!(timeline.counts.iter().all(|c| *c == 0));
        assert_eq!(timeline.labels[0], "0:00-0:30");
        assert_eq!(timeline.labels[9], "4:30-5:00");
    }

    #[test]
    fn test_interval_size_grows_with_duration() {
        // 1000s / 20 = 50s intervals
        let timeline = compute_intervals(&[], 1000.0).unwrap();
        assert_eq!(timeline.interval_size, 50.0);
        assert_eq!(timeline.labels.len(), 20);
    }

    #[test]
    fn test_last_interval_clamped() {
        let timeline = compute_intervals(&comments(&[95.0]), 100.0).unwrap();

        assert_eq!(timeline.labels.len(), 4);
        assert_eq!(timeline.labels[3], "1:30-1:40");
        assert_eq!(timeline.counts[3], 1);
    }

    #[test]
    fn test_comments_bucketed_and_overflow_dropped() {
        let input = comments(&[0.0, 29.9, 30.0, 61.0, 300.0, 450.0, -5.0]);
        let timeline = compute_intervals(&input, 300.0).unwrap();

        assert_eq!(timeline.counts[0], 2);
        assert_eq!(timeline.counts[1], 1);
        assert_eq!(timeline.counts[2], 1);
        assert_eq!(timeline.counts.iter().sum::<usize>(), 4);
    }

    #[test]
    fn test_huge_duration_keeps_interval_count_bounded() {
        let input = comments(&[0.0, 6e299]);
        let timeline = compute_intervals(&input, 1e300).unwrap();

        assert!(timeline.interval_size >= 5e298);
        assert!(!timeline.labels.is_empty());
        assert!(timeline.labels.len() <= 21);
        assert_eq!(timeline.labels.len(), timeline.counts.len());
        assert_eq!(timeline.counts.iter().sum::<usize>(), 2);
        assert_eq!(timeline.counts[0], 1);
    }

    #[test]
    fn test_invalid_duration() {
        assert!(matches!(
            compute_intervals(&[], -1.0),
            Err(AnalyticsError::InvalidArgument(_))
        ));
        assert!(compute_intervals(&[], f64::NAN).is_err());

        let zero = compute_intervals(&comments(&[0.0]), 0.0).unwrap();
        assert!(zero.labels.is_empty());
    }

    #[test]
    fn test_peak_intervals_include_ties() {
        let input = comments(&[5.0, 10.0, 70.0, 75.0, 40.0]);
        let timeline = compute_intervals(&input, 120.0).unwrap();

        let peaks = compute_peak_intervals(&timeline);
        assert_eq!(peaks, vec!["0:00-0:30", "1:00-1:30"]);
    }

    #[test]
    fn test_peak_intervals_empty_timeline() {
        let timeline = compute_intervals(&[], 0.0).unwrap();
        assert!(compute_peak_intervals(&timeline).is_empty());
    }

    #[test]
    fn test_hotspots() {
        let input = comments(&[12.0, 15.0, 61.0, 3.0, 65.0, 68.0, 19.9, 130.0]);
        let hotspots = compute_hotspots(&input, DEFAULT_CLUSTER_WIDTH, DEFAULT_TOP_N).unwrap();

        assert_eq!(hotspots.len(), 3);
        assert_eq!(hotspots[0].time, "0:10");
        assert_eq!(hotspots[0].count, 3);
        assert_eq!(hotspots[1].time, "1:00");
        assert_eq!(hotspots[1].count, 3);
        // single-comment windows tie; first seen wins
        assert_eq!(hotspots[2].time, "0:00");
        assert_eq!(hotspots[2].start_seconds, 0.0);
    }

    #[test]
    fn test_hotspots_keep_distant_windows_apart() {
        let input = comments(&[1e300, 2e300, 2e300, 1e19, 2e19]);
        let hotspots = compute_hotspots(&input, DEFAULT_CLUSTER_WIDTH, 10).unwrap();

        assert_eq!(hotspots.len(), 4);
        assert_eq!(hotspots[0].count, 2);
        assert!(hotspots.iter().all(|h| h.count <= 2));
        assert_eq!(hotspots.iter().map(|h| h.count).sum::<usize>(), 5);
    }

    #[test]
    fn test_hotspots_are_idempotent() {
        let input = comments(&[12.0, 15.0, 61.0, 3.0, 65.0, 68.0, 19.9, 130.0, 0.0, -0.0]);

        let first = compute_hotspots(&input, DEFAULT_CLUSTER_WIDTH, 5).unwrap();
        let second = compute_hotspots(&input, DEFAULT_CLUSTER_WIDTH, 5).unwrap();
        assert_eq!(first, second);

        let zero = first.iter().find(|h| h.time == "0:00").unwrap();
        assert_eq!(zero.count, 3);
    }

    #[test]
    fn test_hotspots_invalid_width() {
        assert!(compute_hotspots(&[], 0.0, 3).is_err());
        assert!(compute_hotspots(&[], -10.0, 3).is_err());
        assert!(compute_hotspots(&[], 10.0, 3).unwrap().is_empty());
    }

    #[test]
    fn test_collect_comments() {
        let evaluations = vec![
            Evaluation {
                id: "e1".to_string(),
                user_id: "u1".to_string(),
                scores: Vec::new(),
                comments: comments(&[4.0, 8.0]),
                is_complete: true,
            },
            Evaluation {
                id: "e2".to_string(),
                user_id: "u2".to_string(),
                scores: Vec::new(),
                comments: comments(&[2.0]),
                is_complete: false,
            },
        ];

        let all = collect_comments(&evaluations);
        let stamps: Vec<_> = all.iter().map(|c| c.timestamp).collect();
        assert_eq!(stamps, vec![4.0, 8.0, 2.0]);
    }
}
