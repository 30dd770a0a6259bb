//! Session snapshot loading.
//!
//! A snapshot is the JSON export of one session as the web application
//! stores it: the video, its template, every evaluation and the users who
//! submitted them.

use crate::error::{AnalyticsError, Result as AnalyticsResult};
use crate::models::{Evaluation, SessionSnapshot};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Read and parse a session snapshot.
pub fn load_snapshot(path: &Path) -> Result<SessionSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;

    let snapshot: SessionSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))?;

    debug!(
        "Loaded session {} with {} evaluation(s) and {} user(s)",
        snapshot.session.id,
        snapshot.evaluations.len(),
        snapshot.users.len()
    );

    Ok(snapshot)
}

impl SessionSnapshot {
    /// Check the template rubric and the video duration.
    pub fn validate(&self) -> AnalyticsResult<()> {
        let duration = self.session.video_duration;
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnalyticsError::InvalidArgument(format!(
                "session {} has invalid video duration {}",
                self.session.id, duration
            )));
        }

        self.template.validate()
    }

    /// Evaluations to analyze, optionally restricted to complete ones.
    pub fn select_evaluations(&self, complete_only: bool) -> Vec<Evaluation> {
        self.evaluations
            .iter()
            .filter(|e| !complete_only || e.is_complete)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "session": {"id": "s1", "title": "Pitch rehearsal", "videoDuration": 180},
        "template": {
            "id": "t1",
            "name": "Pitch rubric",
            "categories": [{
                "id": "delivery",
                "name": "Delivery",
                "weight": 1,
                "criteria": [{"id": "pace", "name": "Pace", "minValue": 1, "maxValue": 5, "weight": 1}]
            }]
        },
        "evaluations": [
            {"id": "e1", "userId": "u1", "scores": [{"criterionId": "pace", "score": 4}], "isComplete": true},
            {"id": "e2", "userId": "u2", "scores": [{"criterionId": "pace", "score": 3}], "isComplete": false}
        ],
        "users": [{"id": "u1", "displayName": "Ada"}, {"id": "u2", "name": "Grace"}]
    }"#;

    #[test]
    fn test_load_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.session.title, "Pitch rehearsal");
        assert_eq!(snapshot.session.video_duration, 180.0);
        assert_eq!(snapshot.evaluations.len(), 2);
        assert_eq!(snapshot.users[1].display_name, "Grace");
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_load_snapshot_errors() {
        assert!(load_snapshot(Path::new("/no/such/session.json")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse session file"));
    }

    #[test]
    fn test_select_evaluations() {
        let snapshot: SessionSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.select_evaluations(false).len(), 2);

        let complete = snapshot.select_evaluations(true);
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].id, "e1");
    }

    #[test]
    fn test_validate_rejects_broken_rubric() {
        let mut snapshot: SessionSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        snapshot.template.categories[0].criteria[0].max_value = 1.0;
        assert!(matches!(
            snapshot.validate(),
            Err(AnalyticsError::InvalidCriterionRange { .. })
        ));

        let mut snapshot: SessionSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        snapshot.session.video_duration = -1.0;
        assert!(snapshot.validate().is_err());
    }
}
