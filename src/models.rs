//! Data models for evaluation sessions.
//!
//! These are the plain input types every analytics component consumes:
//! the rubric (template, categories, criteria), the evaluator submissions
//! (evaluations, scores, comments) and the users that label the output.

use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single scorable dimension of the rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    /// Unique identifier, referenced by scores.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lowest valid score.
    pub min_value: f64,
    /// Highest valid score.
    pub max_value: f64,
    /// Relative weight in the evaluator total.
    pub weight: f64,
}

impl Criterion {
    /// Checks that the range is non-empty and the weight non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.min_value.is_finite()
            || !self.max_value.is_finite()
            || self.max_value <= self.min_value
        {
            return Err(AnalyticsError::InvalidCriterionRange {
                criterion_id: self.id.clone(),
                min_value: self.min_value,
                max_value: self.max_value,
            });
        }

        if self.weight < 0.0 || self.weight.is_nan() {
            return Err(AnalyticsError::NegativeWeight {
                criterion_id: self.id.clone(),
                weight: self.weight,
            });
        }

        Ok(())
    }
}

/// A named group of criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Display weight. Not required to sum to 1 across categories.
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl Category {
    /// Returns true if the criterion belongs to this category.
    pub fn contains(&self, criterion_id: &str) -> bool {
        self.criteria.iter().any(|c| c.id == criterion_id)
    }
}

/// The rubric of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Template {
    /// All criteria of the template, in category order.
    pub fn criteria(&self) -> Vec<Criterion> {
        self.categories
            .iter()
            .flat_map(|c| c.criteria.iter().cloned())
            .collect()
    }

    /// Validates every criterion of the template.
    pub fn validate(&self) -> Result<()> {
        self.categories
            .iter()
            .flat_map(|c| &c.criteria)
            .try_for_each(Criterion::validate)
    }
}

/// One score given for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationScore {
    pub criterion_id: String,
    pub score: f64,
}

/// A comment left at a point in the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    /// Seconds from the start of the video.
    pub timestamp: f64,
    #[serde(default)]
    pub text: String,
}

/// One evaluator's submission for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub scores: Vec<EvaluationScore>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub is_complete: bool,
}

impl Evaluation {
    /// Returns the first score given for a criterion, if any.
    pub fn score_for(&self, criterion_id: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.criterion_id == criterion_id)
            .map(|s| s.score)
    }
}

/// An evaluator, used only to label output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(alias = "name")]
    pub display_name: String,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Builds an id -> user lookup.
pub fn user_directory(users: &[User]) -> HashMap<&str, &User> {
    users.iter().map(|u| (u.id.as_str(), u)).collect()
}

/// Builds an id -> criterion lookup.
pub fn criterion_index(criteria: &[Criterion]) -> HashMap<&str, &Criterion> {
    criteria.iter().map(|c| (c.id.as_str(), c)).collect()
}

/// The evaluated video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSession {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Length of the video in seconds.
    pub video_duration: f64,
}

/// Everything the report layer needs for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session: VideoSession,
    pub template: Template,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub users: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(id: &str, min: f64, max: f64, weight: f64) -> Criterion {
        Criterion {
            id: id.to_string(),
            name: id.to_string(),
            min_value: min,
            max_value: max,
            weight,
        }
    }

    #[test]
    fn test_criterion_validation() {
        assert!(criterion("a", 0.0, 10.0, 1.0).validate().is_ok());
        assert!(criterion("a", 0.0, 10.0, 0.0).validate().is_ok());

        assert!(matches!(
            criterion("a", 5.0, 5.0, 1.0).validate(),
            Err(AnalyticsError::InvalidCriterionRange { .. })
        ));
        assert!(matches!(
            criterion("a", 10.0, 1.0, 1.0).validate(),
            Err(AnalyticsError::InvalidCriterionRange { .. })
        ));
        assert!(matches!(
            criterion("a", 0.0, 10.0, -0.5).validate(),
            Err(AnalyticsError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn test_template_criteria_order() {
        let template = Template {
            id: "t".to_string(),
            name: "Rubric".to_string(),
            categories: vec![
                Category {
                    id: "c1".to_string(),
                    name: "Delivery".to_string(),
                    weight: 1.0,
                    criteria: vec![criterion("a", 0.0, 10.0, 1.0), criterion("b", 0.0, 5.0, 1.0)],
                },
                Category {
                    id: "c2".to_string(),
                    name: "Content".to_string(),
                    weight: 1.0,
                    criteria: vec![criterion("c", 1.0, 4.0, 2.0)],
                },
            ],
        };

        let ids: Vec<_> = template.criteria().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(template.validate().is_ok());
        assert!(template.categories[0].contains("b"));
        assert!(!template.categories[1].contains("b"));
    }

    #[test]
    fn test_score_for_uses_first_entry() {
        let evaluation = Evaluation {
            id: "e1".to_string(),
            user_id: "u1".to_string(),
            scores: vec![
                EvaluationScore {
                    criterion_id: "a".to_string(),
                    score: 4.0,
                },
                EvaluationScore {
                    criterion_id: "a".to_string(),
                    score: 9.0,
                },
            ],
            comments: Vec::new(),
            is_complete: true,
        };

        assert_eq!(evaluation.score_for("a"), Some(4.0));
        assert_eq!(evaluation.score_for("missing"), None);
    }

    #[test]
    fn test_parse_camel_case_payload() {
        let json = r#"{
            "id": "e1",
            "userId": "u1",
            "scores": [{"criterionId": "a", "score": 7}],
            "comments": [{"id": "m1", "userId": "u1", "timestamp": 12.5, "text": "nice"}],
            "isComplete": true
        }"#;

        let evaluation: Evaluation = serde_json::from_str(json).unwrap();
        assert_eq!(evaluation.scores[0].criterion_id, "a");
        assert_eq!(evaluation.comments[0].timestamp, 12.5);
        assert!(evaluation.is_complete);
    }

    #[test]
    fn test_user_directory() {
        let users = vec![
            User {
                id: "u1".to_string(),
                display_name: "Ada".to_string(),
            },
            User {
                id: "u2".to_string(),
                display_name: "Grace".to_string(),
            },
        ];

        let directory = user_directory(&users);
        assert_eq!(directory.get("u2").map(|u| u.to_string()), Some("Grace".to_string()));
        assert!(directory.get("u3").is_none());
    }
}
