use serde::{Deserialize, Serialize};

use super::{EntityKind, NoDraft, Record, Validate, string_or_number};
use crate::error::AdminError;

const MAX_SCORE: i32 = 100;

/// A learner's progress on one chapter, including the assignment they handed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i32,
    pub user_id: i32,
    pub chapter_id: i32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub assignment_done: bool,
    /// Link to the handed-in file, if any.
    #[serde(default)]
    pub submission: Option<String>,
    #[serde(default)]
    pub assignment_score: Option<i32>,
    #[serde(default)]
    pub assignment_feedback: Option<String>,
    #[serde(default)]
    pub user: Option<Learner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Learner {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub student_id: Option<String>,
}

/// Score and feedback for a submission. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_feedback: Option<String>,
}

impl Record for Submission {
    const KIND: EntityKind = EntityKind::Submission;
    type Draft = NoDraft;
    type Patch = Grade;

    fn id(&self) -> i32 {
        self.id
    }
}

impl Validate for Grade {
    fn validate(&self) -> Result<(), AdminError> {
        if self.assignment_score.is_none() && self.assignment_feedback.is_none() {
            return Err(AdminError::Validation(
                "Score or feedback is required".into(),
            ));
        }
        if let Some(score) = self.assignment_score {
            if !(0..=MAX_SCORE).contains(&score) {
                return Err(AdminError::Validation(format!(
                    "Score must be between 0 and {MAX_SCORE}, got {score}"
                )));
            }
        }
        Ok(())
    }
}
