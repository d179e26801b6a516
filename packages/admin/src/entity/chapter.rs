use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Record, Validate};
use super::{require, require_id, require_if_set};
use crate::error::AdminError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: Option<i32>,
    pub course_id: i32,
    /// 0 when the chapter awards no badge, otherwise the badge tier (1-3).
    #[serde(default)]
    pub is_checkpoint: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDraft {
    pub name: String,
    pub description: String,
    pub course_id: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_checkpoint: Option<u8>,
}

impl Record for Chapter {
    const KIND: EntityKind = EntityKind::Chapter;
    type Draft = ChapterDraft;
    type Patch = ChapterPatch;

    fn id(&self) -> i32 {
        self.id
    }
}

impl Validate for ChapterDraft {
    fn validate(&self) -> Result<(), AdminError> {
        require("Name", &self.name)?;
        require_id("Course", self.course_id)
    }
}

impl Validate for ChapterPatch {
    fn validate(&self) -> Result<(), AdminError> {
        require_if_set("Name", self.name.as_ref())?;
        if let Some(level) = self.is_checkpoint {
            if level > 3 {
                return Err(AdminError::Validation(format!(
                    "Checkpoint must be between 0 and 3, got {level}"
                )));
            }
        }
        Ok(())
    }
}
