use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AssetBacked, AssetFields, AssetRef, EntityKind, Record, Validate};
use super::{require, require_id, require_if_set};
use crate::error::AdminError;

/// Badge tier. Trades use the same tiers for their required badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeType {
    Beginner,
    Intermediate,
    Advance,
}

impl BadgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::Beginner => "BEGINNER",
            BadgeType::Intermediate => "INTERMEDIATE",
            BadgeType::Advance => "ADVANCE",
        }
    }

    /// Checkpoint number written to the badge's chapter.
    pub fn checkpoint_level(&self) -> u8 {
        match self {
            BadgeType::Beginner => 1,
            BadgeType::Intermediate => 2,
            BadgeType::Advance => 3,
        }
    }
}

impl fmt::Display for BadgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeType {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BEGINNER" => Ok(BadgeType::Beginner),
            "INTERMEDIATE" => Ok(BadgeType::Intermediate),
            "ADVANCE" | "ADVANCED" => Ok(BadgeType::Advance),
            other => Err(AdminError::Validation(format!(
                "Unknown badge type '{other}' (expected BEGINNER, INTERMEDIATE or ADVANCE)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub image: AssetRef,
    #[serde(rename = "type")]
    pub badge_type: BadgeType,
    pub course_id: i32,
    pub chapter_id: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDraft {
    pub name: String,
    pub image: AssetRef,
    #[serde(rename = "type")]
    pub badge_type: BadgeType,
    pub course_id: i32,
    pub chapter_id: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<AssetRef>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub badge_type: Option<BadgeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<i32>,
}

impl Record for Badge {
    const KIND: EntityKind = EntityKind::Badge;
    type Draft = BadgeDraft;
    type Patch = BadgePatch;

    fn id(&self) -> i32 {
        self.id
    }
}

impl AssetBacked for Badge {
    const ASSET_REQUIRED: bool = true;

    fn asset(&self) -> &AssetRef {
        &self.image
    }
}

impl Validate for BadgeDraft {
    fn validate(&self) -> Result<(), AdminError> {
        require("Name", &self.name)?;
        require_id("Course", self.course_id)?;
        require_id("Chapter", self.chapter_id)
    }
}

impl Validate for BadgePatch {
    fn validate(&self) -> Result<(), AdminError> {
        require_if_set("Name", self.name.as_ref())?;
        if let Some(id) = self.course_id {
            require_id("Course", id)?;
        }
        if let Some(id) = self.chapter_id {
            require_id("Chapter", id)?;
        }
        Ok(())
    }
}

impl AssetFields for BadgeDraft {
    fn set_asset(&mut self, asset: AssetRef) {
        self.image = asset;
    }
}

impl AssetFields for BadgePatch {
    fn set_asset(&mut self, asset: AssetRef) {
        self.image = Some(asset);
    }
}
