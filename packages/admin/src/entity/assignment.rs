use serde::{Deserialize, Serialize};

use super::{AssetBacked, AssetFields, AssetRef, EntityKind, Record, Validate};
use super::{require, require_id, require_if_set};
use crate::error::AdminError;

/// A chapter's assignment brief, optionally with an attached file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i32,
    pub chapter_id: i32,
    pub instruction: String,
    #[serde(default)]
    pub file_url: AssetRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub chapter_id: i32,
    pub instruction: String,
    pub file_url: AssetRef,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<AssetRef>,
}

impl Record for Assignment {
    const KIND: EntityKind = EntityKind::Assignment;
    type Draft = AssignmentDraft;
    type Patch = AssignmentPatch;

    fn id(&self) -> i32 {
        self.id
    }
}

impl AssetBacked for Assignment {
    const ASSET_REQUIRED: bool = false;

    fn asset(&self) -> &AssetRef {
        &self.file_url
    }
}

impl Validate for AssignmentDraft {
    fn validate(&self) -> Result<(), AdminError> {
        require_id("Chapter", self.chapter_id)?;
        require("Instruction", &self.instruction)
    }
}

impl Validate for AssignmentPatch {
    fn validate(&self) -> Result<(), AdminError> {
        require_if_set("Instruction", self.instruction.as_ref())
    }
}

impl AssetFields for AssignmentDraft {
    fn set_asset(&mut self, asset: AssetRef) {
        self.file_url = asset;
    }
}

impl AssetFields for AssignmentPatch {
    fn set_asset(&mut self, asset: AssetRef) {
        self.file_url = Some(asset);
    }
}
