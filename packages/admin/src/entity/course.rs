use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AssetBacked, AssetFields, AssetRef, EntityKind, Record, Validate};
use super::{require, require_if_set};
use crate::error::AdminError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i32,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: AssetRef,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub name: String,
    pub code: String,
    pub description: String,
    pub image: AssetRef,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<AssetRef>,
}

impl Record for Course {
    const KIND: EntityKind = EntityKind::Course;
    type Draft = CourseDraft;
    type Patch = CoursePatch;

    fn id(&self) -> i32 {
        self.id
    }
}

impl AssetBacked for Course {
    const ASSET_REQUIRED: bool = true;

    fn asset(&self) -> &AssetRef {
        &self.image
    }
}

impl Validate for CourseDraft {
    fn validate(&self) -> Result<(), AdminError> {
        require("Name", &self.name)?;
        require("Code", &self.code)?;
        require("Description", &self.description)
    }
}

impl Validate for CoursePatch {
    fn validate(&self) -> Result<(), AdminError> {
        require_if_set("Name", self.name.as_ref())?;
        require_if_set("Code", self.code.as_ref())?;
        require_if_set("Description", self.description.as_ref())
    }
}

impl AssetFields for CourseDraft {
    fn set_asset(&mut self, asset: AssetRef) {
        self.image = asset;
    }
}

impl AssetFields for CoursePatch {
    fn set_asset(&mut self, asset: AssetRef) {
        self.image = Some(asset);
    }
}
