use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AssetBacked, AssetFields, AssetRef, BadgeType, EntityKind, Record, Validate};
use super::{require, require_if_set};
use crate::error::AdminError;

/// A reward students can exchange for a badge of the required tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub image: AssetRef,
    #[serde(default)]
    pub description: String,
    pub required_badge_type: BadgeType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDraft {
    pub title: String,
    pub image: AssetRef,
    pub description: String,
    pub required_badge_type: BadgeType,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<AssetRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_badge_type: Option<BadgeType>,
}

impl Record for Trade {
    const KIND: EntityKind = EntityKind::Trade;
    type Draft = TradeDraft;
    type Patch = TradePatch;

    fn id(&self) -> i32 {
        self.id
    }
}

impl AssetBacked for Trade {
    const ASSET_REQUIRED: bool = true;

    fn asset(&self) -> &AssetRef {
        &self.image
    }
}

impl Validate for TradeDraft {
    fn validate(&self) -> Result<(), AdminError> {
        require("Title", &self.title)?;
        require("Description", &self.description)
    }
}

impl Validate for TradePatch {
    fn validate(&self) -> Result<(), AdminError> {
        require_if_set("Title", self.title.as_ref())?;
        require_if_set("Description", self.description.as_ref())
    }
}

impl AssetFields for TradeDraft {
    fn set_asset(&mut self, asset: AssetRef) {
        self.image = asset;
    }
}

impl AssetFields for TradePatch {
    fn set_asset(&mut self, asset: AssetRef) {
        self.image = Some(asset);
    }
}
