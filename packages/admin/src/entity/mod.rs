//! Records managed through the admin API.
//!
//! Every asset-backed record carries exactly one [`AssetRef`]: either the
//! `"pending"` sentinel or the public URL of an object in the bucket.

mod assignment;
mod badge;
mod chapter;
mod course;
mod member;
mod submission;
mod trade;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AdminError;

pub use assignment::{Assignment, AssignmentDraft, AssignmentPatch};
pub use badge::{Badge, BadgeDraft, BadgePatch, BadgeType};
pub use chapter::{Chapter, ChapterDraft, ChapterPatch};
pub use course::{Course, CourseDraft, CoursePatch};
pub use member::{Member, Role};
pub use submission::{Grade, Learner, Submission};
pub use trade::{Trade, TradeDraft, TradePatch};

/// Wire value of the "no asset yet" sentinel.
pub const PENDING_ASSET: &str = "pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Course,
    Badge,
    Trade,
    Assignment,
    Chapter,
    /// A learner's progress on a chapter.
    #[serde(rename = "userchapter")]
    Submission,
}

impl EntityKind {
    /// REST path segment; also the storage category for the kind's assets.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Course => "course",
            EntityKind::Badge => "badge",
            EntityKind::Trade => "trade",
            EntityKind::Assignment => "assignment",
            EntityKind::Chapter => "chapter",
            EntityKind::Submission => "userchapter",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a record to its asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetRef {
    /// Sentinel: no asset assigned yet.
    #[default]
    Pending,
    /// Public URL of the asset.
    Url(String),
}

impl AssetRef {
    pub fn url(&self) -> Option<&str> {
        match self {
            AssetRef::Pending => None,
            AssetRef::Url(url) => Some(url),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AssetRef::Pending)
    }
}

impl From<Option<String>> for AssetRef {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() && s != PENDING_ASSET => AssetRef::Url(s),
            _ => AssetRef::Pending,
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url().unwrap_or(PENDING_ASSET))
    }
}

impl Serialize for AssetRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.url().unwrap_or(PENDING_ASSET))
    }
}

impl<'de> Deserialize<'de> for AssetRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.into())
    }
}

/// Client-side checks run before any network call.
pub trait Validate {
    fn validate(&self) -> Result<(), AdminError>;
}

/// A payload that carries the record's asset reference.
pub trait AssetFields {
    fn set_asset(&mut self, asset: AssetRef);
}

/// A record type exposed by the REST API under `/{KIND}`.
pub trait Record: DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Create payload.
    type Draft: Validate + Serialize + Send + Sync;
    /// Partial update payload; unset fields are omitted from the request body.
    type Patch: Validate + Serialize + Default + Send + Sync;

    fn id(&self) -> i32;
}

/// Draft type for records the console never creates. It has no values, so
/// `Repository::create` cannot be called for such a record.
#[derive(Debug, Clone, Copy)]
pub enum NoDraft {}

impl Serialize for NoDraft {
    fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        match *self {}
    }
}

impl Validate for NoDraft {
    fn validate(&self) -> Result<(), AdminError> {
        match *self {}
    }
}

/// A record that owns at most one uploaded asset.
pub trait AssetBacked: Record {
    /// Whether create must be given a file.
    const ASSET_REQUIRED: bool;

    fn asset(&self) -> &AssetRef;
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), AdminError> {
    if value.trim().is_empty() {
        return Err(AdminError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_if_set(field: &str, value: Option<&String>) -> Result<(), AdminError> {
    match value {
        Some(v) => require(field, v),
        None => Ok(()),
    }
}

pub(crate) fn require_id(field: &str, value: i32) -> Result<(), AdminError> {
    if value <= 0 {
        return Err(AdminError::Validation(format!("{field} must be selected")));
    }
    Ok(())
}

/// Student ids arrive as strings from some endpoints and numbers from others.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
