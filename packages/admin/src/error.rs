use common::storage::StorageError;
use thiserror::Error;

use crate::entity::EntityKind;

/// Failures of repository calls and save workflows.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Rejected input, either before any network call or by the server (400/422).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A {0} requires a file to be selected")]
    MissingAsset(EntityKind),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Store(#[from] StorageError),

    /// The record and its asset exist, but the record still carries the sentinel.
    #[error("{kind} {id} was saved but its asset reference could not be updated after {attempts} attempts: {source}")]
    PartialSave {
        kind: EntityKind,
        id: i32,
        url: String,
        attempts: u8,
        source: Box<AdminError>,
    },

    #[error("A save is already in progress for this form")]
    Busy,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AdminError {
    /// One-line failure notice for the operator.
    pub fn notice(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::MissingAsset(kind) => format!("Please select a file for the {kind}."),
            Self::NotFound(msg) => format!("{msg} no longer exists."),
            Self::Network(_) => "The server could not complete the request.".into(),
            Self::Store(_) => "The file could not be uploaded.".into(),
            Self::PartialSave { kind, id, .. } => format!(
                "The {kind} (id {id}) was saved, but its file link is not set yet. Edit it to retry."
            ),
            Self::Busy => "A save is already running. Please wait.".into(),
            Self::Session(msg) => msg.clone(),
            Self::Config(err) => format!("Invalid configuration: {err}"),
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        AdminError::Network(err.to_string())
    }
}
