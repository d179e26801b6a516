use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::error::AdminError;

/// Credentials of the signed-in operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Process-wide session, injected into repository clients at construction.
///
/// Lifecycle is explicit: [`SessionContext::load`] at start-up,
/// [`SessionContext::set`] after login, [`SessionContext::clear`] on logout.
/// When backed by a file, `set` and `clear` persist immediately.
#[derive(Debug, Default)]
pub struct SessionContext {
    path: Option<PathBuf>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    /// A context with no session and no backing file.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An in-memory context holding `session`.
    pub fn in_memory(session: Session) -> Self {
        Self {
            path: None,
            current: RwLock::new(Some(session)),
        }
    }

    /// Load the session persisted at `path`; a missing file yields an empty context.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, AdminError> {
        let path = path.into();
        let current = match fs::read(&path).await {
            Ok(bytes) => {
                let session: Session = serde_json::from_slice(&bytes).map_err(|e| {
                    AdminError::Session(format!(
                        "Corrupt session file {}: {e}",
                        path.display()
                    ))
                })?;
                debug!(path = %path.display(), "Session loaded");
                Some(session)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(AdminError::Session(format!(
                    "Failed to read session file {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path: Some(path),
            current: RwLock::new(current),
        })
    }

    pub async fn set(&self, session: Session) -> Result<(), AdminError> {
        if let Some(path) = &self.path {
            persist(path, &session).await?;
        }
        info!(username = ?session.username, "Session stored");
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AdminError> {
        if let Some(path) = &self.path {
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AdminError::Session(format!(
                        "Failed to remove session file {}: {e}",
                        path.display()
                    )));
                }
            }
        }
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        info!("Session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

async fn persist(path: &Path, session: &Session) -> Result<(), AdminError> {
    let io_err = |e: std::io::Error| {
        AdminError::Session(format!(
            "Failed to write session file {}: {e}",
            path.display()
        ))
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let body = serde_json::to_vec_pretty(session)
        .map_err(|e| AdminError::Session(format!("Failed to encode session: {e}")))?;
    fs::write(path, body).await.map_err(io_err)
}

/// `{config dir}/lms-admin/session.json`, or `./session.json` when no config dir exists.
pub fn default_session_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("lms-admin").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("session.json"))
}
