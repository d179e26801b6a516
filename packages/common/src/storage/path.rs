use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::error::StorageError;

const MAX_PATH_LEN: usize = 512;

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// A validated bucket-relative object key, e.g. `course/12/1718000000000-cover.png`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Parse and validate an existing object key.
    pub fn parse(path: &str) -> Result<Self, StorageError> {
        validate_object_path(path)
            .map(Self)
            .map_err(|e| StorageError::InvalidPath(e.into()))
    }

    /// Build a fresh key for an upload: `{category}/{owner_id}/{stamp}-{name}`.
    ///
    /// The stamp is strictly increasing within the process, so re-uploading the
    /// same file name for the same owner always yields a new key.
    pub fn for_upload(
        category: &str,
        owner_id: impl fmt::Display,
        original_name: &str,
    ) -> Result<Self, StorageError> {
        let name = sanitize_file_name(original_name);
        Self::parse(&format!(
            "{category}/{owner_id}/{}-{name}",
            next_upload_stamp()
        ))
    }

    /// Accept a key that already exists in the bucket.
    ///
    /// Older uploads kept the browser's file name verbatim, so spaces, `%` and
    /// parentheses are allowed here. Only the structural checks apply: no
    /// traversal, no leading `/`, no empty or dot segments.
    pub fn from_stored(path: &str) -> Result<Self, StorageError> {
        validate_structure(path)
            .map(|()| Self(path.to_string()))
            .map_err(|e| StorageError::InvalidPath(e.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Debug for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectPath({})", self.0)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ObjectPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Milliseconds since the epoch, bumped so that no two calls return the same value.
pub fn next_upload_stamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_STAMP.compare_exchange_weak(prev, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

/// Reduce a user-supplied file name to characters that are safe in an object key.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Checks if a path string contains path traversal patterns.
fn contains_path_traversal(path: &str) -> bool {
    path == ".."
        || path.starts_with("../")
        || path.contains("/../")
        || path.ends_with("/..")
}

fn validate_structure(path: &str) -> Result<(), &'static str> {
    if path.trim().is_empty() {
        return Err("Path cannot be empty");
    }

    if path.len() > MAX_PATH_LEN {
        return Err("Path exceeds maximum length of 512 characters");
    }

    if path.chars().any(char::is_control) {
        return Err("Path must not contain control characters");
    }

    if path.contains('\\') {
        return Err("Path must not contain backslashes");
    }

    if path.starts_with('/') {
        return Err("Path must not start with '/'");
    }

    if path.ends_with('/') {
        return Err("Path must not end with '/'");
    }

    if contains_path_traversal(path) {
        return Err("Path must not contain '..' traversal");
    }

    for segment in path.split('/') {
        if segment.is_empty() {
            return Err("Path must not contain empty segments");
        }
        if segment == "." {
            return Err("Path must not contain '.' segments");
        }
    }

    Ok(())
}

fn validate_object_path(path: &str) -> Result<String, &'static str> {
    let trimmed = path.trim();
    validate_structure(trimmed)?;

    if trimmed.split('/').any(|segment| segment.starts_with('.')) {
        return Err("Path segments must not start with '.'");
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
    {
        return Err("Path contains invalid characters (allowed: a-zA-Z0-9, /, -, _, .)");
    }

    Ok(trimmed.to_string())
}
