use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use super::path::ObjectPath;

/// Characters left as-is in the key part of a public URL.
const KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Pure mapping between object paths and their public URLs.
///
/// Public URLs have the shape `{base_url}/{bucket}/{path}`. The path is
/// recovered by cutting everything up to and including the first `/{bucket}/`
/// and percent-decoding the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrlScheme {
    base_url: String,
    bucket: String,
}

impl PublicUrlScheme {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.into(),
        }
    }

    pub fn url_for(&self, path: &ObjectPath) -> String {
        let key = utf8_percent_encode(path.as_str(), KEY);
        format!("{}/{}/{key}", self.base_url, self.bucket)
    }

    /// Returns `None` for URLs that do not point into this bucket or carry an
    /// unusable key (including sentinel values such as `"pending"`).
    ///
    /// Keys written by older uploaders are accepted as long as they are
    /// structurally safe; see [`ObjectPath::from_stored`].
    pub fn path_of(&self, url: &str) -> Option<ObjectPath> {
        let marker = format!("/{}/", self.bucket);
        let (_, rest) = url.split_once(&marker)?;
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let key = percent_decode_str(rest).decode_utf8().ok()?;
        ObjectPath::from_stored(&key).ok()
    }
}
