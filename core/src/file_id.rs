//! Content-addressed file identifiers.
//!
//! A [`FileId`] is derived purely from `(mtime, size, path)`. It is not a
//! security boundary — SHA-1 is used only because it is fast and the
//! collision model (§4.1 of the design) treats files identical under those
//! three attributes as genuinely interchangeable.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn create(mtime: f64, size: u64, path: &str) -> Self {
        let key = format!("{mtime}:{size}:{path}");
        let digest = Sha1::digest(key.as_bytes());
        Self(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            digest,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
