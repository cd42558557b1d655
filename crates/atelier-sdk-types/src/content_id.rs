use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors you can get while trying to construct a content identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentIdError {
    #[error("content identifier is empty")]
    Empty,

    /// Content identifiers address bytes in content storage, they are never URLs.
    #[error("content identifier looks like a URL: {0}")]
    UrlLike(String),
}

/// An identifier into content-addressed storage.
///
/// This is the handle for an uploaded artwork image, authenticity certificate,
/// or assembled token metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContentIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ContentIdError::Empty);
        }
        if id.contains("://") {
            return Err(ContentIdError::UrlLike(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentId {
    type Err = ContentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
