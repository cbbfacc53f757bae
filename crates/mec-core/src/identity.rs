//! # Identifier Newtypes
//!
//! Backend-issued identifiers. Both wrap strings whose format is owned by the
//! backend; the console only guarantees they are never blank.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Unique, backend-assigned record identifier (the `_id` of a record).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Create a record identifier, rejecting blank input.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::BlankRecordId`] for empty or whitespace-only
    /// strings.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(IdentityError::BlankRecordId);
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Opaque locator for an uploaded media asset, as returned by the upload
/// endpoint. Owned by exactly one form slot until it is submitted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetUrl(String);

impl AssetUrl {
    /// Create an asset reference, rejecting blank input.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::BlankAssetUrl`] for empty or whitespace-only
    /// strings.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(IdentityError::BlankAssetUrl);
        }
        Ok(Self(s))
    }

    /// Interpret a form or wire string as an optional reference. Blank
    /// strings mean "no asset".
    pub fn from_optional(value: &str) -> Option<Self> {
        Self::new(value).ok()
    }

    /// Access the URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetUrl {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetUrl> for String {
    fn from(url: AssetUrl) -> Self {
        url.0
    }
}

impl std::fmt::Display for AssetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AssetUrl {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
