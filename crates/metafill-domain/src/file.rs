//! Files, credentials and apply results

use crate::extraction::MetadataTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of item returned by a folder listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A regular file
    File,
    /// A folder
    Folder,
    /// A bookmark
    WebLink,
}

/// A file (or other item) in the storage provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    /// Provider identifier, always kept as a string
    pub id: String,
    /// Display name
    pub name: String,
    /// Item kind
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Size in bytes, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileHandle {
    /// Create a handle for a file
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::File,
            size: None,
        }
    }

    /// Whether the item is a file
    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// The authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider user ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Login (usually an email address)
    #[serde(default)]
    pub login: String,
}

/// Result of a successful login
#[derive(Clone)]
pub struct Credentials {
    /// Bearer token
    pub access_token: String,
    /// When the token stops being valid, if known
    pub expires_at: Option<DateTime<Utc>>,
    /// Who the token belongs to, if looked up
    pub user: Option<UserInfo>,
}

impl Credentials {
    /// Create credentials for a bearer token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
            user: None,
        }
    }

    /// Whether the token is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| t <= now).unwrap_or(false)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Metadata instance stored by the provider after an apply call
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMetadata {
    /// File the metadata was written to
    pub file_id: String,
    /// Template or properties instance written
    pub target: MetadataTarget,
    /// Instance as returned by the provider
    pub stored: Value,
    /// True when an existing instance was updated instead of created
    pub updated: bool,
}
