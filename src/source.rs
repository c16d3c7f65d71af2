//! The resolved backports source handed to an applier.
//!
//! These types are output only. A verbatim pin map that happens to hold
//! just `priority` and `release` would read back as `Computed`, so they
//! implement `Serialize` but not `Deserialize`.

use serde::Serialize;
use serde_json::{Map, Value};

/// Signing key for the source: a bare key id, or a map of key attributes
/// (`id`, `source`, `content`, ...) passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SigningKey {
    Id(String),
    Record(Map<String, Value>),
}

impl SigningKey {
    /// Key id, when one is known.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Record(map) => map.get("id").and_then(Value::as_str),
        }
    }
}

/// APT pin for the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PinSpec {
    /// Priority pinned to the resolved release
    Computed { priority: i64, release: String },
    /// Caller-supplied pin map, kept exactly as given
    Verbatim(Map<String, Value>),
}

impl PinSpec {
    /// Priority rendered the way it appears in a preferences file.
    pub fn priority_text(&self) -> Option<String> {
        match self {
            Self::Computed { priority, .. } => Some(priority.to_string()),
            Self::Verbatim(map) => match map.get("priority")? {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
        }
    }

    /// Release the pin matches on, if any.
    pub fn release(&self) -> Option<&str> {
        match self {
            Self::Computed { release, .. } => Some(release),
            Self::Verbatim(map) => map.get("release").and_then(Value::as_str),
        }
    }
}

/// Fully resolved backports source.
///
/// `location`, `release` and `repos` are never empty, and at most one of
/// `key` and `keyring` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySourceSpec {
    pub name: String,
    pub location: String,
    pub repos: String,
    pub release: String,
    pub pin: PinSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<SigningKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyring: Option<String>,
}

impl RepositorySourceSpec {
    /// Serialize to pretty JSON for display or hand-off.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Components as a list.
    pub fn components(&self) -> Vec<&str> {
        self.repos.split_whitespace().collect()
    }
}
