//! Type-safe host and parameter types for the backports resolver
//!
//! Distribution names and override field names arrive as strings from facts
//! and config files. This module turns them into enums so the resolver can
//! match exhaustively instead of comparing strings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Operating system family as reported by the fact provider.
///
/// Anything that is not the Debian family collapses into `Other`; the
/// resolver never needs to tell RedHat from Suse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumIter)]
#[serde(from = "String", into = "String")]
pub enum OsFamily {
    #[default]
    #[strum(serialize = "Debian")]
    Debian,
    #[strum(serialize = "Other")]
    Other,
}

impl OsFamily {
    /// Returns true for the Debian family (Debian, Ubuntu and derivatives).
    pub fn is_debian(self) -> bool {
        matches!(self, Self::Debian)
    }
}

impl From<String> for OsFamily {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("debian") {
            Self::Debian
        } else {
            Self::Other
        }
    }
}

impl From<OsFamily> for String {
    fn from(value: OsFamily) -> Self {
        value.to_string()
    }
}

/// Distribution classification used to pick backports defaults.
///
/// Only `Debian` and `Ubuntu` have built-in defaults. The tracked
/// derivatives are named so logs and errors can mention them, but they
/// resolve exactly like `Other` unless a defaults entry is added for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    #[strum(serialize = "Debian")]
    Debian,
    #[strum(serialize = "Ubuntu")]
    Ubuntu,
    #[strum(serialize = "LinuxMint")]
    LinuxMint,
    #[strum(serialize = "Raspbian")]
    Raspbian,
    #[strum(serialize = "Other")]
    Other,
}

impl Platform {
    /// Classify a host from its family and distribution name.
    ///
    /// A non-Debian family is always `Other`, whatever the name says.
    pub fn classify(family: OsFamily, distribution: &str) -> Self {
        if !family.is_debian() {
            return Self::Other;
        }
        distribution.trim().parse().unwrap_or(Self::Other)
    }
}

/// The user-overridable backports parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OverrideField {
    Location,
    Release,
    Repos,
    Key,
    Pin,
}
