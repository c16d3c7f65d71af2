//! Error types for backports resolution
//!
//! Every resolution failure is a `ResolutionError` variant rather than a
//! formatted string:
//!
//! - `Validation`: an override has the wrong shape
//! - `UnsupportedPlatform`: no built-in defaults and location, release or
//!   repos was not passed
//! - `UnknownCodename`: Debian or Ubuntu without a codename and without a
//!   release override, so `<codename>-backports` cannot be formed

use std::fmt;

use thiserror::Error;

use crate::types::OverrideField;

/// An override had the wrong shape (e.g. a boolean where a string was expected).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parameter '{field}' expects {expected}, got {found}")]
pub struct ValidationError {
    /// Offending parameter
    pub field: OverrideField,
    /// Human readable description of the accepted shapes
    pub expected: &'static str,
    /// JSON type (or detail) of the rejected value
    pub found: String,
}

/// Fields a platform without built-in defaults did not receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<OverrideField>);

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|field| field.to_string()).collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Main error type for backports resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// An override failed the shape check
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The platform has no defaults and the caller did not fill them in
    #[error(
        "If not on Debian or Ubuntu, you must explicitly pass location, release, and repos \
         (distribution '{distribution}' is missing: {missing})"
    )]
    UnsupportedPlatform {
        distribution: String,
        missing: MissingFields,
    },

    /// The default release needs a codename and the host reported none
    #[error(
        "cannot derive the backports release for '{distribution}': the host codename is unknown, \
         pass release explicitly"
    )]
    UnknownCodename { distribution: String },
}

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, ResolutionError>;

impl ResolutionError {
    /// Create a validation error for `field`
    pub fn validation(field: OverrideField, expected: &'static str, found: impl Into<String>) -> Self {
        Self::Validation(ValidationError {
            field,
            expected,
            found: found.into(),
        })
    }

    /// Create an unsupported-platform error
    pub fn unsupported_platform(distribution: impl Into<String>, missing: Vec<OverrideField>) -> Self {
        Self::UnsupportedPlatform {
            distribution: distribution.into(),
            missing: MissingFields(missing),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform { .. })
    }

    /// The override this error is about, when there is exactly one.
    pub fn field(&self) -> Option<OverrideField> {
        match self {
            Self::Validation(err) => Some(err.field),
            Self::UnknownCodename { .. } => Some(OverrideField::Release),
            Self::UnsupportedPlatform { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ResolutionError::validation(OverrideField::Location, "a String value", "Boolean");
        assert_eq!(
            err.to_string(),
            "parameter 'location' expects a String value, got Boolean"
        );
        assert!(err.is_validation());
        assert_eq!(err.field(), Some(OverrideField::Location));
    }

    #[test]
    fn test_unsupported_platform_display() {
        let err = ResolutionError::unsupported_platform(
            "LinuxMint",
            vec![OverrideField::Location, OverrideField::Repos],
        );
        let msg = err.to_string();
        assert!(msg.contains("If not on Debian or Ubuntu, you must explicitly pass location, release, and repos"));
        assert!(msg.contains("'LinuxMint' is missing: location, repos"));
        assert!(err.is_unsupported_platform());
        assert!(!err.is_validation());
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_unknown_codename_points_at_release() {
        let err = ResolutionError::UnknownCodename {
            distribution: "Debian".to_string(),
        };
        assert!(err.to_string().contains("pass release explicitly"));
        assert_eq!(err.field(), Some(OverrideField::Release));
    }
}
