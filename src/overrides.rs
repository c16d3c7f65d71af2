//! User-supplied backports overrides and their shape checks.
//!
//! Overrides come from config files and callers as loosely-typed JSON so that
//! a wrong shape (a boolean `location`, a list `pin`) reaches the resolver and
//! is reported as a `ValidationError` naming the field, instead of surfacing
//! as a generic deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ResolutionError, Result};
use crate::source::SigningKey;
use crate::types::OverrideField;

const EXPECT_STRING: &str = "a String value";
const EXPECT_KEY: &str = "a String or Hash value";
const EXPECT_PIN: &str = "an Integer, a numeric String, or a Hash with a priority";

/// Optional overrides for the backports source. `None` (or JSON `null`)
/// means "infer from the host".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repos: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, value: impl Into<Value>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn with_release(mut self, value: impl Into<Value>) -> Self {
        self.release = Some(value.into());
        self
    }

    pub fn with_repos(mut self, value: impl Into<Value>) -> Self {
        self.repos = Some(value.into());
        self
    }

    pub fn with_key(mut self, value: impl Into<Value>) -> Self {
        self.key = Some(value.into());
        self
    }

    pub fn with_pin(mut self, value: impl Into<Value>) -> Self {
        self.pin = Some(value.into());
        self
    }

    /// Layer `top` over `self`; every field set in `top` wins.
    pub fn overlay(self, top: Overrides) -> Overrides {
        Overrides {
            location: top.location.or(self.location),
            release: top.release.or(self.release),
            repos: top.repos.or(self.repos),
            key: top.key.or(self.key),
            pin: top.pin.or(self.pin),
        }
    }

    /// True when no override is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check every present override against its accepted shape.
    ///
    /// Fields are checked in declaration order and the first mismatch is
    /// returned. Strings are kept exactly as given; a blank location,
    /// release or repos counts as "not supplied", a blank key does not.
    pub fn validate(&self) -> Result<ValidatedOverrides> {
        Ok(ValidatedOverrides {
            location: string_field(OverrideField::Location, self.location.as_ref())?,
            release: string_field(OverrideField::Release, self.release.as_ref())?,
            repos: string_field(OverrideField::Repos, self.repos.as_ref())?,
            key: key_field(self.key.as_ref())?,
            pin: pin_field(self.pin.as_ref())?,
        })
    }
}

/// Pin override after shape checks.
#[derive(Debug, Clone, PartialEq)]
pub enum PinOverride {
    /// Bare priority; the release is filled in by the resolver
    Priority(i64),
    /// Full pin map, used verbatim
    Record(Map<String, Value>),
}

/// Overrides with their shapes checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedOverrides {
    pub location: Option<String>,
    pub release: Option<String>,
    pub repos: Option<String>,
    pub key: Option<SigningKey>,
    pub pin: Option<PinOverride>,
}

// ============================================================================
// Shape checks
// ============================================================================

/// Puppet-style type name of a JSON value, used in error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Undef",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "Integer",
        Value::Number(_) => "Float",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Hash",
    }
}

fn string_field(field: OverrideField, value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ResolutionError::validation(field, EXPECT_STRING, type_name(other))),
    }
}

fn key_field(value: Option<&Value>) -> Result<Option<SigningKey>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(SigningKey::Id(s.clone()))),
        Some(Value::Object(map)) => Ok(Some(SigningKey::Record(map.clone()))),
        Some(other) => Err(ResolutionError::validation(
            OverrideField::Key,
            EXPECT_KEY,
            type_name(other),
        )),
    }
}

fn invalid_pin(found: String) -> ResolutionError {
    ResolutionError::validation(OverrideField::Pin, EXPECT_PIN, found)
}

/// Integer priority from a JSON number or numeric string; on failure, a
/// description of what was found.
fn pin_priority(value: &Value) -> std::result::Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("out-of-range or fractional number {}", n)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("non-numeric String '{}'", s)),
        other => Err(type_name(other).to_string()),
    }
}

fn pin_field(value: Option<&Value>) -> Result<Option<PinOverride>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(scalar @ (Value::Number(_) | Value::String(_))) => pin_priority(scalar)
            .map(|p| Some(PinOverride::Priority(p)))
            .map_err(invalid_pin),
        Some(Value::Object(map)) => {
            let priority = map
                .get("priority")
                .ok_or_else(|| invalid_pin("Hash without priority".to_string()))?;
            pin_priority(priority)
                .map_err(|found| invalid_pin(format!("Hash with priority {}", found)))?;

            match map.get("release") {
                None | Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(invalid_pin(format!("Hash with {} release", type_name(other))));
                }
            }
            Ok(Some(PinOverride::Record(map.clone())))
        }
        Some(other) => Err(invalid_pin(type_name(other).to_string())),
    }
}
