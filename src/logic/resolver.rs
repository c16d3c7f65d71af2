//! Backports source resolver
//!
//! Translates host facts plus optional overrides into a fully specified
//! `RepositorySourceSpec`.
//!
//! # Design
//!
//! - **Table-driven defaults**: mirrors, components and keyrings come from
//!   `defaults::BUILTIN_DEFAULTS`, looked up by `Platform`
//! - **Shape checks first**: overrides are validated before the host is looked at
//! - **Pure logic**: No I/O, no side effects; identical inputs give identical specs
//!
//! # Resolution Rules
//!
//! | Field      | Resolved To |
//! |------------|-------------|
//! | `location` | Override, else platform mirror |
//! | `repos`    | Override, else platform components |
//! | `release`  | Override, else `<codename>-backports` |
//! | `pin`      | Map verbatim; scalar or default 200 pinned to the release |
//! | `key`      | Override verbatim |
//! | `keyring`  | Platform archive keyring, only when no key is given |

use crate::defaults::{self, PlatformDefaults, BUILTIN_DEFAULTS, DEFAULT_PIN_PRIORITY, SOURCE_NAME};
use crate::error::{ResolutionError, Result};
use crate::facts::OsFacts;
use crate::overrides::{Overrides, PinOverride};
use crate::source::{PinSpec, RepositorySourceSpec};
use crate::types::{OverrideField, Platform};

/// Resolves backports sources against an explicit defaults table.
///
/// `BackportsResolver::default()` uses the built-in Debian and Ubuntu rows.
/// A custom table can add rows for derivatives.
#[derive(Debug, Clone, Copy)]
pub struct BackportsResolver<'a> {
    table: &'a [PlatformDefaults],
    default_pin_priority: i64,
}

impl Default for BackportsResolver<'static> {
    fn default() -> Self {
        Self::new(BUILTIN_DEFAULTS)
    }
}

impl<'a> BackportsResolver<'a> {
    pub fn new(table: &'a [PlatformDefaults]) -> Self {
        Self {
            table,
            default_pin_priority: DEFAULT_PIN_PRIORITY,
        }
    }

    /// Use a different priority when the caller gives no pin.
    pub fn with_default_pin_priority(mut self, priority: i64) -> Self {
        self.default_pin_priority = priority;
        self
    }

    /// Resolve the backports source for `facts`.
    ///
    /// # Errors
    ///
    /// - `Validation` if an override has the wrong shape (checked first, on every platform)
    /// - `UnsupportedPlatform` if the platform has no defaults row and any of
    ///   location, release or repos is missing
    /// - `UnknownCodename` if the release must be derived but the host has no codename
    pub fn resolve(&self, facts: &OsFacts, overrides: &Overrides) -> Result<RepositorySourceSpec> {
        // 1. Shape checks, before anything host-specific
        let overrides = overrides.validate()?;

        // 2. Classification
        let platform = Platform::classify(facts.family, &facts.name);
        let defaults = defaults::lookup(self.table, platform);
        tracing::debug!(
            "Classified '{}' as {} ({} defaults)",
            facts.name,
            platform,
            if defaults.is_some() { "with" } else { "without" }
        );

        // 3-4. Location, release, repos
        let (location, release, repos) = match defaults {
            Some(d) => {
                let release = match overrides.release {
                    Some(release) => release,
                    None if facts.codename.trim().is_empty() => {
                        return Err(ResolutionError::UnknownCodename {
                            distribution: facts.name.clone(),
                        });
                    }
                    None => defaults::backports_release(facts.codename.trim()),
                };
                (
                    overrides.location.unwrap_or_else(|| d.location.to_string()),
                    release,
                    overrides.repos.unwrap_or_else(|| d.repos.to_string()),
                )
            }
            None => match (overrides.location, overrides.release, overrides.repos) {
                (Some(location), Some(release), Some(repos)) => (location, release, repos),
                (location, release, repos) => {
                    let missing: Vec<OverrideField> = [
                        (OverrideField::Location, location.is_none()),
                        (OverrideField::Release, release.is_none()),
                        (OverrideField::Repos, repos.is_none()),
                    ]
                    .into_iter()
                    .filter_map(|(field, is_missing)| is_missing.then_some(field))
                    .collect();
                    return Err(ResolutionError::unsupported_platform(&facts.name, missing));
                }
            },
        };

        // 5. Pin
        let pin = match overrides.pin {
            Some(PinOverride::Record(map)) => PinSpec::Verbatim(map),
            Some(PinOverride::Priority(priority)) => PinSpec::Computed {
                priority,
                release: release.clone(),
            },
            None => PinSpec::Computed {
                priority: self.default_pin_priority,
                release: release.clone(),
            },
        };

        // 6. Key or keyring, never both
        let key = overrides.key;
        let keyring = match (&key, defaults) {
            (None, Some(d)) => Some(d.keyring.to_string()),
            _ => None,
        };

        tracing::debug!("Resolved backports: {} {} {}", location, release, repos);

        Ok(RepositorySourceSpec {
            name: SOURCE_NAME.to_string(),
            location,
            repos,
            release,
            pin,
            key,
            keyring,
        })
    }
}

/// Resolve the backports source with the built-in defaults table.
pub fn resolve(facts: &OsFacts, overrides: &Overrides) -> Result<RepositorySourceSpec> {
    BackportsResolver::default().resolve(facts, overrides)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SigningKey;
    use crate::types::OsFamily;
    use serde_json::json;

    fn debian() -> OsFacts {
        OsFacts::new("Debian", "bookworm").with_release("12", Some("12.5".to_string()))
    }

    fn ubuntu() -> OsFacts {
        OsFacts::new("Ubuntu", "noble").with_release("24.04", None)
    }

    fn mint() -> OsFacts {
        OsFacts::new("LinuxMint", "virginia").with_release("21", None)
    }

    fn mint_overrides() -> Overrides {
        Overrides::new()
            .with_location("http://archive.ubuntu.com/ubuntu")
            .with_release("jammy-backports")
            .with_repos("main universe")
    }

    #[test]
    fn test_debian_defaults() {
        let spec = resolve(&debian(), &Overrides::new()).unwrap();
        assert_eq!(spec.name, "backports");
        assert_eq!(spec.location, "http://deb.debian.org/debian");
        assert_eq!(spec.repos, "main contrib non-free");
        assert_eq!(spec.release, "bookworm-backports");
        assert_eq!(
            spec.pin,
            PinSpec::Computed {
                priority: 200,
                release: "bookworm-backports".to_string()
            }
        );
        assert_eq!(
            spec.keyring.as_deref(),
            Some("/usr/share/keyrings/debian-archive-keyring.gpg")
        );
        assert!(spec.key.is_none());
    }

    #[test]
    fn test_ubuntu_defaults() {
        let spec = resolve(&ubuntu(), &Overrides::new()).unwrap();
        assert_eq!(spec.location, "http://archive.ubuntu.com/ubuntu");
        assert_eq!(spec.repos, "main universe multiverse restricted");
        assert_eq!(spec.release, "noble-backports");
        assert_eq!(
            spec.keyring.as_deref(),
            Some("/usr/share/keyrings/ubuntu-archive-keyring.gpg")
        );
    }

    #[test]
    fn test_single_override_keeps_other_defaults() {
        let overrides = Overrides::new().with_repos("main");
        let spec = resolve(&debian(), &overrides).unwrap();
        assert_eq!(spec.repos, "main");
        assert_eq!(spec.location, "http://deb.debian.org/debian");
        assert_eq!(spec.release, "bookworm-backports");
    }

    #[test]
    fn test_release_override_moves_default_pin() {
        let overrides = Overrides::new().with_release("bookworm-backports-sloppy");
        let spec = resolve(&debian(), &overrides).unwrap();
        assert_eq!(spec.pin.release(), Some("bookworm-backports-sloppy"));
    }

    #[test]
    fn test_key_suppresses_keyring() {
        let overrides = Overrides::new().with_key("A1BD8E9D78F7FE5C3E65D8AF8B48AD6246925553");
        let spec = resolve(&ubuntu(), &overrides).unwrap();
        assert_eq!(
            spec.key,
            Some(SigningKey::Id("A1BD8E9D78F7FE5C3E65D8AF8B48AD6246925553".to_string()))
        );
        assert!(spec.keyring.is_none());
    }

    #[test]
    fn test_scalar_pin_gets_release() {
        let overrides = Overrides::new().with_pin(500);
        let spec = resolve(&debian(), &overrides).unwrap();
        assert_eq!(
            spec.pin,
            PinSpec::Computed {
                priority: 500,
                release: "bookworm-backports".to_string()
            }
        );
    }

    #[test]
    fn test_map_pin_is_not_given_a_release() {
        let overrides = Overrides::new().with_pin(json!({"priority": 90}));
        let spec = resolve(&debian(), &overrides).unwrap();
        assert_eq!(serde_json::to_value(&spec.pin).unwrap(), json!({"priority": 90}));
        assert_eq!(spec.pin.release(), None);
    }

    #[test]
    fn test_derivative_with_all_fields() {
        let spec = resolve(&mint(), &mint_overrides()).unwrap();
        assert_eq!(spec.location, "http://archive.ubuntu.com/ubuntu");
        assert_eq!(spec.release, "jammy-backports");
        assert_eq!(spec.repos, "main universe");
        assert_eq!(spec.pin.release(), Some("jammy-backports"));
        assert!(spec.keyring.is_none());
    }

    #[test]
    fn test_derivative_missing_fields_are_listed() {
        let overrides = Overrides::new().with_release("jammy-backports");
        let err = resolve(&mint(), &overrides).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::unsupported_platform(
                "LinuxMint",
                vec![OverrideField::Location, OverrideField::Repos]
            )
        );
    }

    #[test]
    fn test_blank_override_counts_as_missing_on_derivative() {
        let overrides = mint_overrides().with_repos("  ");
        let err = resolve(&mint(), &overrides).unwrap_err();
        assert!(err.is_unsupported_platform());
    }

    #[test]
    fn test_non_debian_family_never_gets_defaults() {
        let facts = OsFacts::new("Debian", "bookworm").with_family(OsFamily::Other);
        let err = resolve(&facts, &Overrides::new()).unwrap_err();
        assert!(err.is_unsupported_platform());
    }

    #[test]
    fn test_validation_runs_before_platform_check() {
        let overrides = Overrides::new().with_pin(true);
        let err = resolve(&mint(), &overrides).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_unknown_codename_needs_release() {
        let facts = OsFacts::new("Debian", "");
        let err = resolve(&facts, &Overrides::new()).unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownCodename { .. }));

        let overrides = Overrides::new().with_release("sid-backports");
        let spec = resolve(&facts, &overrides).unwrap();
        assert_eq!(spec.release, "sid-backports");
    }

    #[test]
    fn test_custom_table_adds_derivative() {
        let mint_row = PlatformDefaults {
            platform: Platform::LinuxMint,
            location: "http://packages.linuxmint.com",
            repos: "main upstream import backport",
            keyring: "/usr/share/keyrings/linuxmint-keyring.gpg",
        };
        let table = [defaults::DEBIAN, defaults::UBUNTU, mint_row];
        let resolver = BackportsResolver::new(&table).with_default_pin_priority(100);

        let spec = resolver.resolve(&mint(), &Overrides::new()).unwrap();
        assert_eq!(spec.location, "http://packages.linuxmint.com");
        assert_eq!(spec.release, "virginia-backports");
        assert_eq!(spec.pin.priority_text().as_deref(), Some("100"));
        assert_eq!(spec.keyring.as_deref(), Some("/usr/share/keyrings/linuxmint-keyring.gpg"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let overrides = Overrides::new().with_pin("90").with_key(json!({"id": "ABCD"}));
        let first = resolve(&ubuntu(), &overrides).unwrap();
        let second = resolve(&ubuntu(), &overrides).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }
}
