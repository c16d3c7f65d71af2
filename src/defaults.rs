//! Built-in backports defaults per platform.
//!
//! Mirrors, components and archive keyrings live in one table keyed by
//! `Platform`, so the resolver never branches on distribution names.
//!
//! # Supported Platforms
//!
//! | Platform | Location | Repos | Keyring |
//! |----------|----------|-------|---------|
//! | Debian   | deb.debian.org | main contrib non-free | debian-archive-keyring |
//! | Ubuntu   | archive.ubuntu.com | main universe multiverse restricted | ubuntu-archive-keyring |
//!
//! Adding a derivative means adding a row to `BUILTIN_DEFAULTS`.

use crate::types::Platform;

/// Name of the APT source produced by the resolver.
pub const SOURCE_NAME: &str = "backports";

/// Suffix appended to the host codename to form the default release.
pub const RELEASE_SUFFIX: &str = "-backports";

/// Pin priority used when the caller does not supply one.
///
/// Sits between the 100 of a NotAutomatic archive and the 500 of the main release.
pub const DEFAULT_PIN_PRIORITY: i64 = 200;

/// Defaults for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDefaults {
    pub platform: Platform,
    /// Archive mirror URL
    pub location: &'static str,
    /// Space-separated component list
    pub repos: &'static str,
    /// Archive keyring shipped by the distribution
    pub keyring: &'static str,
}

pub const DEBIAN: PlatformDefaults = PlatformDefaults {
    platform: Platform::Debian,
    location: "http://deb.debian.org/debian",
    repos: "main contrib non-free",
    keyring: "/usr/share/keyrings/debian-archive-keyring.gpg",
};

pub const UBUNTU: PlatformDefaults = PlatformDefaults {
    platform: Platform::Ubuntu,
    location: "http://archive.ubuntu.com/ubuntu",
    repos: "main universe multiverse restricted",
    keyring: "/usr/share/keyrings/ubuntu-archive-keyring.gpg",
};

/// Platforms the resolver can fill in on its own.
pub const BUILTIN_DEFAULTS: &[PlatformDefaults] = &[DEBIAN, UBUNTU];

/// Find the defaults row for `platform` in `table`.
pub fn lookup(table: &[PlatformDefaults], platform: Platform) -> Option<&PlatformDefaults> {
    table.iter().find(|entry| entry.platform == platform)
}

/// Default backports release for a codename, e.g. `bookworm-backports`.
pub fn backports_release(codename: &str) -> String {
    format!("{}{}", codename, RELEASE_SUFFIX)
}
