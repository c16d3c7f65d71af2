//! Host OS fact detection
//!
//! Produces the `OsFacts` the resolver consumes, either from an os-release(5)
//! file or from a JSON facts document.
//!
//! # Design
//!
//! - **Facts are plain data**: `OsFacts` is built once and passed by reference
//!   into resolution; nothing reads the host behind the resolver's back
//! - **Parsing is separate from I/O**: `parse_os_release` takes the file
//!   contents so it can be tested without a real `/etc/os-release`
//!
//! # Integration
//!
//! Call `OsFacts::detect()` on the target host, or load facts gathered
//! elsewhere with `OsFacts::load_from_file()`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::types::OsFamily;

/// Candidate os-release locations, in lookup order (see os-release(5)).
pub const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Release version of the host OS.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OsRelease {
    /// Major release, e.g. "11" on Debian or "22.04" on Ubuntu
    #[serde(default)]
    pub major: String,
    /// Full release, e.g. "11.8"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
}

/// Identity and release facts of the host OS.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OsFacts {
    /// OS family
    #[serde(default)]
    pub family: OsFamily,
    /// Distribution name, e.g. "Debian", "Ubuntu", "LinuxMint"
    pub name: String,
    /// Release codename, e.g. "bookworm"; empty when unknown
    #[serde(default)]
    pub codename: String,
    /// Release version
    #[serde(default)]
    pub release: OsRelease,
}

impl OsFacts {
    /// Facts for a Debian-family distribution with the given codename.
    pub fn new(name: impl Into<String>, codename: impl Into<String>) -> Self {
        Self {
            family: OsFamily::Debian,
            name: name.into(),
            codename: codename.into(),
            release: OsRelease::default(),
        }
    }

    /// Replace the OS family.
    pub fn with_family(mut self, family: OsFamily) -> Self {
        self.family = family;
        self
    }

    /// Set the release version.
    pub fn with_release(mut self, major: impl Into<String>, full: Option<String>) -> Self {
        self.release = OsRelease {
            major: major.into(),
            full,
        };
        self
    }

    /// Detect facts from the first readable os-release file.
    pub fn detect() -> Result<Self> {
        let path = OS_RELEASE_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .with_context(|| format!("No os-release file found (tried {})", OS_RELEASE_PATHS.join(", ")))?;

        let facts = Self::from_os_release_file(path)?;
        tracing::info!("Detected host: {}", facts);
        Ok(facts)
    }

    /// Read and parse an os-release file.
    pub fn from_os_release_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read os-release from {:?}", path.as_ref()))?;
        Ok(Self::parse_os_release(&content))
    }

    /// Load facts from a JSON document.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read facts from {:?}", path.as_ref()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse facts JSON in {:?}", path.as_ref()))
    }

    /// Build facts from os-release(5) contents.
    ///
    /// Never fails: missing keys leave the matching fact empty, and the
    /// resolver decides whether that is acceptable.
    pub fn parse_os_release(content: &str) -> Self {
        let fields = parse_os_release_fields(content);
        let get = |key: &str| fields.get(key).map(String::as_str).unwrap_or("");

        let id = get("ID").to_ascii_lowercase();
        let id_like = get("ID_LIKE").to_ascii_lowercase();

        let family = if id == "debian"
            || id_like
                .split_whitespace()
                .any(|like| like == "debian" || like == "ubuntu")
        {
            OsFamily::Debian
        } else {
            OsFamily::Other
        };

        let name = match canonical_distribution_name(&id) {
            Some(name) => name.to_string(),
            None if !get("NAME").is_empty() => get("NAME").to_string(),
            None => get("ID").to_string(),
        };

        let codename = [get("VERSION_CODENAME"), get("UBUNTU_CODENAME")]
            .into_iter()
            .find(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| codename_from_version(get("VERSION")))
            .unwrap_or_default();

        let full = get("VERSION_ID");
        let major = if id == "ubuntu" {
            full.to_string()
        } else {
            full.split('.').next().unwrap_or("").to_string()
        };

        Self {
            family,
            name,
            codename,
            release: OsRelease {
                major,
                full: (!full.is_empty()).then(|| full.to_string()),
            },
        }
    }
}

impl fmt::Display for OsFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codename = if self.codename.is_empty() {
            "unknown"
        } else {
            self.codename.as_str()
        };
        write!(
            f,
            "{} (family {}, release {}, codename {})",
            self.name, self.family, self.release.major, codename
        )
    }
}

// ============================================================================
// os-release parsing
// ============================================================================

/// Split os-release contents into `KEY => value`, unquoting values.
fn parse_os_release_fields(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), unquote(value.trim())))
        .collect()
}

fn unquote(value: &str) -> String {
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')));

    match stripped {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}

/// Map an os-release `ID` to the distribution name facts use.
fn canonical_distribution_name(id: &str) -> Option<&'static str> {
    match id {
        "debian" => Some("Debian"),
        "ubuntu" => Some("Ubuntu"),
        "linuxmint" => Some("LinuxMint"),
        "raspbian" => Some("Raspbian"),
        _ => None,
    }
}

/// Older os-release files only carry the codename inside VERSION,
/// e.g. `9 (stretch)` or `16.04.7 LTS (Xenial Xerus)`.
fn codename_from_version(version: &str) -> Option<String> {
    let start = version.find('(')?;
    let end = version[start..].find(')')? + start;
    let word = version[start + 1..end].split_whitespace().next()?;
    Some(word.to_ascii_lowercase())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DEBIAN_BOOKWORM: &str = r#"PRETTY_NAME="Debian GNU/Linux 12 (bookworm)"
NAME="Debian GNU/Linux"
VERSION_ID="12"
VERSION="12 (bookworm)"
VERSION_CODENAME=bookworm
ID=debian
HOME_URL="https://www.debian.org/"
"#;

    const UBUNTU_JAMMY: &str = r#"PRETTY_NAME="Ubuntu 22.04.3 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
VERSION="22.04.3 LTS (Jammy Jellyfish)"
VERSION_CODENAME=jammy
ID=ubuntu
ID_LIKE=debian
UBUNTU_CODENAME=jammy
"#;

    const MINT_VIRGINIA: &str = r#"NAME="Linux Mint"
VERSION="21.3 (Virginia)"
ID=linuxmint
ID_LIKE="ubuntu debian"
VERSION_ID="21.3"
VERSION_CODENAME=virginia
UBUNTU_CODENAME=jammy
"#;

    const FEDORA: &str = r#"NAME="Fedora Linux"
VERSION="39 (Workstation Edition)"
ID=fedora
VERSION_ID=39
"#;

    #[test]
    fn test_parse_debian() {
        let facts = OsFacts::parse_os_release(DEBIAN_BOOKWORM);
        assert_eq!(facts.family, OsFamily::Debian);
        assert_eq!(facts.name, "Debian");
        assert_eq!(facts.codename, "bookworm");
        assert_eq!(facts.release.major, "12");
        assert_eq!(facts.release.full.as_deref(), Some("12"));
    }

    #[test]
    fn test_parse_ubuntu_keeps_full_major() {
        let facts = OsFacts::parse_os_release(UBUNTU_JAMMY);
        assert_eq!(facts.name, "Ubuntu");
        assert_eq!(facts.codename, "jammy");
        assert_eq!(facts.release.major, "22.04");
    }

    #[test]
    fn test_parse_mint_prefers_own_codename() {
        let facts = OsFacts::parse_os_release(MINT_VIRGINIA);
        assert_eq!(facts.family, OsFamily::Debian);
        assert_eq!(facts.name, "LinuxMint");
        assert_eq!(facts.codename, "virginia");
        assert_eq!(facts.release.major, "21");
    }

    #[test]
    fn test_parse_non_debian_family() {
        let facts = OsFacts::parse_os_release(FEDORA);
        assert_eq!(facts.family, OsFamily::Other);
        assert_eq!(facts.name, "Fedora Linux");
    }

    #[test]
    fn test_codename_from_version_fallback() {
        let facts = OsFacts::parse_os_release("ID=debian\nVERSION=\"9 (stretch)\"\nVERSION_ID=\"9\"\n");
        assert_eq!(facts.codename, "stretch");
        assert_eq!(codename_from_version("16.04.7 LTS (Xenial Xerus)").as_deref(), Some("xenial"));
        assert_eq!(codename_from_version("rolling"), None);
    }

    #[test]
    fn test_parse_empty_content() {
        let facts = OsFacts::parse_os_release("");
        assert_eq!(facts.family, OsFamily::Other);
        assert!(facts.name.is_empty());
        assert!(facts.codename.is_empty());
        assert_eq!(facts.release.full, None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"Debian GNU/Linux\""), "Debian GNU/Linux");
        assert_eq!(unquote("'single'"), "single");
        assert_eq!(unquote("bare"), "bare");
        assert_eq!(unquote("\"say \\\"hi\\\"\""), "say \"hi\"");
    }

    #[test]
    fn test_facts_display() {
        let facts = OsFacts::new("Debian", "").with_release("12", None);
        assert_eq!(facts.to_string(), "Debian (family Debian, release 12, codename unknown)");
    }

    #[test]
    fn test_facts_json_defaults() {
        let facts: OsFacts = serde_json::from_str(r#"{"name": "Ubuntu", "codename": "noble"}"#).unwrap();
        assert_eq!(facts.family, OsFamily::Debian);
        assert_eq!(facts.release, OsRelease::default());
    }
}
