//! Configuration file handling for backports settings.
//!
//! A config file carries the overrides for one host and, optionally, the
//! facts to resolve them against (for preparing a host from elsewhere).
//!
//! ```json
//! {
//!   "facts": { "family": "Debian", "name": "Debian", "codename": "bookworm" },
//!   "backports": { "pin": 500, "key": { "id": "A1BD8E9D" } }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::facts::OsFacts;
use crate::logic::resolver;
use crate::overrides::Overrides;
use crate::source::RepositorySourceSpec;

/// Backports configuration that can be saved/loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackportsConfig {
    /// Facts to resolve against instead of detecting the local host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<OsFacts>,
    /// Overrides for the backports source
    #[serde(default)]
    pub backports: Overrides,
}

impl BackportsConfig {
    /// Create an empty configuration (detect facts, infer everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        tracing::debug!("Loaded configuration from {:?}", path.as_ref());
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks override shapes; when the file carries facts, also resolves
    /// against them so platform errors surface here too.
    pub fn validate(&self) -> Result<()> {
        self.backports.validate()?;

        if let Some(facts) = &self.facts {
            self.resolve_with(facts)?;
        }

        Ok(())
    }

    /// Resolve the configured overrides against `facts`
    pub fn resolve_with(&self, facts: &OsFacts) -> Result<RepositorySourceSpec> {
        resolver::resolve(facts, &self.backports)
            .with_context(|| format!("Failed to resolve backports for {}", facts))
    }
}
