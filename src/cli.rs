use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config_file::BackportsConfig;
use crate::facts::OsFacts;
use crate::overrides::Overrides;
use crate::types::OsFamily;

/// apt-backports - resolve the APT backports source for this host
#[derive(Parser)]
#[command(name = "apt-backports")]
#[command(about = "Resolve and preview the APT backports source for Debian and Ubuntu hosts")]
#[command(version)]
pub struct Cli {
    /// Log resolution decisions to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the facts detected from os-release as JSON
    Detect {
        /// os-release file to read (default: /etc/os-release, then /usr/lib/os-release)
        #[arg(long)]
        os_release: Option<PathBuf>,
    },
    /// Resolve the backports source and print it as JSON
    Resolve {
        #[command(flatten)]
        args: ResolveArgs,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Show the sources entry and pin file the resolved source would produce
    Preview {
        #[command(flatten)]
        args: ResolveArgs,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
}

/// Inputs shared by `resolve` and `preview`.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Configuration file with facts and overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub facts: FactArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Where the host facts come from.
#[derive(Args, Debug, Clone, Default)]
pub struct FactArgs {
    /// Read facts from a JSON file
    #[arg(long, conflicts_with = "distribution")]
    pub facts: Option<PathBuf>,

    /// os-release file to detect facts from
    #[arg(long, conflicts_with_all = ["facts", "distribution"])]
    pub os_release: Option<PathBuf>,

    /// Distribution name (e.g. Debian, Ubuntu, LinuxMint); skips detection
    #[arg(long)]
    pub distribution: Option<String>,

    /// Release codename, used with --distribution
    #[arg(long, requires = "distribution")]
    pub codename: Option<String>,

    /// OS family, used with --distribution [default: Debian]
    #[arg(long, requires = "distribution")]
    pub family: Option<String>,

    /// Major release, used with --distribution
    #[arg(long, requires = "distribution")]
    pub release_major: Option<String>,
}

/// Backports overrides given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Archive mirror URL
    #[arg(long)]
    pub location: Option<String>,

    /// Suite, e.g. bookworm-backports
    #[arg(long)]
    pub release: Option<String>,

    /// Space-separated components
    #[arg(long)]
    pub repos: Option<String>,

    /// Signing key id
    #[arg(long)]
    pub key: Option<String>,

    /// Pin priority
    #[arg(long, allow_hyphen_values = true)]
    pub pin: Option<String>,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> Overrides {
        Overrides {
            location: self.location.clone().map(Into::into),
            release: self.release.clone().map(Into::into),
            repos: self.repos.clone().map(Into::into),
            key: self.key.clone().map(Into::into),
            pin: self.pin.clone().map(Into::into),
        }
    }
}

impl ResolveArgs {
    /// Gather facts and overrides from flags, files and the host.
    ///
    /// Facts, first match wins: `--distribution`, `--facts`, `--os-release`,
    /// config `facts`, then the detected os-release.
    /// Overrides: flags layered over the config file.
    pub fn load_inputs(&self) -> Result<(OsFacts, Overrides)> {
        let config = match &self.config {
            Some(path) => BackportsConfig::load_from_file(path)?,
            None => BackportsConfig::new(),
        };

        let facts = if let Some(name) = &self.facts.distribution {
            OsFacts::new(name.clone(), self.facts.codename.clone().unwrap_or_default())
                .with_family(
                    self.facts
                        .family
                        .clone()
                        .map(OsFamily::from)
                        .unwrap_or_default(),
                )
                .with_release(self.facts.release_major.clone().unwrap_or_default(), None)
        } else if let Some(path) = &self.facts.facts {
            OsFacts::load_from_file(path)?
        } else if let Some(path) = &self.facts.os_release {
            OsFacts::from_os_release_file(path)?
        } else if let Some(facts) = config.facts.clone() {
            facts
        } else {
            OsFacts::detect()?
        };

        let overrides = config.backports.overlay(self.overrides.to_overrides());
        Ok((facts, overrides))
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
