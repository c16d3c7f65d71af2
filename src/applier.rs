//! Hand-off of resolved sources to whatever writes APT configuration.
//!
//! The resolver stops at a `RepositorySourceSpec`. Writing
//! `sources.list.d` entries, pin files and keys belongs to an applier
//! implementing `SourceApplier`.
//!
//! # Contract
//!
//! - `apply()` is called exactly once per resolved spec.
//! - The source is already validated; appliers must not re-derive defaults.
//!
//! `PreviewApplier` renders what an applier would write, without touching
//! the filesystem.

use anyhow::{Context, Result};
use std::io::Write;

use crate::source::{PinSpec, RepositorySourceSpec};

/// Receiver of a resolved backports source.
pub trait SourceApplier {
    /// Apply (or record) the source.
    fn apply(&mut self, spec: &RepositorySourceSpec) -> Result<()>;
}

/// Path of the sources entry for `spec`, relative to `/etc/apt`.
pub fn sources_path(spec: &RepositorySourceSpec) -> String {
    format!("sources.list.d/{}.list", spec.name)
}

/// Path of the preferences file for `spec`, relative to `/etc/apt`.
pub fn preferences_path(spec: &RepositorySourceSpec) -> String {
    format!("preferences.d/{}.pref", spec.name)
}

/// One-line `deb` entry for the source.
pub fn render_sources_entry(spec: &RepositorySourceSpec) -> String {
    let mut out = String::from("# This file is managed by apt-backports. DO NOT EDIT.\n");
    out.push_str(&format!("# {}\n", spec.name));
    if let Some(id) = spec.key.as_ref().and_then(|k| k.id()) {
        out.push_str(&format!("# signing key: {}\n", id));
    }

    let options = match &spec.keyring {
        Some(keyring) => format!("[signed-by={}] ", keyring),
        None => String::new(),
    };
    out.push_str(&format!(
        "deb {}{} {} {}\n",
        options,
        spec.location,
        spec.release,
        spec.components().join(" ")
    ));
    out
}

/// Preferences stanza pinning the source.
pub fn render_pin_preferences(spec: &RepositorySourceSpec) -> String {
    let pin_line = match spec.pin.release() {
        Some(release) => format!("release a={}", release),
        None => format!("origin {}", origin_host(&spec.location)),
    };
    let priority = spec.pin.priority_text().unwrap_or_else(|| "0".to_string());

    let explanation = match &spec.pin {
        PinSpec::Verbatim(map) => map.get("explanation").and_then(|v| v.as_str()),
        PinSpec::Computed { .. } => None,
    }
    .unwrap_or(spec.name.as_str());

    let mut out = format!("Explanation: {}\n", explanation);
    out.push_str("Package: *\n");
    out.push_str(&format!("Pin: {}\n", pin_line));
    out.push_str(&format!("Pin-Priority: {}\n", priority));
    out
}

/// Host name of a mirror URL, for origin pins. APT matches origins on the
/// host alone, so user info and port are dropped.
fn origin_host(location: &str) -> &str {
    let without_scheme = location
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(location);
    let authority = without_scheme.split('/').next().unwrap_or(without_scheme);
    let host_port = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);

    if host_port.starts_with('[') {
        // IPv6 literal: keep the brackets, drop anything after them
        return host_port
            .find(']')
            .map(|end| &host_port[..=end])
            .unwrap_or(host_port);
    }
    host_port.split(':').next().unwrap_or(host_port)
}

/// Applier that writes the would-be file contents to a writer.
pub struct PreviewApplier<W: Write> {
    out: W,
}

impl<W: Write> PreviewApplier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_preview(&mut self, spec: &RepositorySourceSpec) -> std::io::Result<()> {
        writeln!(self.out, "==> /etc/apt/{}", sources_path(spec))?;
        write!(self.out, "{}", render_sources_entry(spec))?;
        writeln!(self.out)?;
        writeln!(self.out, "==> /etc/apt/{}", preferences_path(spec))?;
        write!(self.out, "{}", render_pin_preferences(spec))?;
        self.out.flush()
    }
}

impl<W: Write> SourceApplier for PreviewApplier<W> {
    fn apply(&mut self, spec: &RepositorySourceSpec) -> Result<()> {
        tracing::debug!("Previewing source '{}'", spec.name);
        self.write_preview(spec)
            .context("Failed to write source preview")
    }
}
