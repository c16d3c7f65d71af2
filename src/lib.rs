//! apt-backports Library
//!
//! Resolves the APT backports source for a Debian-family host from its OS
//! facts and optional user overrides.

pub mod applier;
pub mod cli;
pub mod config_file;
pub mod defaults;
pub mod error;
pub mod facts;
pub mod logic;
pub mod overrides;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use applier::{PreviewApplier, SourceApplier};
pub use config_file::BackportsConfig;
pub use defaults::{PlatformDefaults, BUILTIN_DEFAULTS};
pub use error::{ResolutionError, ValidationError};
pub use facts::{OsFacts, OsRelease};
pub use logic::resolver::{resolve, BackportsResolver};
pub use overrides::Overrides;
pub use source::{PinSpec, RepositorySourceSpec, SigningKey};
pub use types::{OsFamily, OverrideField, Platform};
