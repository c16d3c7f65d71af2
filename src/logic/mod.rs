//! Logic modules: translate host facts and user overrides into sources.
//!
//! # Modules
//!
//! - `resolver`: backports source resolution

pub mod resolver;
