//! Ambient runtime environment, read once at startup.

use anyhow::{Context, Result};
use serde::Deserialize;

/// `GITHUB_*` variables set by the Actions runtime.
///
/// Each field maps to `GITHUB_<FIELD>`. Values also reachable through a CLI
/// flag are resolved by clap; this covers the ones that are not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeEnv {
    /// Path of the step output file.
    pub output: Option<String>,
}

impl RuntimeEnv {
    /// # Errors
    ///
    /// Returns an error if a `GITHUB_*` variable cannot be decoded.
    pub fn load() -> Result<Self> {
        envy::prefixed("GITHUB_")
            .from_env()
            .context("failed to read GITHUB_* environment")
    }

    /// Load from explicit pairs instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be decoded.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("GITHUB_")
            .from_iter(pairs)
            .context("failed to read GITHUB_* environment")
    }
}
