//! `OutputSink` implementations: the Actions step output file, or stdout.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::OutputSink;

fn ensure_single_line(name: &str, value: &str) -> Result<()> {
    if value.contains('\n') {
        anyhow::bail!("output '{name}' must be a single line");
    }
    Ok(())
}

/// Appends `name=value` lines to the file named by `GITHUB_OUTPUT`.
#[derive(Debug, Clone)]
pub struct GithubOutputFile {
    path: PathBuf,
}

impl GithubOutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for GithubOutputFile {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        ensure_single_line(name, value)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        writeln!(file, "{name}={value}")
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

/// Prints `name=value` lines to stdout when no output file is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutOutputs;

impl OutputSink for StdoutOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        ensure_single_line(name, value)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{name}={value}").context("writing to stdout")
    }
}
