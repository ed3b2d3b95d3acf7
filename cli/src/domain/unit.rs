//! Unit-of-work types and pure helpers.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use runner_common::{ImageFilter, ResourceTag};

use crate::domain::error::ConfigError;

/// Identity rule for batch units. The identity prefixes the runner label, so
/// it must stay within characters GitHub accepts in labels.
pub static UNIT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_-]{1,32}$").expect("valid regex")
});

/// Identity of one unit within a batch. Empty for a non-batch invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(String);

impl UnitId {
    /// The identity of the only unit of a non-batch invocation.
    #[must_use]
    pub fn single() -> Self {
        Self(String::new())
    }

    /// Parse a batch unit identity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUnitId`] if `raw` does not match [`UNIT_ID_RE`].
    pub fn parse(raw: &str) -> Result<Self> {
        if !UNIT_ID_RE.is_match(raw) {
            return Err(ConfigError::InvalidUnitId(raw.to_string()).into());
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.0.is_empty()
    }

    /// Log prefix for messages about this unit: `"[a] "`, or empty.
    #[must_use]
    pub fn log_prefix(&self) -> String {
        if self.is_single() {
            String::new()
        } else {
            format!("[{}] ", self.0)
        }
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Boot image selection criteria. At least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCriteria {
    /// Name pattern with `*`/`?` wildcards, matched client-side.
    pub name_pattern: Option<String>,
    pub owners: Vec<String>,
    pub filters: Vec<ImageFilter>,
}

impl ImageCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_pattern.is_none() && self.owners.is_empty() && self.filters.is_empty()
    }

    /// Human-readable summary used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(pattern) = &self.name_pattern {
            parts.push(format!("name '{pattern}'"));
        }
        if !self.owners.is_empty() {
            parts.push(format!("owners [{}]", self.owners.join(", ")));
        }
        for filter in &self.filters {
            parts.push(format!("{}=[{}]", filter.name, filter.values.join(", ")));
        }
        parts.join(", ")
    }
}

/// Everything one launch pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Repository URL the runner registers against.
    pub repository_url: String,
    pub runner_user: String,
    pub runner_dir: String,
    pub instance_type: String,
    pub subnet_id: Option<String>,
    pub security_group_ids: Vec<String>,
    pub tags: Vec<ResourceTag>,
    pub image: ImageCriteria,
}

/// Everything one terminate pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminateConfig {
    pub instance_id: String,
    pub label: String,
}

/// The pipeline a unit runs, selected by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitPlan {
    Launch(LaunchConfig),
    Terminate(TerminateConfig),
}

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub plan: UnitPlan,
}

/// A resolved batch: the uniform unit list the core works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub units: Vec<Unit>,
    /// Whether the caller explicitly asked for batch mode.
    pub declared: bool,
}

/// Generate a fresh runner label for a unit.
///
/// Batch units get their identity as prefix (`a-1f2e3d4c`), which keeps labels
/// distinct across a batch even if the random part collides.
#[must_use]
pub fn generate_label(unit: &UnitId) -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    hasher.write_u64(RandomState::new().build_hasher().finish());
    #[allow(clippy::cast_possible_truncation)]
    let token = hasher.finish() as u32;
    if unit.is_single() {
        format!("{token:08x}")
    } else {
        format!("{unit}-{token:08x}")
    }
}
