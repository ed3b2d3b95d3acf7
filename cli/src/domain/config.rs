//! Configuration resolution: turns the single/batch input shapes into one
//! uniform, validated [`Batch`].
//!
//! Pure functions only; nothing here performs I/O.

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use runner_common::{ImageFilter, ResourceTag, UnitRecord};
use serde::Deserialize;

use crate::domain::error::{ConfigError, UnitSuffix};
use crate::domain::unit::{
    Batch, ImageCriteria, LaunchConfig, TerminateConfig, Unit, UnitId, UnitPlan,
};

// ── Input shapes ─────────────────────────────────────────────────────────────

/// The shape of the `--batch` input, decided once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchInput {
    /// No batch: one unit with the empty identity.
    Single,
    /// A plain list of unit identities.
    Identifiers(Vec<String>),
    /// A JSON object keyed by unit identity.
    Descriptors(BTreeMap<String, serde_json::Value>),
}

impl BatchInput {
    /// Classify raw batch text. Blank or absent text means [`BatchInput::Single`];
    /// text starting with `{` is a descriptor object; anything else is a list
    /// of identities separated by commas, whitespace or newlines.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed JSON or a batch with no units.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::Single);
        }
        if raw.starts_with('{') {
            let map: BTreeMap<String, serde_json::Value> =
                serde_json::from_str(raw).map_err(|e| ConfigError::InvalidJson {
                    what: "batch descriptor",
                    message: e.to_string(),
                })?;
            if map.is_empty() {
                return Err(ConfigError::EmptyBatch.into());
            }
            return Ok(Self::Descriptors(map));
        }
        let ids = split_list(raw);
        if ids.is_empty() {
            return Err(ConfigError::EmptyBatch.into());
        }
        Ok(Self::Identifiers(ids))
    }

    fn is_declared(&self) -> bool {
        !matches!(self, Self::Single)
    }
}

/// Partial launch settings: the command-line base, or one descriptor's overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchOverrides {
    pub instance_type: Option<String>,
    pub subnet_id: Option<String>,
    pub security_group_ids: Option<Vec<String>>,
    pub image_name: Option<String>,
    pub image_owners: Option<Vec<String>>,
    pub image_filters: Option<Vec<ImageFilter>>,
    pub tags: Option<Vec<ResourceTag>>,
    pub runner_user: Option<String>,
    pub runner_dir: Option<String>,
}

impl LaunchOverrides {
    /// Fields set in `self` win; unset fields fall back to `base`.
    #[must_use]
    pub fn over(self, base: &Self) -> Self {
        Self {
            instance_type: self.instance_type.or_else(|| base.instance_type.clone()),
            subnet_id: self.subnet_id.or_else(|| base.subnet_id.clone()),
            security_group_ids: self
                .security_group_ids
                .or_else(|| base.security_group_ids.clone()),
            image_name: self.image_name.or_else(|| base.image_name.clone()),
            image_owners: self.image_owners.or_else(|| base.image_owners.clone()),
            image_filters: self.image_filters.or_else(|| base.image_filters.clone()),
            tags: self.tags.or_else(|| base.tags.clone()),
            runner_user: self.runner_user.or_else(|| base.runner_user.clone()),
            runner_dir: self.runner_dir.or_else(|| base.runner_dir.clone()),
        }
    }
}

/// Direct terminate inputs for a non-batch invocation.
#[derive(Debug, Clone, Default)]
pub struct TerminateInput {
    pub instance_id: Option<String>,
    pub label: Option<String>,
}

// ── Resolution ───────────────────────────────────────────────────────────────

/// Resolve launch inputs into a validated batch.
///
/// # Errors
///
/// Returns a [`ConfigError`] for bad identities, duplicates, malformed
/// descriptors, or a unit missing required settings (including all three
/// image criteria).
pub fn resolve_launch(
    base: &LaunchOverrides,
    repository_url: &str,
    input: BatchInput,
) -> Result<Batch> {
    let declared = input.is_declared();
    let entries: Vec<(UnitId, LaunchOverrides)> = match input {
        BatchInput::Single => vec![(UnitId::single(), base.clone())],
        BatchInput::Identifiers(ids) => unique_ids(&ids)?
            .into_iter()
            .map(|id| (id, base.clone()))
            .collect(),
        BatchInput::Descriptors(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                let id = UnitId::parse(&key)?;
                let overrides: LaunchOverrides = if value.is_null() {
                    LaunchOverrides::default()
                } else {
                    serde_json::from_value(value).map_err(|e| ConfigError::InvalidJson {
                        what: "launch descriptor",
                        message: format!("unit '{key}': {e}"),
                    })?
                };
                entries.push((id, overrides.over(base)));
            }
            entries
        }
    };

    let units = entries
        .into_iter()
        .map(|(id, settings)| {
            let config = build_launch_config(&id, repository_url, settings)?;
            Ok(Unit {
                id,
                plan: UnitPlan::Launch(config),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Batch { units, declared })
}

/// Resolve terminate inputs into a validated batch.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the instance id or label is missing, when a
/// plain identity list is given, or when a descriptor is malformed.
pub fn resolve_terminate(direct: &TerminateInput, input: BatchInput) -> Result<Batch> {
    let mut declared = input.is_declared();
    let units = match input {
        BatchInput::Single => {
            let id = UnitId::single();
            let config = TerminateConfig {
                instance_id: required(direct.instance_id.as_deref(), "instance-id", &id)?,
                label: required(direct.label.as_deref(), "label", &id)?,
            };
            vec![Unit {
                id,
                plan: UnitPlan::Terminate(config),
            }]
        }
        BatchInput::Identifiers(_) => return Err(ConfigError::TerminateNeedsDescriptors.into()),
        BatchInput::Descriptors(map) => {
            // A single launch publishes its result map under the empty identity.
            let lone_single = map.len() == 1 && map.contains_key("");
            if lone_single {
                declared = false;
            }
            let mut units = Vec::with_capacity(map.len());
            for (key, value) in map {
                let id = if lone_single {
                    UnitId::single()
                } else {
                    UnitId::parse(&key)?
                };
                let record: UnitRecord =
                    serde_json::from_value(value).map_err(|e| ConfigError::InvalidJson {
                        what: "terminate descriptor",
                        message: format!("unit '{key}': {e}"),
                    })?;
                let config = TerminateConfig {
                    instance_id: required(Some(&record.instance_id), "instance_id", &id)?,
                    label: required(Some(&record.label), "label", &id)?,
                };
                units.push(Unit {
                    id,
                    plan: UnitPlan::Terminate(config),
                });
            }
            units
        }
    };
    Ok(Batch { units, declared })
}

/// Validate merged settings for one unit.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the unit when a required setting is missing.
pub fn build_launch_config(
    unit: &UnitId,
    repository_url: &str,
    settings: LaunchOverrides,
) -> Result<LaunchConfig> {
    let image = ImageCriteria {
        name_pattern: non_blank(settings.image_name),
        owners: settings.image_owners.unwrap_or_default(),
        filters: settings.image_filters.unwrap_or_default(),
    };
    if image.is_empty() {
        return Err(ConfigError::MissingImageCriteria {
            unit: suffix(unit),
        }
        .into());
    }
    Ok(LaunchConfig {
        repository_url: repository_url.to_string(),
        runner_user: required(settings.runner_user.as_deref(), "runner_user", unit)?,
        runner_dir: required(settings.runner_dir.as_deref(), "runner_dir", unit)?,
        instance_type: required(settings.instance_type.as_deref(), "instance_type", unit)?,
        subnet_id: non_blank(settings.subnet_id),
        security_group_ids: settings.security_group_ids.unwrap_or_default(),
        tags: settings.tags.unwrap_or_default(),
        image,
    })
}

/// Split a comma/whitespace separated list, dropping empty items.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a JSON array input such as `--tags` or `--image-filters`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidJson`] if the text is not valid for `T`.
pub fn parse_json_list<T: serde::de::DeserializeOwned>(
    what: &'static str,
    raw: &str,
) -> Result<Vec<T>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| {
        ConfigError::InvalidJson {
            what,
            message: e.to_string(),
        }
        .into()
    })
}

/// Turn `owner/repo` into the repository URL on `server_url`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRepository`] unless `repository` has exactly
/// one `/` with non-empty sides.
pub fn repository_url(server_url: &str, repository: &str) -> Result<String> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(format!("{}/{owner}/{repo}", server_url.trim_end_matches('/')))
        }
        _ => Err(ConfigError::InvalidRepository(repository.to_string()).into()),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn unique_ids(raw: &[String]) -> Result<Vec<UnitId>> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|s| {
            let id = UnitId::parse(s)?;
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateUnit(s.clone()).into());
            }
            Ok(id)
        })
        .collect()
}

fn required(value: Option<&str>, field: &'static str, unit: &UnitId) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingField {
            field,
            unit: suffix(unit),
        }
        .into()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn suffix(unit: &UnitId) -> UnitSuffix {
    UnitSuffix(unit.as_str().to_string())
}
