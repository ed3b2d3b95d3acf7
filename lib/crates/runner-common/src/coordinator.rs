//! Records returned by the GitHub Actions self-hosted runner API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `POST .../actions/runners/registration-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationToken {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Connection status reported for a runner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunnerStatus {
    Online,
    Offline,
    #[serde(other)]
    Unknown,
}

/// A label attached to a runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerLabel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    /// `read-only` for built-in labels, `custom` for user labels.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A registered self-hosted runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    pub id: u64,
    pub name: String,
    pub status: RunnerStatus,
    #[serde(default)]
    pub busy: bool,
    #[serde(default)]
    pub labels: Vec<RunnerLabel>,
}

impl Runner {
    /// Whether any of the runner's labels is exactly `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.name == label)
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status == RunnerStatus::Online
    }
}

/// One page of `GET .../actions/runners`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerList {
    pub total_count: u64,
    #[serde(default)]
    pub runners: Vec<Runner>,
}
