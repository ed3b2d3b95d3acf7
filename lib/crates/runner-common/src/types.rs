use serde::{Deserialize, Serialize};

/// A resource tag as accepted on input (`[{"Key": "...", "Value": "..."}]`).
///
/// Order is preserved and keys may repeat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTag {
    pub key: String,
    pub value: String,
}

/// A provider-side image attribute filter (`[{"Name": "...", "Values": [...]}]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ImageFilter {
    pub name: String,
    pub values: Vec<String>,
}

/// The instance and runner label produced for one launched unit.
///
/// This is the value type of the launch result map and of the terminate
/// batch descriptor, so a launch result can be fed straight back into
/// `terminate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitRecord {
    pub instance_id: String,
    pub label: String,
}
