//! Usage types
//!
//! Declared usage is optional. A meter with no data is `Usage::Unknown`,
//! which is never the same thing as a known zero.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// Current usage file format version
pub const USAGE_FILE_VERSION: &str = "0.1";

/// Declared quantity for one meter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    /// Quantity supplied by the usage provider
    Known(i64),
    /// No data supplied
    #[default]
    Unknown,
}

impl Usage {
    pub fn known(&self) -> Option<i64> {
        match self {
            Usage::Known(value) => Some(*value),
            Usage::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Usage::Known(_))
    }

    /// Known value, or zero when no data was supplied
    pub fn or_zero(&self) -> i64 {
        self.known().unwrap_or(0)
    }
}

impl From<Option<i64>> for Usage {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Usage::Unknown, Usage::Known)
    }
}

impl From<i64> for Usage {
    fn from(value: i64) -> Self {
        Usage::Known(value)
    }
}

/// Value type of a usage schema entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageValueType {
    Int64,
}

/// Static declaration of one usage meter of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSchemaEntry {
    /// Meter key, namespaced by service and meter
    pub key: &'static str,
    /// Display default for meters with no data. Never used for billing.
    pub default_value: i64,
    pub value_type: UsageValueType,
}

impl UsageSchemaEntry {
    pub const fn int64(key: &'static str) -> Self {
        Self {
            key,
            default_value: 0,
            value_type: UsageValueType::Int64,
        }
    }
}

/// Declared usage for one resource, keyed by meter key
///
/// A key mapped to `null` carries no data, same as a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageData(HashMap<String, Option<i64>>);

impl UsageData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Option<i64>>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Option<i64>>) {
        self.0.insert(key.into(), value.into());
    }

    /// Usage recorded for a meter key
    pub fn get(&self, key: &str) -> Usage {
        self.0.get(key).copied().flatten().into()
    }

    /// Keys that match none of the given schema entries
    pub fn unmatched_keys<'a>(&'a self, schema: &'a [UsageSchemaEntry]) -> Vec<&'a str> {
        let mut keys: Vec<&str> = self
            .0
            .keys()
            .map(String::as_str)
            .filter(|key| !schema.iter().any(|entry| entry.key == *key))
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<i64>)> for UsageData {
    fn from_iter<I: IntoIterator<Item = (K, Option<i64>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Usage file: declared usage for many resources, keyed by resource address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageFile {
    pub version: String,
    #[serde(default)]
    pub resource_usage: BTreeMap<String, UsageData>,
}

impl Default for UsageFile {
    fn default() -> Self {
        Self {
            version: USAGE_FILE_VERSION.to_string(),
            resource_usage: BTreeMap::new(),
        }
    }
}

impl UsageFile {
    /// Load a usage file from JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let file = Self::from_json(&content)?;
        debug!(path = %path.display(), resources = file.resource_usage.len(), "Loaded usage file");
        Ok(file)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Usage declared for a resource; empty when the address is not listed
    pub fn for_resource(&self, address: &str) -> UsageData {
        self.resource_usage.get(address).cloned().unwrap_or_default()
    }

    /// Build a usage file pre-filled with every schema entry's display default
    pub fn template<'a, I>(resources: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [UsageSchemaEntry])>,
    {
        let resource_usage = resources
            .into_iter()
            .map(|(address, schema)| {
                let usage: UsageData = schema
                    .iter()
                    .map(|entry| (entry.key, Some(entry.default_value)))
                    .collect();
                (address.to_string(), usage)
            })
            .collect();

        Self {
            version: USAGE_FILE_VERSION.to_string(),
            resource_usage,
        }
    }
}
