//! Plan tiers
//!
//! Plans arrive as free-form strings from the IaC layer. Known tiers get
//! their own variant; anything else is kept verbatim in `Unrecognized` so it
//! can be surfaced back to the user.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Plan identifier of the free tier
pub const LITE: &str = "lite";

/// Plan identifier of the metered tier
pub const STANDARD: &str = "standard";

/// Pricing mode of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Plan {
    /// Always-free tier with a capped allotment and no overage
    Lite,
    /// Pay-per-unit tier priced from the catalog
    Standard,
    /// Any plan string we have no billing rule for
    Unrecognized(String),
}

impl Plan {
    /// Parse a plan identifier. Matching is exact, as the catalog is.
    pub fn parse(value: &str) -> Self {
        match value {
            LITE => Plan::Lite,
            STANDARD => Plan::Standard,
            other => Plan::Unrecognized(other.to_string()),
        }
    }

    /// The plan identifier as given by the IaC layer
    pub fn as_str(&self) -> &str {
        match self {
            Plan::Lite => LITE,
            Plan::Standard => STANDARD,
            Plan::Unrecognized(value) => value,
        }
    }

    /// Label used inside component names, e.g. "Lite plan"
    pub fn label(&self) -> String {
        match self {
            Plan::Lite => "Lite plan".to_string(),
            Plan::Standard => "Standard plan".to_string(),
            Plan::Unrecognized(value) => format!("{} plan", value),
        }
    }
}

impl From<&str> for Plan {
    fn from(value: &str) -> Self {
        Plan::parse(value)
    }
}

impl From<String> for Plan {
    fn from(value: String) -> Self {
        Plan::parse(&value)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Plan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Plan::parse(&value))
    }
}
