//! Resource output
//!
//! What a typed resource hands to the catalog/report side after binding and
//! resolution.

use super::cost_component::CostComponent;
use super::usage::UsageSchemaEntry;
use serde::Serialize;

/// A resolved resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource address
    pub name: String,
    /// Usage schema of the resource type
    pub usage_schema: Vec<UsageSchemaEntry>,
    /// Cost components in meter declaration order
    pub cost_components: Vec<CostComponent>,
}

impl Resource {
    /// Components whose quantity depends on usage not yet provided
    pub fn unknown_usage_components(&self) -> impl Iterator<Item = &CostComponent> {
        self.cost_components
            .iter()
            .filter(|component| component.is_usage_unknown())
    }
}
