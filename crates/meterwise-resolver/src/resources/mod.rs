//! Billable resource types
//!
//! Every resource type owns a static usage schema, a binding table and the
//! meters it resolves. The registry turns inbound definitions into typed
//! resources.

pub mod event_notifications;

use event_notifications::{EnInstance, EnSubscriptionPush, PushDestination};
use meterwise_common::{
    CostComponent, Resource, ResourceError, Result, UsageData, UsageSchemaEntry,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// A resource that can be usage-bound and resolved
pub trait CostResource: Send + Sync + fmt::Debug {
    /// Unique address of this resource occurrence
    fn address(&self) -> &str;

    fn resource_type(&self) -> &'static str;

    /// Usage schema of the resource type, in meter declaration order
    fn schema(&self) -> Vec<UsageSchemaEntry>;

    /// Bind declared usage into the resource's usage fields
    fn populate_usage(&mut self, usage: &UsageData);

    /// Resolve cost components, one per meter in declaration order
    fn cost_components(&self) -> Vec<CostComponent>;

    /// Package the resolved resource
    fn build_resource(&self) -> Resource {
        Resource {
            name: self.address().to_string(),
            usage_schema: self.schema(),
            cost_components: self.cost_components(),
        }
    }
}

/// Inbound resource attributes as produced by the IaC parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

impl ResourceDefinition {
    pub fn new(
        address: impl Into<String>,
        resource_type: impl Into<String>,
        region: impl Into<String>,
        plan: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            resource_type: resource_type.into(),
            region: Some(region.into()),
            plan: Some(plan.into()),
        }
    }

    fn require<'a>(
        &self,
        attribute: &str,
        value: &'a Option<String>,
    ) -> std::result::Result<&'a str, ResourceError> {
        value
            .as_deref()
            .ok_or_else(|| ResourceError::MissingAttribute {
                address: self.address.clone(),
                attribute: attribute.to_string(),
            })
    }
}

/// Load resource definitions from a JSON array
pub fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<ResourceDefinition>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let definitions: Vec<ResourceDefinition> = serde_json::from_str(&content)?;
    debug!(path = %path.display(), count = definitions.len(), "Loaded resource definitions");
    Ok(definitions)
}

/// Build a typed resource from its definition
pub fn build(
    definition: &ResourceDefinition,
) -> std::result::Result<Box<dyn CostResource>, ResourceError> {
    let kind = definition.resource_type.as_str();
    let destination = PushDestination::from_resource_type(kind);
    if destination.is_none() && kind != EnInstance::RESOURCE_TYPE {
        return Err(ResourceError::Unsupported {
            address: definition.address.clone(),
            resource_type: definition.resource_type.clone(),
        });
    }

    let region = definition.require("region", &definition.region)?;
    let plan = definition.require("plan", &definition.plan)?;

    let resource: Box<dyn CostResource> = match destination {
        Some(destination) => Box::new(EnSubscriptionPush::new(
            definition.address.as_str(),
            region,
            plan,
            destination,
        )),
        None => Box::new(EnInstance::new(definition.address.as_str(), region, plan)),
    };
    Ok(resource)
}

/// Build every definition, skipping the ones that cannot be built
pub fn build_all(definitions: &[ResourceDefinition]) -> Vec<Box<dyn CostResource>> {
    definitions
        .iter()
        .filter_map(|definition| match build(definition) {
            Ok(resource) => Some(resource),
            Err(e) => {
                warn!(error = %e, "Skipping resource");
                None
            }
        })
        .collect()
}
