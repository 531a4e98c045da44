//! # Meterwise Common
//!
//! Shared types and errors for the Meterwise cost-resolution engine.
//!
//! ## Core Types
//!
//! - [`Plan`]: plan tier of a resource, with an `Unrecognized` fallback
//! - [`Usage`]: declared quantity of one meter, `Known` or `Unknown`
//! - [`UsageSchemaEntry`]: static meter declaration of a resource type
//! - [`UsageData`]/[`UsageFile`]: declared usage keyed by meter / address
//! - [`CostComponent`]: billable quantity plus catalog filters for one meter
//! - [`Resource`]: a resolved resource with its cost components

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{MeterwiseError, ResourceError, Result};
pub use types::{
    cost_component::{AttributeFilter, CostComponent, PriceFilter, PriceSource, ProductFilter},
    plan::Plan,
    resource::Resource,
    usage::{Usage, UsageData, UsageFile, UsageSchemaEntry, UsageValueType},
};

/// Meterwise version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog attribute holding the plan name
pub const PLAN_NAME_ATTRIBUTE: &str = "planName";
