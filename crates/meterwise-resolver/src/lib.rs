//! # Meterwise Resolver
//!
//! Usage binding, tiered plan resolution and evaluation runs.
//!
//! ## Pipeline
//!
//! ```text
//! definition -> typed resource -> bind(usage) -> resolve -> price
//! ```
//!
//! Where:
//! - bind: declared usage is written into the resource's usage fields
//! - resolve: each meter becomes a cost component under the plan rule
//! - price: the catalog supplies unit prices unless a custom price is set

pub mod binding;
pub mod config;
pub mod evaluation;
pub mod golden;
pub mod pricing;
pub mod resources;

pub use config::{EvaluationSettings, MeterwiseConfig};
pub use evaluation::{resolve_all, resolve_resource, EvaluationReport, Evaluator};
pub use pricing::{InMemoryCatalog, PriceCatalog};
pub use resources::{build, build_all, load_definitions, CostResource, ResourceDefinition};
