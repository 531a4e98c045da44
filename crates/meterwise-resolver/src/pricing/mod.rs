//! Pricing module
//!
//! - Tiered plan billing rule turning bound usage into cost components
//! - Price catalog boundary applying custom prices or catalog lookups

pub mod catalog;
pub mod tiered;

pub use catalog::{price_component, CatalogEntry, InMemoryCatalog, PriceCatalog, PricedComponent};
pub use tiered::{format_count, resolve_meter, resolve_meters, Meter, TierContext};
