//! Usage binder
//!
//! Each resource type declares a static table of `(meter key, setter)`
//! pairs. Binding walks that table and copies every known value from the
//! declared usage into the resource. Meters with no data are left untouched
//! and keys matching no meter are ignored.
//!
//! The table is the single source of meter order: the usage schema and the
//! meters handed to resolution are both read from it.

use crate::pricing::Meter;
use meterwise_common::{Usage, UsageData, UsageSchemaEntry};
use tracing::{debug, instrument};

/// Writes a usage value into a resource field
pub type UsageSetter<R> = fn(&mut R, Usage);

/// Reads a usage field back out of a resource
pub type UsageGetter<R> = fn(&R) -> Usage;

/// One row of a resource type's binding table
pub struct UsageBinding<R> {
    /// Meter key in the usage data
    pub key: &'static str,
    /// Meter billed from this usage; may depend on the resource
    pub meter: fn(&R) -> &'static Meter,
    pub get: UsageGetter<R>,
    /// Field the value lands in
    pub set: UsageSetter<R>,
}

/// Resource types whose usage fields can be populated from declared usage
pub trait UsageBound: Sized + 'static {
    /// Binding table, in meter declaration order
    fn usage_bindings() -> &'static [UsageBinding<Self>];

    /// Usage schema, in binding table order
    fn usage_schema() -> Vec<UsageSchemaEntry> {
        Self::usage_bindings()
            .iter()
            .map(|binding| UsageSchemaEntry::int64(binding.key))
            .collect()
    }

    /// Each meter with its currently bound usage, in binding table order
    fn metered_usage(&self) -> Vec<(&'static Meter, Usage)> {
        Self::usage_bindings()
            .iter()
            .map(|binding| ((binding.meter)(self), (binding.get)(self)))
            .collect()
    }
}

/// Populate a resource's usage fields from declared usage
#[instrument(skip_all, fields(meters = R::usage_bindings().len(), supplied = usage.len()))]
pub fn bind<R: UsageBound>(resource: &mut R, usage: &UsageData) {
    let mut bound = 0usize;

    for binding in R::usage_bindings() {
        let value = usage.get(binding.key);
        if value.is_known() {
            (binding.set)(resource, value);
            bound += 1;
        }
    }

    let schema = R::usage_schema();
    let ignored = usage.unmatched_keys(&schema);
    if !ignored.is_empty() {
        debug!(?ignored, "Ignoring usage keys with no matching meter");
    }
    debug!(bound, "Bound declared usage");
}
