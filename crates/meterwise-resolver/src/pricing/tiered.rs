//! Tiered plan billing rule
//!
//! ```text
//! lite          quantity = min(usage or 0, cap)   price fixed at 0
//! standard      quantity = usage (unknown stays unknown)   price from catalog
//! unrecognized  quantity = 1   price fixed at 0   "Plan <plan> not found"
//! ```
//!
//! The lite cap is applied here because the catalog has no notion of a
//! capped free allotment. Usage above the cap is not billed on lite.

use meterwise_common::{
    CostComponent, Plan, PriceFilter, ProductFilter, Usage, PLAN_NAME_ATTRIBUTE,
};
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

/// One billable usage dimension of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meter {
    /// Component label, e.g. "Outbound Firefox Push Messages"
    pub name: &'static str,
    /// Display unit
    pub unit: &'static str,
    /// Unit code of the metered price point in the catalog
    pub catalog_unit: &'static str,
    /// Lite plan allotment
    pub free_cap: i64,
    /// What the allotment applies to, e.g. "per destination"
    pub cap_scope: &'static str,
}

/// Resource-level inputs shared by all meters of a resource
#[derive(Debug, Clone, Copy)]
pub struct TierContext<'a> {
    pub vendor: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub plan: &'a Plan,
}

impl<'a> TierContext<'a> {
    /// Vendor, service and region only
    fn product_filter(&self) -> ProductFilter {
        ProductFilter::new(self.vendor, self.service, self.region)
    }

    /// Product filter narrowed to the plan
    fn plan_product_filter(&self) -> ProductFilter {
        self.product_filter()
            .with_attribute(PLAN_NAME_ATTRIBUTE, self.plan.as_str())
    }
}

/// Resolve one meter under the resource's plan
pub fn resolve_meter(ctx: &TierContext<'_>, meter: &Meter, usage: Usage) -> CostComponent {
    match ctx.plan {
        Plan::Lite => {
            let quantity = capped(usage, meter.free_cap);
            debug!(meter = meter.name, ?usage, quantity, "Applied lite cap");

            CostComponent::custom_priced(
                format!(
                    "{} ({}) (Max. {} {})",
                    meter.name,
                    ctx.plan.label(),
                    format_count(meter.free_cap),
                    meter.cap_scope
                ),
                meter.unit,
                Some(Decimal::from(quantity)),
                ctx.product_filter(),
                Decimal::ZERO,
            )
        }
        Plan::Standard => {
            debug!(meter = meter.name, ?usage, "Passing metered usage through");

            CostComponent::catalog_priced(
                format!("{} ({})", meter.name, ctx.plan.label()),
                meter.unit,
                usage.known().map(Decimal::from),
                ctx.plan_product_filter(),
                Some(PriceFilter::unit(meter.catalog_unit)),
            )
        }
        Plan::Unrecognized(plan) => plan_not_found(ctx, plan),
    }
}

/// Resolve every meter of a resource, in declaration order
///
/// An unrecognized plan yields a single placeholder line for the whole
/// resource instead of one per meter.
#[instrument(skip(ctx, meters), fields(plan = %ctx.plan, region = ctx.region))]
pub fn resolve_meters(ctx: &TierContext<'_>, meters: &[(&Meter, Usage)]) -> Vec<CostComponent> {
    if let Plan::Unrecognized(plan) = ctx.plan {
        warn!(plan = %plan, service = ctx.service, "No billing rule for plan");
        return vec![plan_not_found(ctx, plan)];
    }

    meters
        .iter()
        .map(|(meter, usage)| resolve_meter(ctx, meter, *usage))
        .collect()
}

/// Zero-priced placeholder that keeps an unknown plan visible in the output
fn plan_not_found(ctx: &TierContext<'_>, plan: &str) -> CostComponent {
    CostComponent::custom_priced(
        format!("Plan {} not found", plan),
        "",
        Some(Decimal::ONE),
        ctx.plan_product_filter(),
        Decimal::ZERO,
    )
}

/// Lite quantity: unknown usage counts as zero, then the cap applies
pub fn capped(usage: Usage, cap: i64) -> i64 {
    usage.or_zero().min(cap)
}

/// Format a count with thousands separators, e.g. 10000 -> "10,000"
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
