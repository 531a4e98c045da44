//! Cost component descriptors
//!
//! A cost component carries everything the price catalog needs to price one
//! meter of one resource: the billable quantity and the filters selecting a
//! catalog entry. The effective unit price comes from exactly one place:
//! either the catalog (via the filters) or `custom_price`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attribute-equality constraint on a catalog product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub key: String,
    pub value: String,
}

impl AttributeFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Selects a product in the price catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub vendor_name: String,
    pub service: String,
    pub region: String,
    #[serde(default)]
    pub attribute_filters: Vec<AttributeFilter>,
}

impl ProductFilter {
    pub fn new(
        vendor_name: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            vendor_name: vendor_name.into(),
            service: service.into(),
            region: region.into(),
            attribute_filters: Vec::new(),
        }
    }

    /// Add an attribute constraint
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribute_filters.push(AttributeFilter::new(key, value));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attribute_filters
            .iter()
            .find(|filter| filter.key == key)
            .map(|filter| filter.value.as_str())
    }
}

/// Narrows a product's price points by unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceFilter {
    pub unit: String,
}

impl PriceFilter {
    pub fn unit(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

/// Where the effective unit price of a component comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource<'a> {
    /// Price is fixed; the catalog is not consulted
    Custom(Decimal),
    /// Price is looked up in the catalog
    Catalog {
        product: &'a ProductFilter,
        price: Option<&'a PriceFilter>,
    },
}

/// One billable line of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComponent {
    /// Human-readable label, may carry plan and cap annotations
    pub name: String,
    /// Display unit
    pub unit: String,
    /// Scaling factor applied before price multiplication
    pub unit_multiplier: Decimal,
    /// Billable monthly quantity; `None` when usage is unknown
    pub monthly_quantity: Option<Decimal>,
    pub product_filter: ProductFilter,
    pub price_filter: Option<PriceFilter>,
    /// Price override that bypasses the catalog
    pub custom_price: Option<Decimal>,
}

impl CostComponent {
    /// Component priced from the catalog
    pub fn catalog_priced(
        name: impl Into<String>,
        unit: impl Into<String>,
        monthly_quantity: Option<Decimal>,
        product_filter: ProductFilter,
        price_filter: Option<PriceFilter>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            unit_multiplier: Decimal::ONE,
            monthly_quantity,
            product_filter,
            price_filter,
            custom_price: None,
        }
    }

    /// Component with a fixed price; any price filter is dropped
    pub fn custom_priced(
        name: impl Into<String>,
        unit: impl Into<String>,
        monthly_quantity: Option<Decimal>,
        product_filter: ProductFilter,
        price: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            unit_multiplier: Decimal::ONE,
            monthly_quantity,
            product_filter,
            price_filter: None,
            custom_price: Some(price),
        }
    }

    pub fn price_source(&self) -> PriceSource<'_> {
        match self.custom_price {
            Some(price) => PriceSource::Custom(price),
            None => PriceSource::Catalog {
                product: &self.product_filter,
                price: self.price_filter.as_ref(),
            },
        }
    }

    /// Whether the quantity depends on usage that was not supplied
    pub fn is_usage_unknown(&self) -> bool {
        self.monthly_quantity.is_none()
    }
}
