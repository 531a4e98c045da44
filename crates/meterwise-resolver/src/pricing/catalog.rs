//! Price catalog boundary
//!
//! The catalog turns a component's filters into a unit price. Components
//! carrying a custom price never reach the catalog.

use async_trait::async_trait;
use dashmap::DashMap;
use meterwise_common::{
    AttributeFilter, CostComponent, MeterwiseError, PriceFilter, PriceSource, ProductFilter,
    Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Resolves catalog filters to a unit price
#[async_trait]
pub trait PriceCatalog: Send + Sync {
    /// Unit price of the matching entry, `None` when nothing matches
    async fn unit_price(
        &self,
        product: &ProductFilter,
        price: Option<&PriceFilter>,
    ) -> Result<Option<Decimal>>;
}

/// Lookup key: a product filter with attributes in canonical order, plus
/// the optional price unit
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CatalogKey {
    vendor_name: String,
    service: String,
    region: String,
    attributes: Vec<AttributeFilter>,
    unit: Option<String>,
}

impl CatalogKey {
    fn new(product: &ProductFilter, price: Option<&PriceFilter>) -> Self {
        let mut attributes = product.attribute_filters.clone();
        attributes.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.value.cmp(&b.value)));

        Self {
            vendor_name: product.vendor_name.clone(),
            service: product.service.clone(),
            region: product.region.clone(),
            attributes,
            unit: price.map(|p| p.unit.clone()),
        }
    }
}

/// One priced catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub product_filter: ProductFilter,
    #[serde(default)]
    pub price_filter: Option<PriceFilter>,
    pub unit_price: Decimal,
}

/// In-memory catalog using DashMap
pub struct InMemoryCatalog {
    prices: DashMap<CatalogKey, Decimal>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            prices: DashMap::new(),
        }
    }

    /// Load catalog entries from a JSON array
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeterwiseError::Catalog(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)?;

        let catalog = Self::new();
        for entry in entries {
            catalog.insert(entry);
        }
        debug!(path = %path.display(), entries = catalog.len(), "Loaded price catalog");
        Ok(catalog)
    }

    pub fn insert(&self, entry: CatalogEntry) {
        let key = CatalogKey::new(&entry.product_filter, entry.price_filter.as_ref());
        self.prices.insert(key, entry.unit_price);
    }

    /// Builder-style insert
    pub fn with_price(
        self,
        product_filter: ProductFilter,
        price_filter: Option<PriceFilter>,
        unit_price: Decimal,
    ) -> Self {
        self.insert(CatalogEntry {
            product_filter,
            price_filter,
            unit_price,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceCatalog for InMemoryCatalog {
    async fn unit_price(
        &self,
        product: &ProductFilter,
        price: Option<&PriceFilter>,
    ) -> Result<Option<Decimal>> {
        let key = CatalogKey::new(product, price);
        Ok(self.prices.get(&key).map(|entry| *entry.value()))
    }
}

/// A cost component with its resolved price
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedComponent {
    #[serde(flatten)]
    pub component: CostComponent,
    /// Effective unit price; `None` when the catalog had no match
    pub unit_price: Option<Decimal>,
    /// `unit_price × monthly_quantity`; `None` when either is unknown
    pub monthly_cost: Option<Decimal>,
}

impl PricedComponent {
    /// Component left unpriced
    pub fn unpriced(component: CostComponent) -> Self {
        Self {
            component,
            unit_price: None,
            monthly_cost: None,
        }
    }

    fn with_price(component: CostComponent, unit_price: Decimal) -> Self {
        let monthly_cost = component
            .monthly_quantity
            .map(|quantity| quantity * unit_price);
        Self {
            component,
            unit_price: Some(unit_price),
            monthly_cost,
        }
    }
}

/// Price a component: a custom price is used verbatim, otherwise the
/// catalog is asked
#[instrument(skip(catalog, component), fields(component = %component.name))]
pub async fn price_component(
    catalog: &dyn PriceCatalog,
    component: CostComponent,
) -> Result<PricedComponent> {
    let unit_price = match component.price_source() {
        PriceSource::Custom(price) => Some(price),
        PriceSource::Catalog { product, price } => catalog.unit_price(product, price).await?,
    };

    match unit_price {
        Some(price) => Ok(PricedComponent::with_price(component, price)),
        None => {
            warn!(
                service = %component.product_filter.service,
                region = %component.product_filter.region,
                "No catalog price matched"
            );
            Ok(PricedComponent::unpriced(component))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Catalog that fails every lookup
    struct FailingCatalog;

    #[async_trait]
    impl PriceCatalog for FailingCatalog {
        async fn unit_price(
            &self,
            _product: &ProductFilter,
            _price: Option<&PriceFilter>,
        ) -> Result<Option<Decimal>> {
            Err(MeterwiseError::Catalog("lookup should not happen".into()))
        }
    }

    fn standard_product() -> ProductFilter {
        ProductFilter::new("ibm", "event-notifications", "us-south")
            .with_attribute("planName", "standard")
    }

    fn push_price() -> PriceFilter {
        PriceFilter::unit("OUTBOUND_DIGITAL_MESSAGES_PUSH")
    }

    #[tokio::test]
    async fn test_custom_price_skips_lookup() {
        let component = CostComponent::custom_priced(
            "Free",
            "Messages",
            Some(dec!(1000)),
            ProductFilter::new("ibm", "event-notifications", "us-south"),
            Decimal::ZERO,
        );

        let priced = price_component(&FailingCatalog, component).await.unwrap();
        assert_eq!(priced.unit_price, Some(Decimal::ZERO));
        assert_eq!(priced.monthly_cost, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let catalog =
            InMemoryCatalog::new().with_price(standard_product(), Some(push_price()), dec!(0.0001));
        let component = CostComponent::catalog_priced(
            "Metered",
            "Messages",
            Some(dec!(2500)),
            standard_product(),
            Some(push_price()),
        );

        let priced = price_component(&catalog, component).await.unwrap();
        assert_eq!(priced.unit_price, Some(dec!(0.0001)));
        assert_eq!(priced.monthly_cost, Some(dec!(0.25)));
    }

    #[tokio::test]
    async fn test_unknown_quantity_has_no_cost() {
        let catalog =
            InMemoryCatalog::new().with_price(standard_product(), Some(push_price()), dec!(0.0001));
        let component = CostComponent::catalog_priced(
            "Metered",
            "Messages",
            None,
            standard_product(),
            Some(push_price()),
        );

        let priced = price_component(&catalog, component).await.unwrap();
        assert_eq!(priced.unit_price, Some(dec!(0.0001)));
        assert_eq!(priced.monthly_cost, None);
    }

    #[tokio::test]
    async fn test_catalog_miss_is_unpriced() {
        let catalog = InMemoryCatalog::new();
        let component = CostComponent::catalog_priced(
            "Metered",
            "Messages",
            Some(dec!(1)),
            standard_product(),
            Some(push_price()),
        );

        let priced = price_component(&catalog, component).await.unwrap();
        assert_eq!(priced.unit_price, None);
        assert_eq!(priced.monthly_cost, None);
    }

    #[tokio::test]
    async fn test_catalog_errors_propagate() {
        let component = CostComponent::catalog_priced(
            "Metered",
            "Messages",
            Some(dec!(1)),
            standard_product(),
            Some(push_price()),
        );

        assert!(price_component(&FailingCatalog, component).await.is_err());
    }

    #[tokio::test]
    async fn test_attribute_order_does_not_matter() {
        let stored = ProductFilter::new("ibm", "svc", "eu-de")
            .with_attribute("planName", "standard")
            .with_attribute("edition", "v2");
        let queried = ProductFilter::new("ibm", "svc", "eu-de")
            .with_attribute("edition", "v2")
            .with_attribute("planName", "standard");
        let catalog = InMemoryCatalog::new().with_price(stored, None, dec!(3));

        assert_eq!(catalog.unit_price(&queried, None).await.unwrap(), Some(dec!(3)));
    }

    #[test]
    fn test_catalog_entry_json() {
        let entries: Vec<CatalogEntry> = serde_json::from_str(
            r#"[{
                "productFilter": {
                    "vendorName": "ibm",
                    "service": "event-notifications",
                    "region": "us-south",
                    "attributeFilters": [{"key": "planName", "value": "standard"}]
                },
                "priceFilter": {"unit": "OUTBOUND_DIGITAL_MESSAGES_PUSH"},
                "unitPrice": "0.0001"
            }]"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].unit_price, dec!(0.0001));
        assert_eq!(entries[0].product_filter, standard_product());
    }
}
