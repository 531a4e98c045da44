//! Evaluation runs
//!
//! Each resource is bound, resolved and priced in its own task. Resources
//! share nothing, so tasks need no coordination beyond the concurrency
//! bound. Report order always follows input order.

use crate::config::EvaluationSettings;
use crate::pricing::{price_component, PriceCatalog, PricedComponent};
use crate::resources::CostResource;
use chrono::{DateTime, Utc};
use meterwise_common::{MeterwiseError, Resource, Result, UsageData, UsageFile};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Bind declared usage into a resource and resolve it
pub fn resolve_resource(resource: &mut dyn CostResource, usage: &UsageData) -> Resource {
    resource.populate_usage(usage);
    resource.build_resource()
}

/// Resolve every resource against a usage file, without pricing
pub fn resolve_all(resources: Vec<Box<dyn CostResource>>, usage: &UsageFile) -> Vec<Resource> {
    resources
        .into_iter()
        .map(|mut resource| {
            let declared = usage.for_resource(resource.address());
            resolve_resource(resource.as_mut(), &declared)
        })
        .collect()
}

/// Priced cost breakdown of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBreakdown {
    pub name: String,
    pub cost_components: Vec<PricedComponent>,
    /// Sum of the components whose cost is known
    pub monthly_cost: Decimal,
    /// Components whose cost depends on missing usage or price
    pub unknown_cost_components: usize,
    /// Components with no declared usage, a subset of the unknown ones
    pub missing_usage_components: usize,
}

impl ResourceBreakdown {
    fn new(
        name: String,
        cost_components: Vec<PricedComponent>,
        missing_usage_components: usize,
    ) -> Self {
        let monthly_cost: Decimal = cost_components
            .iter()
            .filter_map(|c| c.monthly_cost)
            .sum();
        let unknown_cost_components = cost_components
            .iter()
            .filter(|c| c.monthly_cost.is_none())
            .count();

        Self {
            name,
            cost_components,
            monthly_cost,
            unknown_cost_components,
            missing_usage_components,
        }
    }
}

/// Result of one evaluation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub resources: Vec<ResourceBreakdown>,
    pub total_monthly_cost: Decimal,
    pub unknown_cost_components: usize,
}

/// Runs bind, resolve and price for a set of resources
pub struct Evaluator {
    catalog: Arc<dyn PriceCatalog>,
    settings: EvaluationSettings,
}

impl Evaluator {
    pub fn new(catalog: Arc<dyn PriceCatalog>, settings: EvaluationSettings) -> Self {
        Self { catalog, settings }
    }

    /// Evaluate all resources, one task per resource
    ///
    /// Fails with `MeterwiseError::Timeout` when the run does not finish in
    /// time; unfinished tasks are abandoned.
    #[instrument(skip_all, fields(resources = resources.len()))]
    pub async fn evaluate(
        &self,
        resources: Vec<Box<dyn CostResource>>,
        usage: &UsageFile,
    ) -> Result<EvaluationReport> {
        let run_id = Uuid::now_v7();
        let total = resources.len();
        let permits = self.settings.max_parallel.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for (index, mut resource) in resources.into_iter().enumerate() {
            let declared = usage.for_resource(resource.address());
            let catalog = Arc::clone(&self.catalog);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| MeterwiseError::Internal(format!("Semaphore closed: {}", e)))?;

                let resolved = resolve_resource(resource.as_mut(), &declared);
                let breakdown = price_resource(catalog.as_ref(), resolved).await;
                Ok::<_, MeterwiseError>((index, breakdown))
            });
        }

        let mut slots: Vec<Option<ResourceBreakdown>> = (0..total).map(|_| None).collect();
        let timeout = Duration::from_millis(self.settings.timeout_ms);

        let collected = tokio::time::timeout(timeout, async {
            while let Some(joined) = tasks.join_next().await {
                let (index, breakdown) = joined.map_err(|e| {
                    MeterwiseError::Internal(format!("Resource task failed: {}", e))
                })??;
                slots[index] = Some(breakdown);
            }
            Ok::<_, MeterwiseError>(())
        })
        .await;

        match collected {
            Ok(result) => result?,
            Err(_) => {
                tasks.abort_all();
                let finished = slots.iter().filter(|slot| slot.is_some()).count();
                warn!(finished, total, "Evaluation timed out");
                return Err(MeterwiseError::Timeout(format!(
                    "evaluated {} of {} resources within {}ms",
                    finished, total, self.settings.timeout_ms
                )));
            }
        }

        let resources: Vec<ResourceBreakdown> = slots.into_iter().flatten().collect();
        let total_monthly_cost: Decimal = resources.iter().map(|r| r.monthly_cost).sum();
        let unknown_cost_components: usize =
            resources.iter().map(|r| r.unknown_cost_components).sum();

        info!(
            %run_id,
            resources = resources.len(),
            %total_monthly_cost,
            unknown_cost_components,
            "Evaluation complete"
        );

        Ok(EvaluationReport {
            run_id,
            generated_at: Utc::now(),
            resources,
            total_monthly_cost,
            unknown_cost_components,
        })
    }
}

/// Price every component of a resolved resource
///
/// A failed lookup leaves that component unpriced; it never fails the
/// resource.
async fn price_resource(catalog: &dyn PriceCatalog, resource: Resource) -> ResourceBreakdown {
    let missing_usage = resource.unknown_usage_components().count();
    let mut priced = Vec::with_capacity(resource.cost_components.len());

    for component in resource.cost_components {
        match price_component(catalog, component.clone()).await {
            Ok(p) => priced.push(p),
            Err(e) => {
                warn!(resource = %resource.name, error = %e, "Catalog lookup failed");
                priced.push(PricedComponent::unpriced(component));
            }
        }
    }

    debug!(
        resource = %resource.name,
        components = priced.len(),
        missing_usage,
        "Priced resource"
    );
    ResourceBreakdown::new(resource.name, priced, missing_usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::InMemoryCatalog;
    use crate::resources::event_notifications::{
        EnInstance, EnSubscriptionPush, PushDestination, PUSH_USAGE_KEY,
    };
    use async_trait::async_trait;
    use meterwise_common::{PriceFilter, ProductFilter};
    use rust_decimal_macros::dec;

    fn settings(timeout_ms: u64) -> EvaluationSettings {
        EvaluationSettings {
            timeout_ms,
            max_parallel: 2,
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new().with_price(
            ProductFilter::new("ibm", "event-notifications", "us-south")
                .with_attribute("planName", "standard"),
            Some(PriceFilter::unit("OUTBOUND_DIGITAL_MESSAGES_PUSH")),
            dec!(0.0002),
        )
    }

    fn resources() -> Vec<Box<dyn CostResource>> {
        vec![
            Box::new(EnSubscriptionPush::new(
                "ibm_en_subscription_firefox.free",
                "us-south",
                "lite",
                PushDestination::Firefox,
            )),
            Box::new(EnSubscriptionPush::new(
                "ibm_en_subscription_chrome.paid",
                "us-south",
                "standard",
                PushDestination::Chrome,
            )),
            Box::new(EnInstance::new("ibm_en_instance.events", "us-south", "gold")),
        ]
    }

    fn usage() -> UsageFile {
        let mut file = UsageFile::default();
        for address in ["ibm_en_subscription_firefox.free", "ibm_en_subscription_chrome.paid"] {
            file.resource_usage.insert(
                address.to_string(),
                UsageData::new().with(PUSH_USAGE_KEY, 2500),
            );
        }
        file
    }

    #[test]
    fn test_resolve_all_binds_per_address() {
        let resolved = resolve_all(resources(), &usage());

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].cost_components[0].monthly_quantity, Some(dec!(1000)));
        assert_eq!(resolved[1].cost_components[0].monthly_quantity, Some(dec!(2500)));
        assert_eq!(resolved[2].cost_components[0].name, "Plan gold not found");
    }

    #[tokio::test]
    async fn test_evaluate_preserves_order_and_totals() {
        let evaluator = Evaluator::new(Arc::new(catalog()), settings(5_000));
        let report = evaluator.evaluate(resources(), &usage()).await.unwrap();

        let names: Vec<&str> = report.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "ibm_en_subscription_firefox.free",
                "ibm_en_subscription_chrome.paid",
                "ibm_en_instance.events",
            ]
        );

        assert_eq!(report.resources[0].monthly_cost, Decimal::ZERO);
        assert_eq!(report.resources[1].monthly_cost, dec!(0.5));
        assert_eq!(report.resources[2].monthly_cost, Decimal::ZERO);
        assert_eq!(report.total_monthly_cost, dec!(0.5));
        assert_eq!(report.unknown_cost_components, 0);
    }

    #[tokio::test]
    async fn test_missing_usage_is_reported_as_unknown_cost() {
        let evaluator = Evaluator::new(Arc::new(catalog()), settings(5_000));
        let report = evaluator
            .evaluate(resources(), &UsageFile::default())
            .await
            .unwrap();

        let paid = &report.resources[1];
        assert_eq!(paid.cost_components[0].component.monthly_quantity, None);
        assert_eq!(paid.cost_components[0].unit_price, Some(dec!(0.0002)));
        assert_eq!(paid.cost_components[0].monthly_cost, None);
        assert_eq!(paid.unknown_cost_components, 1);
        assert_eq!(paid.missing_usage_components, 1);
        assert_eq!(report.resources[0].missing_usage_components, 0);
        assert_eq!(report.unknown_cost_components, 1);
    }

    #[tokio::test]
    async fn test_unpriced_component_is_not_missing_usage() {
        let evaluator = Evaluator::new(Arc::new(InMemoryCatalog::new()), settings(5_000));
        let report = evaluator.evaluate(resources(), &usage()).await.unwrap();

        let paid = &report.resources[1];
        assert_eq!(paid.unknown_cost_components, 1);
        assert_eq!(paid.missing_usage_components, 0);
    }

    #[tokio::test]
    async fn test_parallelism_above_permit_limit_is_clamped() {
        let evaluator = Evaluator::new(
            Arc::new(catalog()),
            EvaluationSettings {
                timeout_ms: 5_000,
                max_parallel: usize::MAX,
            },
        );

        let report = evaluator.evaluate(resources(), &usage()).await.unwrap();
        assert_eq!(report.resources.len(), 3);
        assert_eq!(report.total_monthly_cost, dec!(0.5));
    }

    #[tokio::test]
    async fn test_empty_run() {
        let evaluator = Evaluator::new(Arc::new(InMemoryCatalog::new()), settings(5_000));
        let report = evaluator.evaluate(Vec::new(), &UsageFile::default()).await.unwrap();

        assert!(report.resources.is_empty());
        assert_eq!(report.total_monthly_cost, Decimal::ZERO);
    }

    /// Catalog that never answers in time
    struct StalledCatalog;

    #[async_trait]
    impl PriceCatalog for StalledCatalog {
        async fn unit_price(
            &self,
            _product: &ProductFilter,
            _price: Option<&PriceFilter>,
        ) -> Result<Option<Decimal>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_abandons_run() {
        let evaluator = Evaluator::new(Arc::new(StalledCatalog), settings(50));
        let result = evaluator.evaluate(resources(), &usage()).await;

        assert!(matches!(result, Err(MeterwiseError::Timeout(_))));
    }
}
