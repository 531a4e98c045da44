//! Meterwise
//!
//! Resolves and prices the configured resources, then prints the report.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meterwise_common::{UsageFile, VERSION};
use meterwise_resolver::{
    build_all, load_definitions, Evaluator, InMemoryCatalog, MeterwiseConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Meterwise v{}", VERSION);

    let config = MeterwiseConfig::load().context("Failed to load configuration")?;

    let definitions = load_definitions(&config.inputs.resources_path).with_context(|| {
        format!(
            "Failed to load resource definitions from {}",
            config.inputs.resources_path
        )
    })?;
    let resources = build_all(&definitions);
    if resources.len() < definitions.len() {
        warn!(
            skipped = definitions.len() - resources.len(),
            "Some resources could not be built"
        );
    }

    let usage = match &config.inputs.usage_path {
        Some(path) => UsageFile::load(path)
            .with_context(|| format!("Failed to load usage file {}", path))?,
        None => UsageFile::default(),
    };

    let catalog = match &config.inputs.catalog_path {
        Some(path) => InMemoryCatalog::load(path)?,
        None => {
            warn!("No price catalog configured, metered components stay unpriced");
            InMemoryCatalog::new()
        }
    };

    let evaluator = Evaluator::new(Arc::new(catalog), config.evaluation.clone());
    let report = evaluator.evaluate(resources, &usage).await?;

    let rendered = if config.output.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", rendered);

    Ok(())
}
