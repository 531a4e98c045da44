//! Meterwise configuration
//!
//! Layered: built-in defaults, then an optional `meterwise.*` file in the
//! working directory, then `METERWISE__*` environment variables
//! (e.g. `METERWISE__EVALUATION__TIMEOUT_MS=5000`).

use config::{Config, Environment, File};
use meterwise_common::{MeterwiseError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

/// Default run timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default bound on concurrently evaluated resources
pub const DEFAULT_MAX_PARALLEL: usize = 16;

/// Meterwise configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterwiseConfig {
    pub evaluation: EvaluationSettings,
    pub inputs: InputSettings,
    pub output: OutputSettings,
}

impl MeterwiseConfig {
    /// Load configuration from defaults, file and environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let settings = Config::builder()
            .add_source(File::with_name("meterwise").required(false))
            .add_source(
                Environment::with_prefix("METERWISE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.evaluation.max_parallel == 0 {
            return Err(MeterwiseError::Config(
                "evaluation.max_parallel must be at least 1".into(),
            ));
        }
        if self.evaluation.max_parallel > Semaphore::MAX_PERMITS {
            return Err(MeterwiseError::Config(format!(
                "evaluation.max_parallel must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.evaluation.timeout_ms == 0 {
            return Err(MeterwiseError::Config(
                "evaluation.timeout_ms must be positive".into(),
            ));
        }
        if self.inputs.resources_path.is_empty() {
            return Err(MeterwiseError::Config(
                "inputs.resources_path is required".into(),
            ));
        }
        Ok(())
    }
}

/// Evaluation run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Caller-level timeout for a whole run
    pub timeout_ms: u64,
    /// Maximum resources evaluated at once
    pub max_parallel: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

/// Input file locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// JSON array of resource definitions
    pub resources_path: String,
    /// Usage file; no usage is declared when unset
    pub usage_path: Option<String>,
    /// Price catalog; every catalog lookup misses when unset
    pub catalog_path: Option<String>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            resources_path: "resources.json".to_string(),
            usage_path: None,
            catalog_path: None,
        }
    }
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = MeterwiseConfig::default();
        assert_eq!(cfg.evaluation.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.evaluation.max_parallel, DEFAULT_MAX_PARALLEL);
        assert_eq!(cfg.inputs.resources_path, "resources.json");
        assert!(cfg.output.pretty);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let settings = Config::builder()
            .add_source(File::from_str(
                r#"{"evaluation": {"max_parallel": 4}, "inputs": {"usage_path": "usage.json"}}"#,
                config::FileFormat::Json,
            ))
            .build()
            .unwrap();
        let cfg: MeterwiseConfig = settings.try_deserialize().unwrap();

        assert_eq!(cfg.evaluation.max_parallel, 4);
        assert_eq!(cfg.evaluation.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.inputs.usage_path.as_deref(), Some("usage.json"));
        assert_eq!(cfg.inputs.resources_path, "resources.json");
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let mut cfg = MeterwiseConfig::default();
        cfg.evaluation.max_parallel = 0;
        assert!(matches!(cfg.validate(), Err(MeterwiseError::Config(_))));
    }

    #[test]
    fn test_parallelism_above_permit_limit_rejected() {
        let mut cfg = MeterwiseConfig::default();
        cfg.evaluation.max_parallel = usize::MAX;
        assert!(matches!(cfg.validate(), Err(MeterwiseError::Config(_))));

        cfg.evaluation.max_parallel = Semaphore::MAX_PERMITS;
        assert!(cfg.validate().is_ok());
    }
}
