//! Evaluation module
//!
//! Drives bind → resolve → price over many resources.

pub mod runner;

pub use runner::{resolve_all, resolve_resource, EvaluationReport, Evaluator, ResourceBreakdown};
