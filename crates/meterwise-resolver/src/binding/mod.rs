//! Usage binding
//!
//! Merges declared usage into typed resources before resolution.

pub mod binder;

pub use binder::{bind, UsageBinding, UsageBound, UsageSetter};
