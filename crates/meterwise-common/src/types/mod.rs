//! Core data types for Meterwise

pub mod cost_component;
pub mod plan;
pub mod resource;
pub mod usage;
