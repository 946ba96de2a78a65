//! Configuration for inlining runs.
//!
//! Provides the `InlinerConfig` struct and its fluent builder with
//! documented defaults.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::InlinerConfigBuilder;
pub use types::InlinerConfig;
