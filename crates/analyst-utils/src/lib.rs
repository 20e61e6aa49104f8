//! Shared utilities for the earnings analysis pipeline

pub mod config;
pub mod logging;

pub use config::AnalysisSettings;
pub use logging::init_tracing;
