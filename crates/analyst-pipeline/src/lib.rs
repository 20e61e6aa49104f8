//! Pipeline orchestration for the earnings analyst
//!
//! The `Coordinator` runs the three analysis stages in fixed order over a
//! shared `AnalysisContext`, enforcing dependencies, per-attempt timeouts
//! and a retry budget for transient failures, then assembles the final
//! `AnalysisReport`.

pub mod coordinator;
pub mod retry;

pub use coordinator::Coordinator;
pub use retry::RetryPolicy;
