//! Judgment capability abstraction for the earnings analysis pipeline
//!
//! A judgment provider turns `(task, instructions, input)` into a
//! structured JSON payload. Any concrete implementation satisfies the
//! pipeline: a hosted model behind an HTTP endpoint (`HttpJudgment`) or the
//! deterministic rule-based analyst (`HeuristicJudgment`) used for tests
//! and offline runs.

pub mod error;
pub mod heuristic;
pub mod provider;
pub mod providers;
pub mod request;

pub use error::{JudgmentError, Result};
pub use heuristic::HeuristicJudgment;
pub use provider::JudgmentProvider;
pub use providers::{HttpJudgment, HttpJudgmentConfig};
pub use request::{JudgmentRequest, JudgmentResponse, tasks};
