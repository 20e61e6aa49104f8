//! Core abstractions for the earnings analysis pipeline
//!
//! This crate defines the fundamental traits and types shared by every part
//! of the pipeline: the `Stage` trait, the per-request `AnalysisContext`,
//! the uniform `StageResult` envelope, the stage payload data model and the
//! error taxonomy.

pub mod context;
pub mod error;
pub mod model;
pub mod report;
pub mod result;
pub mod stage;

pub use context::AnalysisContext;
pub use error::{PipelineError, StageError};
pub use model::{
    ExecutiveSummary, FinancialMetrics, GuidanceRange, MetricValue, Recommendation,
    SegmentPerformance, Sentiment, SentimentAssessment, Trend,
};
pub use report::{AnalysisReport, ReportData, ReportStatus, StageFailure};
pub use result::{StageName, StagePayload, StageResult, StageStatus};
pub use stage::{Stage, StageOutcome};
