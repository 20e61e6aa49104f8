//! Error taxonomy for the analysis pipeline

use crate::result::StageName;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by an individual stage
///
/// Each variant is classified as transient (eligible for retry) or
/// non-transient (inherent to the input, never retried). The classification
/// is owned by this type so the Coordinator's retry loop stays generic.
#[derive(Debug, Error)]
pub enum StageError {
    /// Data extraction failed on the upstream judgment call (transient)
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// The text has no recognizable financial section (non-transient)
    #[error("unparseable report: {0}")]
    UnparseableReport(String),

    /// Sentiment analysis failed on the upstream judgment call (transient)
    #[error("sentiment analysis failed: {0}")]
    SentimentFailed(String),

    /// The text has no extractable commentary (non-transient)
    #[error("insufficient signal: {0}")]
    InsufficientSignal(String),

    /// Summary synthesis failed on the upstream judgment call (transient)
    #[error("summary synthesis failed: {0}")]
    SynthesisFailed(String),

    /// A stage attempt exceeded its time budget (transient)
    #[error("stage timed out after {0:?}")]
    Timeout(Duration),

    /// Synthetic failure recorded for a stage whose prerequisite did not
    /// complete; never independently retried
    #[error("skipped because dependency '{dependency}' did not complete")]
    DependencySkipped { dependency: StageName },
}

impl StageError {
    /// Whether retrying the same stage unchanged could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StageError::ExtractionFailed(_)
                | StageError::SentimentFailed(_)
                | StageError::SynthesisFailed(_)
                | StageError::Timeout(_)
        )
    }
}

/// Errors that terminate a run before any stage executes
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Empty or malformed source text; the pipeline never starts
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
