//! Uniform stage result envelope

use crate::model::{ExecutiveSummary, FinancialMetrics, SentimentAssessment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The three payload-producing stages, in fixed pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    DataExtraction,
    SentimentAnalysis,
    SummarySynthesis,
}

impl StageName {
    /// Fixed execution order of the pipeline
    pub const PIPELINE_ORDER: [StageName; 3] = [
        StageName::DataExtraction,
        StageName::SentimentAnalysis,
        StageName::SummarySynthesis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::DataExtraction => "data_extraction",
            StageName::SentimentAnalysis => "sentiment_analysis",
            StageName::SummarySynthesis => "summary_synthesis",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Ok,
    Failed,
}

/// Stage-specific structured output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StagePayload {
    FinancialMetrics(FinancialMetrics),
    Sentiment(SentimentAssessment),
    Summary(ExecutiveSummary),
}

impl StagePayload {
    pub fn as_financial_metrics(&self) -> Option<&FinancialMetrics> {
        match self {
            StagePayload::FinancialMetrics(metrics) => Some(metrics),
            _ => None,
        }
    }

    pub fn as_sentiment(&self) -> Option<&SentimentAssessment> {
        match self {
            StagePayload::Sentiment(assessment) => Some(assessment),
            _ => None,
        }
    }

    pub fn as_summary(&self) -> Option<&ExecutiveSummary> {
        match self {
            StagePayload::Summary(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Uniform envelope every stage execution produces exactly once
///
/// Invariant: `payload` is present iff `status` is `Ok`. The constructors
/// are the only way the crate builds one, so the invariant holds by
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_name: StageName,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<StagePayload>,
    /// Attempts made before success or final failure (1-based)
    pub attempt_count: u32,
    /// Wall-clock time of the final attempt
    pub duration: Duration,
}

impl StageResult {
    /// Build a successful result carrying the stage payload
    pub fn ok(
        stage_name: StageName,
        payload: StagePayload,
        attempt_count: u32,
        duration: Duration,
    ) -> Self {
        Self {
            stage_name,
            status: StageStatus::Ok,
            payload: Some(payload),
            attempt_count,
            duration,
        }
    }

    /// Build a failed result with no payload
    pub fn failed(stage_name: StageName, attempt_count: u32, duration: Duration) -> Self {
        Self {
            stage_name,
            status: StageStatus::Failed,
            payload: None,
            attempt_count,
            duration,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StageStatus::Ok
    }
}
