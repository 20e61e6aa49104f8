//! Terminal report artifact assembled by the Coordinator

use crate::model::{
    ExecutiveSummary, GuidanceRange, MetricValue, SegmentPerformance, SentimentAssessment,
};
use crate::result::StageName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// All three stages completed
    Success,
    /// At least one stage completed, but not all
    Partial,
    /// No stage completed
    Failed,
}

/// One terminal failure entry, in the order failures occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage_name: StageName,
    pub message: String,
}

/// Payload sections contributed by successfully-completed stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReportData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_metrics: Option<BTreeMap<String, MetricValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_performance: Option<BTreeMap<String, SegmentPerformance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_guidance: Option<BTreeMap<String, GuidanceRange>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<SentimentAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<ExecutiveSummary>,
}

/// Final artifact of one pipeline run
///
/// Created fresh per invocation and discarded after the caller consumes it;
/// nothing is persisted across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Derived from the report identifier and the completion time
    pub analysis_id: String,
    pub status: ReportStatus,
    pub data: ReportData,
    /// Stages that reached ok status, in execution order
    pub agents_executed: Vec<StageName>,
    /// Total pipeline wall-clock in seconds, summed over every attempt
    pub processing_time: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<StageFailure>,
}
