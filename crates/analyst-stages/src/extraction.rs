//! Data extraction stage
//!
//! Turns raw report text into `FinancialMetrics`. The stage pre-checks
//! that the text has a recognizable financial section (non-transient
//! failure otherwise), delegates the scan to the judgment provider, and
//! validates/normalizes the structured answer.

use crate::{normalize, prompts};
use analyst_core::model::{FinancialMetrics, GuidanceRange, MetricValue, SegmentPerformance};
use analyst_core::{AnalysisContext, Stage, StageError, StageName, StageOutcome, StagePayload};
use analyst_judgment::{JudgmentProvider, JudgmentRequest, tasks};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Labels whose presence marks a financial section
const SECTION_MARKERS: [&str; 6] = [
    "revenue",
    "net income",
    "eps",
    "earnings per share",
    "operating margin",
    "free cash flow",
];

pub struct DataExtractionStage {
    judgment: Arc<dyn JudgmentProvider>,
}

impl DataExtractionStage {
    pub fn new(judgment: Arc<dyn JudgmentProvider>) -> Self {
        Self { judgment }
    }

    /// A report is parseable when it names at least one recognized metric
    /// and carries at least one digit
    fn has_financial_section(text: &str) -> bool {
        let lower = text.to_lowercase();
        let has_label = SECTION_MARKERS.iter().any(|label| lower.contains(label));
        let has_digit = lower.bytes().any(|b| b.is_ascii_digit());
        has_label && has_digit
    }

    /// Validate and normalize the provider's structured answer
    fn parse_payload(payload: &Value) -> Result<FinancialMetrics, StageError> {
        let mut result = FinancialMetrics::default();

        let metrics = payload
            .get("metrics")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                StageError::ExtractionFailed("judgment payload is missing 'metrics'".to_string())
            })?;
        for (name, entry) in metrics {
            let Some(value) = normalize::as_number(entry.get("value")) else {
                return Err(StageError::ExtractionFailed(format!(
                    "metric '{name}' has no numeric value"
                )));
            };
            let yoy_change = normalize::as_fraction(entry.get("yoy_change"));
            result
                .metrics
                .insert(name.clone(), MetricValue::new(value, yoy_change));
        }

        if let Some(segments) = payload.get("segment_performance").and_then(Value::as_object) {
            for (name, entry) in segments {
                let Some(revenue) = normalize::as_number(entry.get("revenue")) else {
                    continue;
                };
                let growth_rate = normalize::as_fraction(entry.get("growth_rate")).unwrap_or(0.0);
                let mut segment_metrics = BTreeMap::new();
                if let Some(extra) = entry.get("metrics").and_then(Value::as_object) {
                    for (key, value) in extra {
                        if let Some(number) = normalize::as_number(Some(value)) {
                            segment_metrics.insert(key.clone(), number);
                        }
                    }
                }
                result.segment_performance.insert(
                    name.clone(),
                    SegmentPerformance {
                        revenue,
                        growth_rate,
                        metrics: segment_metrics,
                    },
                );
            }
        }

        if let Some(guidance) = payload.get("forward_guidance").and_then(Value::as_object) {
            for (period, entry) in guidance {
                let range = GuidanceRange {
                    revenue_range: normalize::as_range(entry.get("revenue_range")),
                    eps_range: normalize::as_range(entry.get("eps_range")),
                };
                if range.revenue_range.is_some() || range.eps_range.is_some() {
                    result.forward_guidance.insert(period.clone(), range);
                }
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl Stage for DataExtractionStage {
    fn name(&self) -> StageName {
        StageName::DataExtraction
    }

    fn dependencies(&self) -> &'static [StageName] {
        &[]
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StageOutcome {
        let text = ctx.source_text();
        if !Self::has_financial_section(text) {
            return Err(StageError::UnparseableReport(
                "text has no recognizable financial section".to_string(),
            ));
        }

        let request = JudgmentRequest::new(tasks::DATA_EXTRACTION, prompts::DATA_EXTRACTION, text);
        let response = self
            .judgment
            .judge(request)
            .await
            .map_err(|e| StageError::ExtractionFailed(e.to_string()))?;

        let metrics = Self::parse_payload(&response.payload)?;
        debug!(
            report = %ctx.report_identifier(),
            metrics = metrics.metrics.len(),
            segments = metrics.segment_performance.len(),
            "Extraction complete"
        );
        Ok(StagePayload::FinancialMetrics(metrics))
    }
}
