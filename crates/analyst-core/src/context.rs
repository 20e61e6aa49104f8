//! Per-request analysis context
//!
//! The `AnalysisContext` is the mutable state threaded through one pipeline
//! run. The Coordinator exclusively owns and mutates it; stages receive a
//! shared reference and report their own result through their return value,
//! so no stage can touch a prior stage's output.

use crate::model::{FinancialMetrics, SentimentAssessment};
use crate::report::StageFailure;
use crate::result::{StageName, StageResult};

#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Raw report content, set once at pipeline start
    source_text: String,
    /// Opaque correlation id for this run, never mutated
    report_identifier: String,
    /// One entry per executed stage; insertion order = execution order
    stage_outputs: Vec<StageResult>,
    /// Append-only record of failures encountered
    errors: Vec<StageFailure>,
}

impl AnalysisContext {
    pub fn new(source_text: impl Into<String>, report_identifier: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            report_identifier: report_identifier.into(),
            stage_outputs: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn report_identifier(&self) -> &str {
        &self.report_identifier
    }

    pub fn stage_outputs(&self) -> &[StageResult] {
        &self.stage_outputs
    }

    pub fn errors(&self) -> &[StageFailure] {
        &self.errors
    }

    /// Append a stage's result; entries are immutable once written
    pub fn record_output(&mut self, result: StageResult) {
        debug_assert!(
            self.output(result.stage_name).is_none(),
            "stage '{}' already recorded an output",
            result.stage_name
        );
        self.stage_outputs.push(result);
    }

    /// Append a failure entry for a stage
    pub fn record_error(&mut self, stage_name: StageName, message: impl Into<String>) {
        self.errors.push(StageFailure {
            stage_name,
            message: message.into(),
        });
    }

    /// The recorded result for a stage, if it has executed
    pub fn output(&self, name: StageName) -> Option<&StageResult> {
        self.stage_outputs
            .iter()
            .find(|result| result.stage_name == name)
    }

    /// Whether a stage has executed and succeeded
    pub fn completed(&self, name: StageName) -> bool {
        self.output(name).is_some_and(StageResult::is_ok)
    }

    /// Extraction payload, if the extraction stage succeeded
    pub fn financial_metrics(&self) -> Option<&FinancialMetrics> {
        self.output(StageName::DataExtraction)
            .and_then(|result| result.payload.as_ref())
            .and_then(|payload| payload.as_financial_metrics())
    }

    /// Sentiment payload, if the sentiment stage succeeded
    pub fn sentiment(&self) -> Option<&SentimentAssessment> {
        self.output(StageName::SentimentAnalysis)
            .and_then(|result| result.payload.as_ref())
            .and_then(|payload| payload.as_sentiment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FinancialMetrics;
    use crate::result::StagePayload;
    use std::time::Duration;

    fn metrics_result() -> StageResult {
        StageResult::ok(
            StageName::DataExtraction,
            StagePayload::FinancialMetrics(FinancialMetrics::default()),
            1,
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_new_context_is_empty() {
        let ctx = AnalysisContext::new("Revenue of $31.2 billion", "run-1");
        assert_eq!(ctx.source_text(), "Revenue of $31.2 billion");
        assert_eq!(ctx.report_identifier(), "run-1");
        assert!(ctx.stage_outputs().is_empty());
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn test_record_and_lookup_output() {
        let mut ctx = AnalysisContext::new("text", "run-1");
        assert!(!ctx.completed(StageName::DataExtraction));

        ctx.record_output(metrics_result());
        assert!(ctx.completed(StageName::DataExtraction));
        assert!(ctx.financial_metrics().is_some());
        assert!(ctx.sentiment().is_none());
    }

    #[test]
    fn test_failed_output_is_not_completed() {
        let mut ctx = AnalysisContext::new("text", "run-1");
        ctx.record_output(StageResult::failed(
            StageName::DataExtraction,
            3,
            Duration::from_millis(9),
        ));

        assert!(ctx.output(StageName::DataExtraction).is_some());
        assert!(!ctx.completed(StageName::DataExtraction));
        assert!(ctx.financial_metrics().is_none());
    }

    #[test]
    fn test_errors_are_append_only_ordered() {
        let mut ctx = AnalysisContext::new("text", "run-1");
        ctx.record_error(StageName::SentimentAnalysis, "first");
        ctx.record_error(StageName::SummarySynthesis, "second");

        let errors = ctx.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].stage_name, StageName::SentimentAnalysis);
        assert_eq!(errors[1].message, "second");
    }
}
