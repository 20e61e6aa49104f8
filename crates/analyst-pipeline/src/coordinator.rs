//! Pipeline coordinator
//!
//! Owns one run of the analysis pipeline: input validation, fixed-order
//! stage sequencing with dependency checks, per-attempt timeouts, retry
//! of transient failures, and assembly of the final report. Stages never
//! see each other; all inter-stage data flows through the
//! `AnalysisContext` the Coordinator exclusively mutates.

use crate::retry::RetryPolicy;
use analyst_core::{
    AnalysisContext, AnalysisReport, PipelineError, ReportData, ReportStatus, Stage, StageError,
    StageResult,
};
use analyst_judgment::JudgmentProvider;
use analyst_stages::{DataExtractionStage, SentimentAnalysisStage, SummarySynthesisStage};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

pub struct Coordinator {
    /// Stages in execution order; each stage's dependencies precede it
    stages: Vec<Box<dyn Stage>>,
    retry: RetryPolicy,
    stage_timeout: Duration,
    cancelled: Arc<AtomicBool>,
}

impl Coordinator {
    /// Build the standard three-stage pipeline over one judgment provider
    pub fn new(judgment: Arc<dyn JudgmentProvider>) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(DataExtractionStage::new(Arc::clone(&judgment))),
            Box::new(SentimentAnalysisStage::new(Arc::clone(&judgment))),
            Box::new(SummarySynthesisStage::new(judgment)),
        ];
        Self::with_stages(stages, RetryPolicy::default(), Duration::from_secs(30))
    }

    /// Build a pipeline over an explicit stage list
    pub fn with_stages(
        stages: Vec<Box<dyn Stage>>,
        retry: RetryPolicy,
        stage_timeout: Duration,
    ) -> Self {
        Self {
            stages,
            retry,
            stage_timeout,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn stage_timeout(mut self, stage_timeout: Duration) -> Self {
        self.stage_timeout = stage_timeout;
        self
    }

    /// Shared flag that aborts the run before the next stage attempt
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Run the full pipeline over one report text
    ///
    /// Always produces a report when the input is valid; stage failures
    /// degrade the report's status instead of failing the run.
    pub async fn run(
        &self,
        source_text: &str,
        report_identifier: &str,
    ) -> Result<AnalysisReport, PipelineError> {
        if source_text.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "source text is empty".to_string(),
            ));
        }

        info!(report = %report_identifier, "Starting analysis");
        let mut ctx = AnalysisContext::new(source_text, report_identifier);
        let mut busy = Duration::ZERO;

        for stage in &self.stages {
            let name = stage.name();

            if self.cancelled.load(Ordering::SeqCst) {
                warn!(stage = %name, "Analysis cancelled");
                ctx.record_error(name, "analysis cancelled before execution");
                continue;
            }

            if let Some(unmet) = stage
                .dependencies()
                .iter()
                .find(|dep| !ctx.completed(**dep))
            {
                let err = StageError::DependencySkipped { dependency: *unmet };
                warn!(stage = %name, dependency = %unmet, "Skipping stage");
                ctx.record_error(name, err.to_string());
                continue;
            }

            busy += self.run_stage(stage.as_ref(), &mut ctx).await;
        }

        let report = self.assemble(&ctx, busy);
        info!(
            report = %report_identifier,
            status = ?report.status,
            stages_completed = report.agents_executed.len(),
            "Analysis finished"
        );
        Ok(report)
    }

    /// Execute one stage with the retry budget; returns time spent in
    /// attempts (backoff sleeps excluded)
    async fn run_stage(&self, stage: &dyn Stage, ctx: &mut AnalysisContext) -> Duration {
        let name = stage.name();
        let mut busy = Duration::ZERO;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            let outcome = match timeout(self.stage_timeout, stage.execute(ctx)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(StageError::Timeout(self.stage_timeout)),
            };
            let duration = started.elapsed();
            busy += duration;

            match outcome {
                Ok(payload) => {
                    debug!(stage = %name, attempt, ?duration, "Stage completed");
                    ctx.record_output(StageResult::ok(name, payload, attempt, duration));
                    return busy;
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    let backoff = self.retry.backoff_duration(attempt);
                    warn!(stage = %name, attempt, error = %err, ?backoff, "Stage attempt failed, retrying");
                    sleep(backoff).await;
                    if self.cancelled.load(Ordering::SeqCst) {
                        warn!(stage = %name, "Analysis cancelled during retry");
                        ctx.record_error(name, "analysis cancelled before execution");
                        ctx.record_output(StageResult::failed(name, attempt, duration));
                        return busy;
                    }
                }
                Err(err) => {
                    warn!(stage = %name, attempt, error = %err, "Stage failed");
                    ctx.record_error(name, err.to_string());
                    ctx.record_output(StageResult::failed(name, attempt, duration));
                    return busy;
                }
            }
        }
    }

    /// Assemble the final report from whatever the stages produced
    fn assemble(&self, ctx: &AnalysisContext, busy: Duration) -> AnalysisReport {
        let mut data = ReportData::default();
        if let Some(metrics) = ctx.financial_metrics() {
            data.financial_metrics = Some(metrics.metrics.clone());
            if !metrics.segment_performance.is_empty() {
                data.segment_performance = Some(metrics.segment_performance.clone());
            }
            if !metrics.forward_guidance.is_empty() {
                data.forward_guidance = Some(metrics.forward_guidance.clone());
            }
        }
        data.sentiment_analysis = ctx.sentiment().cloned();
        data.executive_summary = ctx
            .stage_outputs()
            .iter()
            .filter_map(|result| result.payload.as_ref())
            .find_map(|payload| payload.as_summary())
            .cloned();

        let agents_executed: Vec<_> = ctx
            .stage_outputs()
            .iter()
            .filter(|result| result.is_ok())
            .map(|result| result.stage_name)
            .collect();

        let status = if agents_executed.len() == self.stages.len() {
            ReportStatus::Success
        } else if agents_executed.is_empty() {
            ReportStatus::Failed
        } else {
            ReportStatus::Partial
        };

        AnalysisReport {
            analysis_id: format!(
                "{}-{}",
                ctx.report_identifier(),
                Utc::now().timestamp_millis()
            ),
            status,
            data,
            agents_executed,
            processing_time: busy.as_secs_f64(),
            errors: ctx.errors().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::model::Recommendation;
    use analyst_core::{FinancialMetrics, StageName, StageOutcome, StagePayload};
    use analyst_judgment::HeuristicJudgment;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;

    const SAMPLE_REPORT: &str = "\
        TechCorp reported third quarter results that exceeded expectations. \
        Revenue of $31.2 billion, up 12% year-over-year, an outstanding result. \
        Net income of $8.4 billion, up 15%. EPS of $2.45, up 18%. \
        Operating margin was 28.5%. Free cash flow of $9.8 billion, up 7%. \
        The Cloud segment posted revenue of $12.5 billion and grew 34% on strong \
        demand and record growth. The Hardware division posted revenue of $6.1 \
        billion and declined 8% amid saturation concerns. \
        For Q4 we expect revenue of $16.0 to 16.5 billion. \
        Management remains confident despite macroeconomic uncertainty and \
        increasing competition.";

    fn coordinator() -> Coordinator {
        Coordinator::new(Arc::new(HeuristicJudgment::new()))
            .retry_policy(RetryPolicy::fast())
    }

    /// Stage that fails transiently a fixed number of times, then succeeds
    struct FlakyStage {
        failures: AtomicU32,
        calls: Arc<AtomicU32>,
    }

    impl FlakyStage {
        fn new(failures: u32, calls: Arc<AtomicU32>) -> Self {
            Self {
                failures: AtomicU32::new(failures),
                calls,
            }
        }
    }

    #[async_trait]
    impl Stage for FlakyStage {
        fn name(&self) -> StageName {
            StageName::DataExtraction
        }

        fn dependencies(&self) -> &'static [StageName] {
            &[]
        }

        async fn execute(&self, _ctx: &AnalysisContext) -> StageOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StageError::ExtractionFailed("connection reset".into()));
            }
            Ok(StagePayload::FinancialMetrics(FinancialMetrics::default()))
        }
    }

    /// Stage that records the extraction stage's result envelope as seen
    /// through the shared context
    struct RecordingStage {
        seen: Arc<Mutex<Option<(u32, bool)>>>,
    }

    #[async_trait]
    impl Stage for RecordingStage {
        fn name(&self) -> StageName {
            StageName::SentimentAnalysis
        }

        fn dependencies(&self) -> &'static [StageName] {
            &[]
        }

        async fn execute(&self, ctx: &AnalysisContext) -> StageOutcome {
            let upstream = ctx
                .output(StageName::DataExtraction)
                .expect("extraction runs first");
            *self.seen.lock().expect("lock poisoned") =
                Some((upstream.attempt_count, upstream.is_ok()));
            Ok(StagePayload::FinancialMetrics(FinancialMetrics::default()))
        }
    }

    /// Stage that never answers within any timeout
    struct StallingStage;

    #[async_trait]
    impl Stage for StallingStage {
        fn name(&self) -> StageName {
            StageName::DataExtraction
        }

        fn dependencies(&self) -> &'static [StageName] {
            &[]
        }

        async fn execute(&self, _ctx: &AnalysisContext) -> StageOutcome {
            sleep(Duration::from_secs(3600)).await;
            unreachable!("stalling stage never completes")
        }
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let err = coordinator().run("   \n\t  ", "run-1").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_full_pipeline_success() {
        let report = coordinator().run(SAMPLE_REPORT, "run-1").await.unwrap();

        assert_eq!(report.status, ReportStatus::Success);
        assert_eq!(report.agents_executed, StageName::PIPELINE_ORDER);
        assert!(report.errors.is_empty());
        assert!(report.analysis_id.starts_with("run-1-"));
        assert!(report.processing_time >= 0.0);

        let metrics = report.data.financial_metrics.unwrap();
        assert_eq!(metrics["revenue"].value, 31.2);
        assert_eq!(metrics["revenue"].yoy_change, Some(0.12));
        assert!(report.data.segment_performance.unwrap().contains_key("Cloud"));
        assert!(report.data.forward_guidance.unwrap().contains_key("q4"));

        let summary = report.data.executive_summary.unwrap();
        assert_eq!(summary.recommendation, Recommendation::Buy);
        assert!(summary.confidence_score > 0.0);
    }

    #[tokio::test]
    async fn test_reports_are_deterministic() {
        let first = coordinator().run(SAMPLE_REPORT, "run-1").await.unwrap();
        let second = coordinator().run(SAMPLE_REPORT, "run-1").await.unwrap();

        // Identity and timing vary per run; the analysis itself must not
        assert_eq!(
            serde_json::to_value(&first.data).unwrap(),
            serde_json::to_value(&second.data).unwrap()
        );
        assert_eq!(first.agents_executed, second.agents_executed);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_to_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let coordinator = Coordinator::with_stages(
            vec![Box::new(FlakyStage::new(1, Arc::clone(&calls)))],
            RetryPolicy::fast(),
            Duration::from_secs(5),
        );
        let report = coordinator.run("some report text", "run-1").await.unwrap();

        assert_eq!(report.status, ReportStatus::Success);
        assert_eq!(report.agents_executed, vec![StageName::DataExtraction]);
        assert!(report.errors.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_budget_is_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let coordinator = Coordinator::with_stages(
            vec![Box::new(FlakyStage::new(10, Arc::clone(&calls)))],
            RetryPolicy::fast(),
            Duration::from_secs(5),
        );
        let report = coordinator.run("some report text", "run-1").await.unwrap();

        assert_eq!(report.status, ReportStatus::Failed);
        assert!(report.agents_executed.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].stage_name, StageName::DataExtraction);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stage_result_carries_attempt_count() {
        // Exhausted budget: the failed envelope reads attempt 3
        let seen = Arc::new(Mutex::new(None));
        let coordinator = Coordinator::with_stages(
            vec![
                Box::new(FlakyStage::new(10, Arc::new(AtomicU32::new(0)))),
                Box::new(RecordingStage {
                    seen: Arc::clone(&seen),
                }),
            ],
            RetryPolicy::fast(),
            Duration::from_secs(5),
        );
        coordinator.run("some report text", "run-1").await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some((3, false)));

        // Recovery on the second try: the ok envelope reads attempt 2
        let seen = Arc::new(Mutex::new(None));
        let coordinator = Coordinator::with_stages(
            vec![
                Box::new(FlakyStage::new(1, Arc::new(AtomicU32::new(0)))),
                Box::new(RecordingStage {
                    seen: Arc::clone(&seen),
                }),
            ],
            RetryPolicy::fast(),
            Duration::from_secs(5),
        );
        coordinator.run("some report text", "run-1").await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some((2, true)));
    }

    #[tokio::test]
    async fn test_partial_report_on_midstream_failure() {
        // Six words: enough for extraction, too little commentary for
        // the sentiment stage, which fails non-transiently
        let report = coordinator()
            .run("Revenue of $31.2 billion, up 12%.", "run-1")
            .await
            .unwrap();

        assert_eq!(report.status, ReportStatus::Partial);
        assert_eq!(report.agents_executed, vec![StageName::DataExtraction]);
        assert!(report.data.financial_metrics.is_some());
        assert!(report.data.sentiment_analysis.is_none());
        assert!(report.data.executive_summary.is_none());

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].stage_name, StageName::SentimentAnalysis);
        assert!(report.errors[0].message.contains("insufficient signal"));
        assert_eq!(report.errors[1].stage_name, StageName::SummarySynthesis);
        assert!(report.errors[1].message.contains("sentiment_analysis"));
    }

    #[tokio::test]
    async fn test_failed_first_stage_skips_downstream() {
        // No financial section at all, so extraction fails non-transiently
        let report = coordinator()
            .run("A long meandering essay with no numbers in it whatsoever today.", "run-1")
            .await
            .unwrap();

        assert_eq!(report.status, ReportStatus::Failed);
        assert!(report.agents_executed.is_empty());

        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.errors[0].stage_name, StageName::DataExtraction);
        assert_eq!(report.errors[1].stage_name, StageName::SentimentAnalysis);
        assert!(report.errors[1].message.contains("data_extraction"));
        assert_eq!(report.errors[2].stage_name, StageName::SummarySynthesis);
    }

    #[tokio::test]
    async fn test_stage_timeout_is_enforced() {
        let coordinator = Coordinator::with_stages(
            vec![Box::new(StallingStage)],
            RetryPolicy::no_retry(),
            Duration::from_millis(20),
        );
        let report = coordinator.run("some report text", "run-1").await.unwrap();

        assert_eq!(report.status, ReportStatus::Failed);
        assert!(report.errors[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_cancellation_skips_stages() {
        let coordinator = coordinator();
        coordinator.cancel_flag().store(true, Ordering::SeqCst);

        let report = coordinator.run(SAMPLE_REPORT, "run-1").await.unwrap();
        assert_eq!(report.status, ReportStatus::Failed);
        assert!(report.agents_executed.is_empty());
        assert!(report.errors.iter().all(|e| e.message.contains("cancelled")));
    }
}
