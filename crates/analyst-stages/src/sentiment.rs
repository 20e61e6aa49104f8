//! Sentiment analysis stage
//!
//! Assesses management tone from the report text. The assessment comes
//! from the judgment provider; the stage pre-checks that there is enough
//! commentary to judge, validates the answer, and reinforces the
//! confidence with the extraction stage's revenue trend when the two
//! agree or conflict.

use crate::prompts;
use analyst_core::model::{Sentiment, SentimentAssessment};
use analyst_core::{AnalysisContext, Stage, StageError, StageName, StageOutcome, StagePayload};
use analyst_judgment::{JudgmentProvider, JudgmentRequest, tasks};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Reports shorter than this carry too little commentary to assess
const MIN_COMMENTARY_WORDS: usize = 10;

/// Confidence adjustment when the revenue trend corroborates or
/// contradicts the assessed sentiment
const TREND_ADJUSTMENT: f64 = 0.05;

pub struct SentimentAnalysisStage {
    judgment: Arc<dyn JudgmentProvider>,
}

impl SentimentAnalysisStage {
    pub fn new(judgment: Arc<dyn JudgmentProvider>) -> Self {
        Self { judgment }
    }

    /// Nudge confidence toward the revenue trend: agreement reinforces,
    /// conflict undermines. The result stays inside [0.05, 0.95] so a
    /// single metric never makes the assessment certain or worthless.
    fn reinforce(assessment: &mut SentimentAssessment, revenue_yoy: Option<f64>) {
        let Some(change) = revenue_yoy else {
            return;
        };
        let adjustment = match (assessment.overall_sentiment, change) {
            (Sentiment::Positive, c) if c > 0.0 => TREND_ADJUSTMENT,
            (Sentiment::Negative, c) if c < 0.0 => TREND_ADJUSTMENT,
            (Sentiment::Positive, c) if c < 0.0 => -TREND_ADJUSTMENT,
            (Sentiment::Negative, c) if c > 0.0 => -TREND_ADJUSTMENT,
            _ => return,
        };
        assessment.confidence = (assessment.confidence + adjustment).clamp(0.05, 0.95);
    }
}

#[async_trait]
impl Stage for SentimentAnalysisStage {
    fn name(&self) -> StageName {
        StageName::SentimentAnalysis
    }

    fn dependencies(&self) -> &'static [StageName] {
        &[StageName::DataExtraction]
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StageOutcome {
        let text = ctx.source_text();
        let word_count = text.split_whitespace().count();
        if word_count < MIN_COMMENTARY_WORDS {
            return Err(StageError::InsufficientSignal(format!(
                "report has {word_count} words, need at least {MIN_COMMENTARY_WORDS}"
            )));
        }

        let request =
            JudgmentRequest::new(tasks::SENTIMENT_ANALYSIS, prompts::SENTIMENT_ANALYSIS, text);
        let response = self
            .judgment
            .judge(request)
            .await
            .map_err(|e| StageError::SentimentFailed(e.to_string()))?;

        let mut assessment: SentimentAssessment = serde_json::from_value(response.payload)
            .map_err(|e| StageError::SentimentFailed(format!("malformed assessment: {e}")))?;
        assessment.confidence = assessment.confidence.clamp(0.0, 1.0);

        let revenue_yoy = ctx
            .financial_metrics()
            .and_then(|m| m.yoy_change(analyst_core::model::metrics::REVENUE));
        Self::reinforce(&mut assessment, revenue_yoy);

        debug!(
            report = %ctx.report_identifier(),
            sentiment = %assessment.overall_sentiment,
            confidence = assessment.confidence,
            "Sentiment assessment complete"
        );
        Ok(StagePayload::Sentiment(assessment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::StageResult;
    use analyst_core::model::{FinancialMetrics, MetricValue, metrics};
    use analyst_judgment::{HeuristicJudgment, JudgmentError, JudgmentResponse};
    use mockall::mock;
    use std::time::Duration;

    mock! {
        Provider {}

        #[async_trait]
        impl JudgmentProvider for Provider {
            async fn judge(
                &self,
                request: JudgmentRequest,
            ) -> analyst_judgment::Result<JudgmentResponse>;
            async fn health_check(&self) -> analyst_judgment::Result<()>;
            fn name(&self) -> &str;
        }
    }

    fn stage() -> SentimentAnalysisStage {
        SentimentAnalysisStage::new(Arc::new(HeuristicJudgment::new()))
    }

    fn assessment(outcome: StageOutcome) -> SentimentAssessment {
        match outcome.unwrap() {
            StagePayload::Sentiment(assessment) => assessment,
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    fn ctx_with_revenue(text: &str, yoy_change: f64) -> AnalysisContext {
        let mut ctx = AnalysisContext::new(text, "run-1");
        let mut fm = FinancialMetrics::default();
        fm.metrics.insert(
            metrics::REVENUE.into(),
            MetricValue::new(31.2, Some(yoy_change)),
        );
        ctx.record_output(StageResult::ok(
            StageName::DataExtraction,
            StagePayload::FinancialMetrics(fm),
            1,
            Duration::from_millis(3),
        ));
        ctx
    }

    #[tokio::test]
    async fn test_positive_commentary_is_assessed_positive() {
        let ctx = AnalysisContext::new(
            "We achieved record revenue and outstanding growth this quarter. \
             Management is confident about the opportunity ahead.",
            "run-1",
        );
        let result = assessment(stage().execute(&ctx).await);

        assert_eq!(result.overall_sentiment, Sentiment::Positive);
        assert!(result.confidence > 0.5);
        assert!(!result.positive_indicators.is_empty());
    }

    #[tokio::test]
    async fn test_short_text_is_insufficient_signal() {
        let ctx = AnalysisContext::new("Revenue was fine.", "run-1");
        let err = stage().execute(&ctx).await.unwrap_err();
        assert!(matches!(err, StageError::InsufficientSignal(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_agreeing_revenue_trend_raises_confidence() {
        let text = "We achieved record revenue and outstanding growth this quarter. \
                    Management is confident about the opportunity ahead.";

        let without = assessment(stage().execute(&AnalysisContext::new(text, "a")).await);
        let with = assessment(stage().execute(&ctx_with_revenue(text, 0.12)).await);

        assert_eq!(with.overall_sentiment, Sentiment::Positive);
        assert!(with.confidence >= without.confidence);
    }

    #[tokio::test]
    async fn test_conflicting_revenue_trend_lowers_confidence() {
        let text = "We achieved record revenue and outstanding growth this quarter. \
                    Management is confident about the opportunity ahead.";

        let without = assessment(stage().execute(&AnalysisContext::new(text, "a")).await);
        let with = assessment(stage().execute(&ctx_with_revenue(text, -0.08)).await);

        assert!(with.confidence < without.confidence);
    }

    #[tokio::test]
    async fn test_provider_failure_is_transient() {
        let mut provider = MockProvider::new();
        provider
            .expect_judge()
            .returning(|_| Err(JudgmentError::RequestFailed("connection reset".into())));

        let stage = SentimentAnalysisStage::new(Arc::new(provider));
        let ctx = AnalysisContext::new(
            "A long enough report about revenue with many words of commentary to pass the check.",
            "run-1",
        );
        let err = stage.execute(&ctx).await.unwrap_err();
        assert!(matches!(err, StageError::SentimentFailed(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_reinforce_stays_inside_bounds() {
        let mut assessment = SentimentAssessment {
            overall_sentiment: Sentiment::Positive,
            confidence: 0.93,
            management_tone: "optimistic".into(),
            positive_indicators: vec![],
            negative_indicators: vec![],
            risk_factors: vec![],
        };
        SentimentAnalysisStage::reinforce(&mut assessment, Some(0.12));
        assert!((assessment.confidence - 0.95).abs() < f64::EPSILON);

        assessment.confidence = 0.07;
        SentimentAnalysisStage::reinforce(&mut assessment, Some(-0.08));
        assert!((assessment.confidence - 0.05).abs() < f64::EPSILON);

        // No stated change leaves confidence untouched
        assessment.confidence = 0.5;
        SentimentAnalysisStage::reinforce(&mut assessment, None);
        assert!((assessment.confidence - 0.5).abs() < f64::EPSILON);
    }
}
