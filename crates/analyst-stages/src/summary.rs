//! Summary synthesis stage
//!
//! Consolidates the extraction and sentiment payloads into an executive
//! summary. The recommendation and confidence score are computed here so
//! they stay deterministic; only the narrative text comes from the
//! judgment provider.

use crate::prompts;
use analyst_core::model::{
    ExecutiveSummary, FinancialMetrics, Recommendation, Sentiment, SentimentAssessment, metrics,
};
use analyst_core::{AnalysisContext, Stage, StageError, StageName, StageOutcome, StagePayload};
use analyst_judgment::{JudgmentProvider, JudgmentRequest, tasks};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Sentiment confidence at which growth alone justifies a buy call
const BUY_CONFIDENCE_FLOOR: f64 = 0.7;

pub struct SummarySynthesisStage {
    judgment: Arc<dyn JudgmentProvider>,
}

impl SummarySynthesisStage {
    pub fn new(judgment: Arc<dyn JudgmentProvider>) -> Self {
        Self { judgment }
    }

    /// Deterministic recommendation policy over the two upstream payloads
    ///
    /// Buy needs growing revenue, positive sentiment, and either a growing
    /// EPS or a confident assessment. Sell needs shrinking revenue with
    /// negative sentiment. Everything else, including reports that state
    /// no revenue change, holds.
    fn recommend(financials: &FinancialMetrics, sentiment: &SentimentAssessment) -> Recommendation {
        let revenue_yoy = financials.yoy_change(metrics::REVENUE);
        let eps_growing = financials
            .yoy_change(metrics::EPS)
            .is_some_and(|change| change > 0.0);

        match (revenue_yoy, sentiment.overall_sentiment) {
            (Some(change), Sentiment::Positive)
                if change > 0.0 && (eps_growing || sentiment.confidence >= BUY_CONFIDENCE_FLOOR) =>
            {
                Recommendation::Buy
            }
            (Some(change), Sentiment::Negative) if change < 0.0 => Recommendation::Sell,
            _ => Recommendation::Hold,
        }
    }

    /// Confidence in the summary: bounded by the weaker of the sentiment
    /// confidence and metric coverage, nudged by trend agreement
    fn confidence_score(
        financials: &FinancialMetrics,
        sentiment: &SentimentAssessment,
    ) -> f64 {
        let base = sentiment.confidence.min(financials.coverage());
        let adjustment = match (
            financials.yoy_change(metrics::REVENUE),
            sentiment.overall_sentiment,
        ) {
            (Some(change), Sentiment::Positive) if change > 0.0 => 0.05,
            (Some(change), Sentiment::Negative) if change < 0.0 => 0.05,
            (Some(change), Sentiment::Positive) if change < 0.0 => -0.10,
            (Some(change), Sentiment::Negative) if change > 0.0 => -0.10,
            _ => 0.0,
        };
        (base + adjustment).clamp(0.0, 1.0)
    }

    /// The fact sheet sent to the judgment provider for narration
    fn fact_sheet(financials: &FinancialMetrics, sentiment: &SentimentAssessment) -> String {
        json!({
            "revenue_yoy": financials.yoy_change(metrics::REVENUE),
            "overall_sentiment": sentiment.overall_sentiment,
            "management_tone": sentiment.management_tone,
            "metric_count": financials.metrics.len(),
            "top_positive": sentiment.positive_indicators.first(),
            "top_risk": sentiment
                .risk_factors
                .first()
                .or_else(|| sentiment.negative_indicators.first()),
        })
        .to_string()
    }
}

#[async_trait]
impl Stage for SummarySynthesisStage {
    fn name(&self) -> StageName {
        StageName::SummarySynthesis
    }

    fn dependencies(&self) -> &'static [StageName] {
        &[StageName::DataExtraction, StageName::SentimentAnalysis]
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StageOutcome {
        let financials = ctx.financial_metrics().ok_or_else(|| {
            StageError::SynthesisFailed("extraction payload not available".to_string())
        })?;
        let sentiment = ctx.sentiment().ok_or_else(|| {
            StageError::SynthesisFailed("sentiment payload not available".to_string())
        })?;

        let recommendation = Self::recommend(financials, sentiment);
        let confidence_score = Self::confidence_score(financials, sentiment);

        let request = JudgmentRequest::new(
            tasks::SUMMARY_SYNTHESIS,
            prompts::SUMMARY_SYNTHESIS,
            Self::fact_sheet(financials, sentiment),
        );
        let response = self
            .judgment
            .judge(request)
            .await
            .map_err(|e| StageError::SynthesisFailed(e.to_string()))?;

        let headline = response.payload["headline"]
            .as_str()
            .ok_or_else(|| {
                StageError::SynthesisFailed("judgment payload is missing 'headline'".to_string())
            })?
            .to_string();
        let summary = response.payload["summary"]
            .as_str()
            .ok_or_else(|| {
                StageError::SynthesisFailed("judgment payload is missing 'summary'".to_string())
            })?
            .to_string();

        debug!(
            report = %ctx.report_identifier(),
            recommendation = %recommendation,
            confidence_score,
            "Summary synthesis complete"
        );
        Ok(StagePayload::Summary(ExecutiveSummary {
            headline,
            summary,
            recommendation,
            confidence_score,
        }))
    }
}
