//! Stage payload data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical metric names recognized by the extraction stage
pub mod metrics {
    pub const REVENUE: &str = "revenue";
    pub const NET_INCOME: &str = "net_income";
    pub const EPS: &str = "eps";
    pub const OPERATING_MARGIN: &str = "operating_margin";
    pub const FREE_CASH_FLOW: &str = "free_cash_flow";

    pub const ALL: [&str; 5] = [REVENUE, NET_INCOME, EPS, OPERATING_MARGIN, FREE_CASH_FLOW];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

/// A single extracted metric with its stated year-over-year change
///
/// `yoy_change` is a fraction (0.12, not 12). `None` means the report did
/// not state a change, which is distinct from a stated change of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yoy_change: Option<f64>,
    pub trend: Trend,
}

impl MetricValue {
    /// Build a metric value, deriving the trend from the change sign
    pub fn new(value: f64, yoy_change: Option<f64>) -> Self {
        let trend = match yoy_change {
            Some(change) if change > 0.0 => Trend::Positive,
            Some(change) if change < 0.0 => Trend::Negative,
            _ => Trend::Neutral,
        };
        Self {
            value,
            yoy_change,
            trend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPerformance {
    pub revenue: f64,
    pub growth_rate: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
}

/// Guidance ranges for one forward period, as `[low, high]` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GuidanceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps_range: Option<[f64; 2]>,
}

/// Payload of the data extraction stage
///
/// Metrics not found in the report are omitted from the maps, never
/// zero-filled. BTreeMap keeps serialized output deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FinancialMetrics {
    pub metrics: BTreeMap<String, MetricValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub segment_performance: BTreeMap<String, SegmentPerformance>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub forward_guidance: BTreeMap<String, GuidanceRange>,
}

impl FinancialMetrics {
    /// Fraction of recognized metric labels actually found in the report
    pub fn coverage(&self) -> f64 {
        let found = metrics::ALL
            .iter()
            .filter(|name| self.metrics.contains_key(**name))
            .count();
        found as f64 / metrics::ALL.len() as f64
    }

    /// Stated year-over-year change for a metric, if the report gave one
    pub fn yoy_change(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(|m| m.yoy_change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Payload of the sentiment analysis stage
///
/// Indicator lists preserve the order indicators appear in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAssessment {
    pub overall_sentiment: Sentiment,
    pub confidence: f64,
    pub management_tone: String,
    pub positive_indicators: Vec<String>,
    pub negative_indicators: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::Sell => write!(f, "SELL"),
        }
    }
}

/// Payload of the summary synthesis stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub headline: String,
    pub summary: String,
    pub recommendation: Recommendation,
    pub confidence_score: f64,
}
