//! Deterministic rule-based judgment provider
//!
//! `HeuristicJudgment` answers the same three tasks a hosted model would,
//! using regex scanning for financial facts and keyword scanning for tone.
//! It is deterministic: the same input always yields the same payload,
//! which makes it the reference test double for the pipeline and a usable
//! offline default for the CLI.

use crate::{JudgmentError, JudgmentProvider, JudgmentRequest, JudgmentResponse, Result, tasks};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::sync::OnceLock;
use tracing::debug;

/// Keywords signalling positive tone in earnings commentary
const POSITIVE_KEYWORDS: [&str; 15] = [
    "exceeded",
    "remarkable",
    "unprecedented",
    "strong",
    "outstanding",
    "thrilled",
    "growth",
    "substantial",
    "record",
    "success",
    "achieved",
    "improvement",
    "optimistic",
    "confident",
    "opportunity",
];

/// Keywords signalling negative tone or concern
const NEGATIVE_KEYWORDS: [&str; 14] = [
    "challenge",
    "uncertainty",
    "risk",
    "decline",
    "cautious",
    "concern",
    "headwind",
    "saturation",
    "volatility",
    "weak",
    "shortfall",
    "miss",
    "pressure",
    "difficult",
];

/// Keywords naming a concrete risk factor
const RISK_KEYWORDS: [&str; 8] = [
    "competition",
    "regulatory",
    "currency",
    "slowdown",
    "recession",
    "cybersecurity",
    "litigation",
    "supply chain",
];

/// Metric labels recognized in report text, most specific first
const METRIC_LABELS: [(&str, &str); 6] = [
    ("free cash flow", "free_cash_flow"),
    ("operating margin", "operating_margin"),
    ("net income", "net_income"),
    ("earnings per share", "eps"),
    ("eps", "eps"),
    ("revenue", "revenue"),
];

fn sentence_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+|\n+").expect("valid pattern"))
}

fn value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$?(\d+(?:,\d{3})*(?:\.\d+)?)\s*(billion|million|trillion|%)?")
            .expect("valid pattern")
    })
}

fn yoy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(up|down|increased|decreased|grew|declined|rose|fell)\b\s+(?:by\s+)?(\d+(?:\.\d+)?)\s*%")
            .expect("valid pattern")
    })
}

fn segment_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)\s+(?:segment|division)")
            .expect("valid pattern")
    })
}

fn guidance_period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(q[1-4](?:\s+\d{4})?|full[\s-]?year(?:\s+\d{4})?|fiscal\s+\d{4}|fy\s?\d{2,4}|next\s+quarter)\b",
        )
        .expect("valid pattern")
    })
}

fn revenue_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"revenue[^.\n]*?\$?(\d+(?:\.\d+)?)\s*(?:[-–]|to)\s*\$?(\d+(?:\.\d+)?)")
            .expect("valid pattern")
    })
}

fn eps_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\beps\b[^.\n]*?\$?(\d+(?:\.\d+)?)\s*(?:[-–]|to)\s*\$?(\d+(?:\.\d+)?)")
            .expect("valid pattern")
    })
}

fn guidance_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Word boundaries keep "exceeded expectations" from reading as guidance
    RE.get_or_init(|| {
        Regex::new(r"\b(?:expects?|guidance|outlook|forecasts?|anticipates?)\b")
            .expect("valid pattern")
    })
}

fn is_guidance_sentence(lower: &str) -> bool {
    guidance_marker_re().is_match(lower)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Deterministic regex/keyword analyst
#[derive(Debug, Default, Clone)]
pub struct HeuristicJudgment;

impl HeuristicJudgment {
    pub fn new() -> Self {
        Self
    }

    /// Scan report text for headline metrics, segments and guidance
    fn extract(&self, text: &str) -> Value {
        let mut metrics = Map::new();
        let mut segments = Map::new();
        let mut guidance = Map::new();

        for sentence in sentence_split_re().split(text) {
            let sentence = sentence.trim().trim_end_matches('.');
            if sentence.is_empty() {
                continue;
            }
            let lower = sentence.to_lowercase();

            if is_guidance_sentence(&lower) {
                if let Some((period, entry)) = Self::scan_guidance(&lower) {
                    guidance.entry(period).or_insert(entry);
                }
                continue;
            }

            let is_segment = lower.contains("segment") || lower.contains("division");
            if is_segment {
                if let Some((name, entry)) = Self::scan_segment(sentence, &lower) {
                    segments.entry(name).or_insert(entry);
                }
                continue;
            }

            // A range next to a metric label is guidance even without a
            // marker word; its low end must never be read as a point value
            if revenue_range_re().is_match(&lower) || eps_range_re().is_match(&lower) {
                if let Some((period, entry)) = Self::scan_guidance(&lower) {
                    guidance.entry(period).or_insert(entry);
                }
                continue;
            }

            Self::scan_metrics(&lower, &mut metrics);
        }

        let mut payload = Map::new();
        payload.insert("metrics".into(), Value::Object(metrics));
        payload.insert("segment_performance".into(), Value::Object(segments));
        payload.insert("forward_guidance".into(), Value::Object(guidance));
        Value::Object(payload)
    }

    fn scan_metrics(lower: &str, metrics: &mut Map<String, Value>) {
        for (label, key) in METRIC_LABELS {
            if metrics.contains_key(key) {
                continue;
            }
            let Some(at) = lower.find(label) else {
                continue;
            };
            let rest = &lower[at + label.len()..];
            let Some(caps) = value_re().captures(rest) else {
                continue;
            };
            let Some(mut value) = caps.get(1).and_then(|m| parse_number(m.as_str())) else {
                continue;
            };
            // Values stated as percentages become fractions
            if caps.get(2).is_some_and(|unit| unit.as_str() == "%") {
                value /= 100.0;
            }

            let yoy = Self::scan_yoy(lower);
            metrics.insert(key.to_string(), json!({ "value": value, "yoy_change": yoy }));
        }
    }

    fn scan_yoy(lower: &str) -> Option<f64> {
        let caps = yoy_re().captures(lower)?;
        let magnitude = parse_number(caps.get(2)?.as_str())? / 100.0;
        let negative = matches!(caps.get(1)?.as_str(), "down" | "decreased" | "declined" | "fell");
        Some(if negative { -magnitude } else { magnitude })
    }

    fn scan_segment(sentence: &str, lower: &str) -> Option<(String, Value)> {
        let caps = segment_name_re().captures(sentence)?;
        let mut name = caps.get(1)?.as_str();
        // Strip leading articles picked up by the capitalized-run capture
        for article in ["The ", "Our ", "A ", "Its "] {
            if let Some(stripped) = name.strip_prefix(article) {
                name = stripped;
            }
        }

        let revenue_caps = value_re().captures(lower)?;
        let revenue = parse_number(revenue_caps.get(1)?.as_str())?;
        let growth_rate = Self::scan_yoy(lower).unwrap_or(0.0);

        Some((
            name.to_string(),
            json!({ "revenue": revenue, "growth_rate": growth_rate, "metrics": {} }),
        ))
    }

    fn scan_guidance(lower: &str) -> Option<(String, Value)> {
        let period = guidance_period_re()
            .captures(lower)
            .and_then(|caps| caps.get(1))
            .map_or_else(
                || "next_period".to_string(),
                |m| m.as_str().replace([' ', '-'], "_"),
            );

        let mut entry = Map::new();
        if let Some(caps) = revenue_range_re().captures(lower) {
            let low = parse_number(caps.get(1)?.as_str())?;
            let high = parse_number(caps.get(2)?.as_str())?;
            entry.insert("revenue_range".into(), json!([low, high]));
        }
        if let Some(caps) = eps_range_re().captures(lower) {
            let low = parse_number(caps.get(1)?.as_str())?;
            let high = parse_number(caps.get(2)?.as_str())?;
            entry.insert("eps_range".into(), json!([low, high]));
        }

        if entry.is_empty() {
            return None;
        }
        Some((period, Value::Object(entry)))
    }

    /// Keyword-balance sentiment scoring over the report text
    ///
    /// The ratio→confidence mapping follows the original rule set: lopsided
    /// keyword counts raise confidence, an even mix reads neutral at 0.5.
    fn analyze_sentiment(&self, text: &str) -> Value {
        let lower = text.to_lowercase();

        let positives = Self::find_ordered(&lower, &POSITIVE_KEYWORDS);
        let negatives = Self::find_ordered(&lower, &NEGATIVE_KEYWORDS);
        let risks = Self::find_ordered(&lower, &RISK_KEYWORDS);

        let positive_count = positives.len();
        let negative_count = negatives.len();
        let total = positive_count + negative_count;

        let (overall_sentiment, confidence) = if total == 0 {
            ("neutral", 0.5)
        } else {
            let positive_ratio = positive_count as f64 / total as f64;
            if positive_ratio > 0.5 {
                ("positive", (0.5 + positive_ratio * 0.5).min(0.95))
            } else if positive_ratio < 0.5 {
                ("negative", ((1.0 - positive_ratio) * 0.5).min(0.95))
            } else {
                ("neutral", 0.5)
            }
        };

        let management_tone = match (overall_sentiment, negative_count > 0) {
            ("positive", true) => "optimistic_cautious",
            ("positive", false) => "optimistic",
            ("negative", _) => "cautious_pessimistic",
            _ => "neutral",
        };

        json!({
            "overall_sentiment": overall_sentiment,
            "confidence": (confidence * 100.0).round() / 100.0,
            "management_tone": management_tone,
            "positive_indicators": positives,
            "negative_indicators": negatives,
            "risk_factors": risks,
        })
    }

    /// Matched keywords ordered by first occurrence in the text
    fn find_ordered(lower: &str, keywords: &[&str]) -> Vec<String> {
        let mut found: Vec<(usize, &str)> = keywords
            .iter()
            .filter_map(|keyword| lower.find(keyword).map(|at| (at, *keyword)))
            .collect();
        found.sort_by_key(|(at, _)| *at);
        found
            .into_iter()
            .map(|(_, keyword)| keyword.to_string())
            .collect()
    }

    /// Compose headline and narrative from upstream facts
    ///
    /// Expects the summary stage's serialized fact sheet as input.
    fn synthesize(&self, input: &str) -> Result<Value> {
        let facts: Value = serde_json::from_str(input).map_err(|e| {
            JudgmentError::UnexpectedResponse(format!("summary input is not JSON: {e}"))
        })?;

        let revenue_yoy = facts["revenue_yoy"].as_f64();
        let sentiment = facts["overall_sentiment"].as_str().unwrap_or("neutral");
        let tone = facts["management_tone"].as_str().unwrap_or("neutral");
        let metric_count = facts["metric_count"].as_u64().unwrap_or(0);

        let headline = match revenue_yoy {
            Some(yoy) if yoy > 0.0 => format!(
                "Revenue up {:.1}% year over year; {sentiment} tone from management",
                yoy * 100.0
            ),
            Some(yoy) if yoy < 0.0 => format!(
                "Revenue down {:.1}% year over year; {sentiment} tone from management",
                yoy.abs() * 100.0
            ),
            _ => format!("Flat quarter; {sentiment} tone from management"),
        };

        let mut summary = format!(
            "Extracted {metric_count} headline metrics from the report. Management tone reads '{tone}'."
        );
        if let Some(top_positive) = facts["top_positive"].as_str() {
            summary.push_str(&format!(" Strongest positive signal: {top_positive}."));
        }
        if let Some(top_risk) = facts["top_risk"].as_str() {
            summary.push_str(&format!(" Primary risk: {top_risk}."));
        }

        Ok(json!({ "headline": headline, "summary": summary }))
    }
}

#[async_trait]
impl JudgmentProvider for HeuristicJudgment {
    async fn judge(&self, request: JudgmentRequest) -> Result<JudgmentResponse> {
        debug!(task = %request.task, "Running heuristic judgment");
        let payload = match request.task.as_str() {
            tasks::DATA_EXTRACTION => self.extract(&request.input),
            tasks::SENTIMENT_ANALYSIS => self.analyze_sentiment(&request.input),
            tasks::SUMMARY_SYNTHESIS => self.synthesize(&request.input)?,
            other => return Err(JudgmentError::UnsupportedTask(other.to_string())),
        };
        Ok(JudgmentResponse::new(payload))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
