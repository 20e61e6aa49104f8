//! Task instructions sent with every judgment request
//!
//! Each prompt names the expected JSON shape; the stages validate and
//! normalize whatever comes back, so providers may answer with percent
//! strings or range strings where the shape says number.

pub const DATA_EXTRACTION: &str = "\
You are a financial analyst. Extract headline metrics from the earnings \
report text. Respond with JSON only: \
{\"metrics\": {\"revenue\"|\"net_income\"|\"eps\"|\"operating_margin\"|\"free_cash_flow\": \
{\"value\": number, \"yoy_change\": number|null}}, \
\"segment_performance\": {segment: {\"revenue\": number, \"growth_rate\": number, \"metrics\": {}}}, \
\"forward_guidance\": {period: {\"revenue_range\": [low, high], \"eps_range\": [low, high]}}}. \
Omit metrics the report does not state; never fill zeros for missing values.";

pub const SENTIMENT_ANALYSIS: &str = "\
You are a financial analyst. Assess the tone of the earnings report text. \
Respond with JSON only: \
{\"overall_sentiment\": \"positive\"|\"negative\"|\"neutral\", \
\"confidence\": number in [0,1], \"management_tone\": string, \
\"positive_indicators\": [string], \"negative_indicators\": [string], \
\"risk_factors\": [string]}. \
List indicators in the order they appear in the text.";

pub const SUMMARY_SYNTHESIS: &str = "\
You are a financial analyst. The input is a JSON fact sheet consolidating \
extracted metrics and sentiment. Compose a one-line headline and a short \
narrative summary. Respond with JSON only: \
{\"headline\": string, \"summary\": string}.";
