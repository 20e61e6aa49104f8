//! Judgment request and response types

use serde::{Deserialize, Serialize};

/// Well-known task names the pipeline stages request
pub mod tasks {
    pub const DATA_EXTRACTION: &str = "data_extraction";
    pub const SENTIMENT_ANALYSIS: &str = "sentiment_analysis";
    pub const SUMMARY_SYNTHESIS: &str = "summary_synthesis";
}

/// A request for one structured judgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentRequest {
    /// What kind of judgment is being asked for (see [`tasks`])
    pub task: String,
    /// Task instructions, including the expected payload shape
    pub instructions: String,
    /// The text or serialized facts to judge
    pub input: String,
}

impl JudgmentRequest {
    pub fn new(
        task: impl Into<String>,
        instructions: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            task: task.into(),
            instructions: instructions.into(),
            input: input.into(),
        }
    }
}

/// Structured payload returned by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentResponse {
    pub payload: serde_json::Value,
}

impl JudgmentResponse {
    pub fn new(payload: serde_json::Value) -> Self {
        Self { payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_construction() {
        let request = JudgmentRequest::new(tasks::DATA_EXTRACTION, "extract metrics", "Revenue…");
        assert_eq!(request.task, "data_extraction");
        assert_eq!(request.instructions, "extract metrics");
    }

    #[test]
    fn test_response_roundtrip() {
        let response = JudgmentResponse::new(serde_json::json!({ "headline": "Strong quarter" }));
        let json = serde_json::to_string(&response).unwrap();
        let parsed: JudgmentResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.payload["headline"], "Strong quarter");
    }
}
