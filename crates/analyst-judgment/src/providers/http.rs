//! HTTP-backed judgment provider
//!
//! Posts judgment requests to a hosted endpoint that wraps a language
//! model. The endpoint contract is deliberately small: POST
//! `{base}/judgments` with `{model, task, instructions, input}`, answer
//! `{payload: <structured JSON>}`. Works against any OpenAI-compatible
//! gateway that exposes such a facade.

use crate::{JudgmentError, JudgmentProvider, JudgmentRequest, JudgmentResponse, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "http://localhost:8080/v1";
const DEFAULT_MODEL: &str = "analyst-judgment-v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the HTTP judgment provider
#[derive(Debug, Clone)]
pub struct HttpJudgmentConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL of the judgment endpoint
    pub api_base: String,

    /// Model identifier forwarded with every request
    pub model: String,

    /// Request timeout in seconds (default: 60)
    pub timeout_secs: u64,
}

impl HttpJudgmentConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `JUDGMENT_API_KEY`; `JUDGMENT_API_BASE` and
    /// `JUDGMENT_MODEL` override the defaults when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("JUDGMENT_API_KEY").map_err(|_| {
            JudgmentError::ConfigurationError(
                "JUDGMENT_API_KEY environment variable not set".to_string(),
            )
        })?;

        let api_base =
            std::env::var("JUDGMENT_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = std::env::var("JUDGMENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            api_base,
            model,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    task: &'a str,
    instructions: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    payload: serde_json::Value,
}

/// Judgment provider backed by a remote HTTP endpoint
///
/// The inner `reqwest::Client` pools connections and is safe to share
/// across concurrent analysis requests.
pub struct HttpJudgment {
    client: Client,
    config: HttpJudgmentConfig,
}

impl HttpJudgment {
    /// Create a provider with the given configuration
    pub fn with_config(config: HttpJudgmentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(HttpJudgmentConfig::from_env()?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl JudgmentProvider for HttpJudgment {
    async fn judge(&self, request: JudgmentRequest) -> Result<JudgmentResponse> {
        let body = ApiRequest {
            model: &self.config.model,
            task: &request.task,
            instructions: &request.instructions,
            input: &request.input,
        };

        debug!(task = %request.task, model = %self.config.model, "Sending judgment request");

        let response = self
            .client
            .post(self.endpoint("judgments"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgmentError::Timeout
                } else {
                    JudgmentError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(JudgmentError::RequestFailed(format!(
                "endpoint returned {status}: {text}"
            )));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| JudgmentError::UnexpectedResponse(e.to_string()))?;

        Ok(JudgmentResponse::new(parsed.payload))
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgmentError::Timeout
                } else {
                    JudgmentError::from(e)
                }
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(JudgmentError::RequestFailed(format!(
                "health endpoint returned {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HttpJudgmentConfig::new("test-key");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_builders() {
        let config = HttpJudgmentConfig::new("test-key")
            .with_api_base("https://judgments.example.com/v2/")
            .with_model("analyst-large")
            .with_timeout(10);

        assert_eq!(config.api_base, "https://judgments.example.com/v2/");
        assert_eq!(config.model, "analyst-large");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = HttpJudgment::with_config(
            HttpJudgmentConfig::new("k").with_api_base("https://api.example.com/v1/"),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint("judgments"),
            "https://api.example.com/v1/judgments"
        );
    }
}
