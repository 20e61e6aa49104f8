//! Request boundary over the pipeline
//!
//! The thin layer every caller goes through: it assigns the run its
//! correlation id, delegates to the Coordinator, and answers the
//! introspection queries (agent listing, provider health).

use analyst_core::{AnalysisReport, PipelineError};
use analyst_judgment::JudgmentProvider;
use analyst_pipeline::Coordinator;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

/// Analysis roles exposed to callers, coordinator first
pub const AGENTS: [&str; 4] = [
    "coordinator",
    "data_extractor",
    "sentiment_analyzer",
    "summary_generator",
];

/// Run one analysis under a fresh correlation id
pub async fn run_analysis(
    coordinator: &Coordinator,
    source_text: &str,
) -> Result<AnalysisReport, PipelineError> {
    let report_identifier = Uuid::new_v4().to_string();
    info!(report = %report_identifier, "Accepted analysis request");
    coordinator.run(source_text, &report_identifier).await
}

/// The agent listing as a JSON document
pub fn agents() -> Value {
    json!({ "agents": AGENTS })
}

/// Probe the judgment provider and report readiness
pub async fn health(provider: &dyn JudgmentProvider) -> Value {
    match provider.health_check().await {
        Ok(()) => json!({ "status": "healthy", "provider": provider.name() }),
        Err(e) => json!({
            "status": "unhealthy",
            "provider": provider.name(),
            "error": e.to_string(),
        }),
    }
}
