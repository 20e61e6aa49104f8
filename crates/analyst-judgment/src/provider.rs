//! Judgment provider trait definition

use crate::{JudgmentRequest, JudgmentResponse, Result};
use async_trait::async_trait;

/// Trait for judgment providers
///
/// Implementations must be safe for concurrent use; one shared instance
/// serves every analysis request in the process.
#[async_trait]
pub trait JudgmentProvider: Send + Sync {
    /// Produce a structured judgment for the request
    async fn judge(&self, request: JudgmentRequest) -> Result<JudgmentResponse>;

    /// Verify the provider is reachable and ready
    async fn health_check(&self) -> Result<()>;

    /// Get the provider name (e.g., "http", "heuristic")
    fn name(&self) -> &str;
}
