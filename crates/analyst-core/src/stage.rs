//! Core Stage trait definition

use crate::context::AnalysisContext;
use crate::error::StageError;
use crate::result::{StageName, StagePayload};
use async_trait::async_trait;

/// Outcome of a single stage attempt
pub type StageOutcome = std::result::Result<StagePayload, StageError>;

/// One step in the fixed-order analysis pipeline
///
/// Stages are invoked by the Coordinator only after every declared
/// dependency has completed successfully. A stage reads prior outputs from
/// the shared context and returns exactly one payload or one classified
/// error per attempt; retry and timeout handling belong to the Coordinator.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The stage's fixed name
    fn name(&self) -> StageName;

    /// Stages whose ok results must be present before this stage runs
    fn dependencies(&self) -> &'static [StageName];

    /// Run one attempt of this stage against the shared context
    async fn execute(&self, ctx: &AnalysisContext) -> StageOutcome;
}
