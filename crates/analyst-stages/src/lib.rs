//! Stage implementations for the earnings analysis pipeline
//!
//! Each stage owns one section of the final report: extraction produces
//! financial metrics, sentiment produces the tone assessment, summary
//! consolidates both into the executive judgment. Stages delegate the raw
//! analysis to a shared judgment provider and enforce their input/output
//! contracts locally.

pub mod extraction;
pub mod normalize;
pub mod prompts;
pub mod sentiment;
pub mod summary;

pub use extraction::DataExtractionStage;
pub use sentiment::SentimentAnalysisStage;
pub use summary::SummarySynthesisStage;
