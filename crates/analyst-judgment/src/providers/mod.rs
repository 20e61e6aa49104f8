//! Concrete judgment provider implementations

pub mod http;

pub use http::{HttpJudgment, HttpJudgmentConfig};
