//! Error types for OpenAPI generation.
//!
//! Only configuration-level preconditions are errors. Anomalies found while
//! walking the tree are recorded as [`crate::Diagnostic`]s instead.

use thiserror::Error;

use crate::context::NodeId;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No modules selected for generation")]
    NoModulesSelected,

    #[error("None of the selected modules were found in the schema context: {requested:?}")]
    ModulesNotFound { requested: Vec<String> },

    #[error("Invalid schema context at node {node}: {message}")]
    InvalidContext { node: NodeId, message: String },

    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),
}
