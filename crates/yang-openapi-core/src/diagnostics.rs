//! Recoverable anomalies reported alongside the generated document.

use serde::{Deserialize, Serialize};

/// Something the generator noticed and worked around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Classification of the anomaly.
    pub kind: DiagnosticKind,
    /// What the anomaly is about: a schema name, a node name or a path.
    pub subject: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A lookup found nothing and the conservative branch was taken.
    ResolutionInconsistency,
    /// Two entities wanted the same name. `recovered` is true when a suffixed
    /// name was assigned instead.
    NameCollision { name: String, recovered: bool },
    /// A schema name was registered twice with different content; the later
    /// one won.
    StructuralOverride { name: String },
    /// More than one grouping reference survived inheritance optimization.
    MultipleInheritance { references: Vec<String> },
    /// Generation produced no named schemas.
    EmptyOutput,
    /// A node was skipped during traversal.
    SkippedNode,
    /// A post-processor left a construct unchanged.
    PostProcessing { processor: String },
}
