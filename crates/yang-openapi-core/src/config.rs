//! Configuration for OpenAPI generation.

use serde::{Deserialize, Serialize};

/// Kind of element paths are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Element {
    /// Configuration and operational data under `/data/`.
    Data,
    /// Remote procedure calls under `/operations/`.
    Rpc,
}

/// How a chain of path segments is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStyle {
    /// RFC 8040: `module:name={k1},{k2}/`, module named where it changes.
    Rfc8040,
    /// OpenDaylight draft style: `module:name/{k1}/{k2}/` on every segment.
    Odl,
}

/// Strategy for deriving documentation tags from a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum TagStrategy {
    /// Tag with the class-cased name of the segment at `level` (1-based),
    /// or of the last segment when the path is shorter.
    Segment { level: usize },
}

/// Graph-rewriting pass applied after synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostProcessorKind {
    ReplaceEmptyWithParent,
    SortDefinitions,
    SingleParentInheritance,
}

/// Options for OpenAPI generation.
///
/// Fields are serialized in `kebab-case` (e.g. `max-depth`, `full-crud`).
/// Missing fields take their default, so a config file only needs to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GenerateOptions {
    /// Modules to generate paths and schemas for, by name or namespace.
    pub modules: Vec<String>,
    /// Maximum traversal depth below a module. 0 emits nothing.
    pub max_depth: usize,
    /// Element kinds to generate paths for.
    pub elements: Vec<Element>,
    /// Emit PUT/POST/DELETE for writable nodes. Default: true.
    pub full_crud: bool,
    pub path_style: PathStyle,
    /// Tag strategies; the module name is always added as a tag.
    pub tags: Vec<TagStrategy>,
    /// Media types of request bodies and responses.
    pub media_types: Vec<String>,
    /// Attach an `x-path` extension to leaf-reference properties.
    pub annotate_leafrefs: bool,
    pub post_processors: Vec<PostProcessorKind>,
    /// Document version reported in `info.version`.
    pub version: String,
    pub server_url: String,
}

impl GenerateOptions {
    pub fn for_modules<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn includes(&self, element: Element) -> bool {
        self.elements.contains(&element)
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            max_depth: usize::MAX,
            elements: vec![Element::Data, Element::Rpc],
            full_crud: true,
            path_style: PathStyle::Rfc8040,
            tags: Vec::new(),
            media_types: vec!["application/json".to_string(), "application/xml".to_string()],
            annotate_leafrefs: true,
            post_processors: vec![
                PostProcessorKind::ReplaceEmptyWithParent,
                PostProcessorKind::SortDefinitions,
            ],
            version: "1.0.0-SNAPSHOT".to_string(),
            server_url: "http://localhost:8080/restconf".to_string(),
        }
    }
}
