//! Synthesize OpenAPI 3 documents from resolved YANG schema contexts.
//!
//! [`generate`] walks the data tree and RPCs of the selected modules,
//! registering an OpenAPI path with its operations for every container and
//! list, and a named schema for every container, list, grouping, RPC input
//! and output. Groupings become shared parents composed with `allOf`;
//! augmentations become separate fragments of the augmented schema.
//!
//! ```
//! use yang_openapi_core::{generate, ContextBuilder, GenerateOptions, TypeDef};
//!
//! let mut b = ContextBuilder::new();
//! b.module("m", "urn:m", "m");
//! let root = b.container("m", "root");
//! b.leaf(root, "name", TypeDef::String);
//!
//! let result = generate(&b.build(), &GenerateOptions::for_modules(["m"])).unwrap();
//! assert!(result.api.components.schemas.contains_key("m.Root"));
//! assert!(result.api.paths.contains_key("/data/m:root/"));
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod equivalence;
pub mod error;
pub mod generator;
pub mod inheritance;
pub mod naming;
pub mod openapi;
pub mod paths;
pub mod postprocess;
pub mod types;

pub use builder::SchemaBuilder;
pub use config::{Element, GenerateOptions, PathStyle, PostProcessorKind, TagStrategy};
pub use context::{ContextBuilder, Module, NodeId, NodeKind, Parent, QName, SchemaContext, SchemaNode, TypeDef};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::GenerateError;
pub use generator::{generate, GenerateResult};
pub use openapi::{OpenApi, Operation, PathItem, Schema, SchemaKind};
pub use paths::{PathPrinter, PathSegment, PathTemplate};
pub use postprocess::{PassResult, PostProcessor};
