//! OpenAPI 3 document model.
//!
//! Only the subset the generator emits is modeled. Every type serializes to
//! standard OpenAPI JSON (camelCase keys).

mod schema;

pub use schema::{IntegerFormat, Schema, SchemaKind, REF_PREFIX};

use indexmap::IndexMap;
use serde::Serialize;

pub const OPENAPI_VERSION: &str = "3.0.1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApi {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    /// Rendered path string to the operations available on it.
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

impl OpenApi {
    pub fn new(info: Info, server_url: impl Into<String>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            servers: vec![Server {
                url: server_url.into(),
            }],
            paths: IndexMap::new(),
            components: Components::default(),
        }
    }

    pub fn schemas(&self) -> &IndexMap<String, Schema> {
        &self.components.schemas
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.values().flat_map(|item| item.operations())
    }

    /// Call `f` on every schema reachable from an operation: request
    /// bodies, responses and parameters.
    pub fn visit_operation_schemas_mut(&mut self, f: &mut dyn FnMut(&mut Schema)) {
        for item in self.paths.values_mut() {
            for op in item.operations_mut() {
                for param in &mut op.parameters {
                    f(&mut param.schema);
                }
                if let Some(body) = &mut op.request_body {
                    for media in body.content.values_mut() {
                        f(&mut media.schema);
                    }
                }
                for response in op.responses.values_mut() {
                    for media in response.content.values_mut() {
                        f(&mut media.schema);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    pub schemas: IndexMap<String, Schema>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        [&self.get, &self.put, &self.post, &self.delete]
            .into_iter()
            .flatten()
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        [
            &mut self.get,
            &mut self.put,
            &mut self.post,
            &mut self.delete,
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Status code to response.
    pub responses: IndexMap<String, ApiResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Schema,
}

impl Parameter {
    pub fn path(name: impl Into<String>, description: Option<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location: "path".to_string(),
            required: true,
            description,
            schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: IndexMap<String, MediaType>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl ApiResponse {
    pub fn empty(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: IndexMap::new(),
        }
    }
}
