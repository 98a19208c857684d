//! Operation synthesis for data and RPC paths.

use indexmap::IndexMap;

use crate::openapi::{ApiResponse, MediaType, Operation, Parameter, RequestBody, Schema};

/// A named schema an operation refers to.
#[derive(Debug, Clone, Copy)]
pub struct ModelRef<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

/// Builds operations with a fixed set of media types.
#[derive(Debug, Clone, Copy)]
pub struct OperationFactory<'a> {
    media_types: &'a [String],
}

impl<'a> OperationFactory<'a> {
    pub fn new(media_types: &'a [String]) -> Self {
        Self { media_types }
    }

    fn content(&self, name: &str) -> IndexMap<String, MediaType> {
        self.media_types
            .iter()
            .map(|m| {
                (
                    m.clone(),
                    MediaType {
                        schema: Schema::reference(name),
                    },
                )
            })
            .collect()
    }

    fn body(&self, name: &str, description: String) -> RequestBody {
        RequestBody {
            description: Some(description),
            content: self.content(name),
            required: true,
        }
    }

    fn base(&self, description: String, params: Vec<Parameter>) -> Operation {
        let mut responses = IndexMap::new();
        responses.insert("400".to_string(), ApiResponse::empty("Internal error"));
        Operation {
            description,
            tags: Vec::new(),
            parameters: params,
            request_body: None,
            responses,
        }
    }

    pub fn get(&self, name: &str, params: Vec<Parameter>) -> Operation {
        let mut op = self.base(format!("returns {name}"), params);
        op.responses.insert(
            "200".to_string(),
            ApiResponse {
                description: name.to_string(),
                content: self.content(name),
            },
        );
        op
    }

    pub fn replace(&self, name: &str, params: Vec<Parameter>) -> Operation {
        let mut op = self.base(format!("creates or updates {name}"), params);
        op.request_body = Some(self.body(name, format!("{name} to be added or updated")));
        op.responses
            .insert("201".to_string(), ApiResponse::empty("Object created"));
        op.responses
            .insert("204".to_string(), ApiResponse::empty("Object modified"));
        op
    }

    /// POST of a new entry. For a list collection `params` holds only the
    /// parent chain's keys.
    pub fn create(&self, name: &str, params: Vec<Parameter>) -> Operation {
        let mut op = self.base(format!("creates {name}"), params);
        op.request_body = Some(self.body(name, format!("{name} to be added to list")));
        op.responses
            .insert("201".to_string(), ApiResponse::empty("Object created"));
        op.responses
            .insert("409".to_string(), ApiResponse::empty("Object already exists"));
        op
    }

    pub fn delete(&self, name: &str, params: Vec<Parameter>) -> Operation {
        let mut op = self.base(format!("removes {name}"), params);
        op.responses
            .insert("204".to_string(), ApiResponse::empty("Object deleted"));
        op
    }

    pub fn invoke(
        &self,
        rpc: &str,
        input: Option<ModelRef<'_>>,
        output: Option<ModelRef<'_>>,
        params: Vec<Parameter>,
    ) -> Operation {
        let mut op = self.base(format!("invokes {rpc}"), params);
        if let Some(input) = input {
            op.request_body = Some(RequestBody {
                description: input.description.map(str::to_string),
                content: self.content(input.name),
                required: true,
            });
        }
        if let Some(output) = output {
            op.responses.insert(
                "200".to_string(),
                ApiResponse {
                    description: output
                        .description
                        .unwrap_or("Correct response")
                        .to_string(),
                    content: self.content(output.name),
                },
            );
        }
        op.responses
            .insert("201".to_string(), ApiResponse::empty("No response"));
        op
    }
}
