//! Path segments accumulated while descending the data tree.

use crate::openapi::{Parameter, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Data,
    Rpc,
}

impl SegmentKind {
    /// Root every path of this kind is rendered under.
    pub fn prefix(self) -> &'static str {
        match self {
            SegmentKind::Data => "/data/",
            SegmentKind::Rpc => "/operations/",
        }
    }
}

/// A list key rendered as a path parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyParam {
    /// Name of the key leaf.
    pub key: String,
    /// Parameter name, unique along the chain.
    pub name: String,
    pub description: Option<String>,
    pub schema: Schema,
}

impl KeyParam {
    pub fn to_parameter(&self) -> Parameter {
        Parameter::path(&self.name, self.description.clone(), self.schema.clone())
    }
}

/// One step of an addressable path.
///
/// Segments form a parent-linked chain. A child borrows its parent, so the
/// frame that created a segment owns it and dropping the child returns to
/// the parent unchanged.
#[derive(Debug, Clone)]
pub struct PathSegment<'p> {
    parent: Option<&'p PathSegment<'p>>,
    name: Option<String>,
    module: String,
    read_only: bool,
    kind: SegmentKind,
    params: Vec<KeyParam>,
}

impl PathSegment<'static> {
    /// The unnamed segment a module's paths start from.
    pub fn root(module: impl Into<String>) -> Self {
        Self {
            parent: None,
            name: None,
            module: module.into(),
            read_only: false,
            kind: SegmentKind::Data,
            params: Vec::new(),
        }
    }
}

impl<'p> PathSegment<'p> {
    pub fn child(&self, name: impl Into<String>, module: impl Into<String>) -> PathSegment<'_> {
        PathSegment {
            parent: Some(self),
            name: Some(name.into()),
            module: module.into(),
            read_only: false,
            kind: self.kind,
            params: Vec::new(),
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn as_rpc(mut self) -> Self {
        self.kind = SegmentKind::Rpc;
        self
    }

    /// Attach list keys `(key, description, schema)`. Parameter names are
    /// made unique along the chain: the key name, then `<list>-<key>`, then
    /// a numeric suffix.
    pub fn with_keys(mut self, keys: Vec<(String, Option<String>, Schema)>) -> Self {
        let list = self.name.clone().unwrap_or_default();
        let mut taken: Vec<String> = self.path_params().iter().map(|p| p.name.clone()).collect();
        let mut params = Vec::with_capacity(keys.len());
        for (key, description, schema) in keys {
            let mut name = key.clone();
            if taken.contains(&name) {
                let qualified = format!("{list}-{key}");
                name = qualified.clone();
                let mut idx = 1;
                while taken.contains(&name) {
                    name = format!("{qualified}{idx}");
                    idx += 1;
                }
            }
            taken.push(name.clone());
            params.push(KeyParam {
                key,
                name,
                description,
                schema,
            });
        }
        self.params = params;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn parent(&self) -> Option<&PathSegment<'p>> {
        self.parent
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn params(&self) -> &[KeyParam] {
        &self.params
    }

    /// A segment is read-only when it or any ancestor is.
    pub fn is_read_only(&self) -> bool {
        self.iter().any(|s| s.read_only)
    }

    /// This segment and its ancestors, innermost first.
    pub fn iter(&self) -> Segments<'_> {
        Segments { next: Some(self) }
    }

    /// Named segments from the outermost to this one.
    pub fn chain(&self) -> Vec<&PathSegment<'_>> {
        let mut chain: Vec<&PathSegment<'_>> = self.iter().filter(|s| s.name.is_some()).collect();
        chain.reverse();
        chain
    }

    /// Key parameters of the whole chain, outermost first.
    pub fn path_params(&self) -> Vec<&KeyParam> {
        self.chain().into_iter().flat_map(|s| s.params.iter()).collect()
    }

    /// Key parameters of the chain without this segment's own keys.
    pub fn list_params(&self) -> Vec<&KeyParam> {
        match self.parent {
            Some(parent) => parent.path_params(),
            None => Vec::new(),
        }
    }
}

pub struct Segments<'a> {
    next: Option<&'a PathSegment<'a>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a PathSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}
