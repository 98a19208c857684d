//! Leaf type conversion.
//!
//! Booleans map to boolean schemas, the integer family to integer schemas,
//! enumerations to references to a registered enum schema, and everything
//! else to strings. Leaf references are followed to the leaf they point at
//! and converted as that leaf's type.

use regex::Regex;

use crate::context::{NodeId, SchemaContext, TypeDef};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::GenerateError;
use crate::naming::EnumKey;
use crate::openapi::{IntegerFormat, Schema};

/// Maximum number of leafref-to-leafref hops followed.
const MAX_LEAFREF_HOPS: usize = 32;

/// Receives the definitions a conversion needs registered.
pub trait DefinitionSink {
    /// Register (or look up) the enum schema for `key` and return its name.
    fn add_enum(&mut self, ctx: &SchemaContext, key: EnumKey, values: &[String]) -> String;

    fn diagnose(&mut self, diagnostic: Diagnostic);
}

#[derive(Debug, Clone)]
pub struct TypeConverter {
    annotate_leafrefs: bool,
    predicate: Regex,
}

impl TypeConverter {
    pub fn new(annotate_leafrefs: bool) -> Result<Self, GenerateError> {
        Ok(Self {
            annotate_leafrefs,
            predicate: Regex::new(r"\[[^\]]*\]")?,
        })
    }

    /// Convert the type of leaf `scope`.
    pub fn convert(
        &self,
        ctx: &SchemaContext,
        ty: &TypeDef,
        scope: NodeId,
        sink: &mut dyn DefinitionSink,
    ) -> Schema {
        let schema = match self.resolve(ctx, ty, scope) {
            Ok((base, base_scope)) => convert_base(ctx, base, base_scope, sink),
            Err(path) => {
                tracing::warn!(node = %ctx.qname(scope), path = %path, "cannot resolve leafref, using string");
                sink.diagnose(Diagnostic::new(
                    DiagnosticKind::ResolutionInconsistency,
                    ctx.qname(scope).to_string(),
                    format!("leafref path {path} does not resolve to a typed leaf"),
                ));
                Schema::string()
            }
        };

        match ty {
            TypeDef::LeafRef { path, .. } if self.annotate_leafrefs => {
                schema.with_extension("x-path", serde_json::Value::String(path.clone()))
            }
            _ => schema,
        }
    }

    /// Follow leafrefs to a concrete type and the leaf that declares it.
    fn resolve<'c>(
        &self,
        ctx: &'c SchemaContext,
        ty: &'c TypeDef,
        scope: NodeId,
    ) -> Result<(&'c TypeDef, NodeId), String> {
        let (mut ty, mut scope) = (ty, scope);
        for _ in 0..MAX_LEAFREF_HOPS {
            let TypeDef::LeafRef { path, target } = ty else {
                return Ok((ty, scope));
            };
            tracing::debug!(node = %ctx.qname(scope), path = %path, "resolving leafref");
            let found = match target {
                Some(target) => Some(*target),
                None => self.locate(ctx, path, scope),
            };
            match found.and_then(|t| ctx.node(t).type_def.as_ref().map(|ty| (ty, t))) {
                Some((next, target)) => {
                    ty = next;
                    scope = target;
                }
                None => return Err(path.clone()),
            }
        }
        match ty {
            TypeDef::LeafRef { path, .. } => Err(path.clone()),
            _ => Ok((ty, scope)),
        }
    }

    /// Find the node a leafref path points at, starting from `scope`.
    pub fn locate(&self, ctx: &SchemaContext, path: &str, scope: NodeId) -> Option<NodeId> {
        let path = self.predicate.replace_all(path, "");
        let path = path.trim();
        let mut steps = path.split('/').map(str::trim).filter(|s| !s.is_empty());

        let mut current = if path.starts_with('/') {
            let first = steps.next()?;
            let (prefix, name) = split_prefix(first);
            let module = prefix
                .and_then(|p| ctx.module_by_prefix(p))
                .or_else(|| ctx.module(&ctx.node(scope).module))?;
            module.children.iter().copied().find_map(|top| {
                let node = ctx.node(top);
                if node.kind.is_transparent() {
                    ctx.data_child_by_name(top, name)
                } else {
                    (node.name == name).then_some(top)
                }
            })?
        } else {
            scope
        };

        for step in steps {
            current = match step {
                "." => current,
                ".." => ctx.data_parent(current)?,
                named => ctx.data_child_by_name(current, split_prefix(named).1)?,
            };
        }
        Some(current)
    }
}

fn split_prefix(step: &str) -> (Option<&str>, &str) {
    match step.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, step),
    }
}

fn convert_base(
    ctx: &SchemaContext,
    ty: &TypeDef,
    scope: NodeId,
    sink: &mut dyn DefinitionSink,
) -> Schema {
    match ty {
        TypeDef::Boolean => Schema::boolean(),
        // 32-bit unsigned values overflow the default 32-bit format.
        TypeDef::Int64 | TypeDef::Uint32 => Schema::integer(Some(IntegerFormat::Int64)),
        // TODO: uint64 exceeds int64 as well; widen once consumers accept a
        // format beyond int64.
        TypeDef::Int8
        | TypeDef::Int16
        | TypeDef::Int32
        | TypeDef::Uint8
        | TypeDef::Uint16
        | TypeDef::Uint64 => Schema::integer(None),
        TypeDef::Enumeration { name, values } => {
            let key = match name {
                Some(qname) => EnumKey::Typedef(qname.clone()),
                None => EnumKey::Inline(ctx.origin(scope)),
            };
            Schema::reference(sink.add_enum(ctx, key, values))
        }
        _ => Schema::string(),
    }
}
