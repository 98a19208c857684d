//! Generation run: module walk, path registration and post-processing.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::builder::SchemaBuilder;
use crate::config::{Element, GenerateOptions};
use crate::context::{Module, NodeId, NodeKind, SchemaContext};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::equivalence::{EffectiveStack, TreeIndex};
use crate::error::GenerateError;
use crate::openapi::{Info, OpenApi, PathItem, Schema};
use crate::paths::{ModelRef, PathHandler, PathSegment};
use crate::postprocess;
use crate::types::TypeConverter;

/// The generated document and every anomaly recovered from on the way.
#[derive(Debug)]
pub struct GenerateResult {
    pub api: OpenApi,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate an OpenAPI document for the selected modules of `ctx`.
///
/// # Errors
///
/// Fails before any traversal when no module is selected, when none of the
/// selected modules exists in `ctx`, or when `ctx` has dangling references
/// or cycles.
pub fn generate(ctx: &SchemaContext, options: &GenerateOptions) -> Result<GenerateResult, GenerateError> {
    if options.modules.is_empty() {
        return Err(GenerateError::NoModulesSelected);
    }

    let mut modules: Vec<&Module> = Vec::new();
    for name in &options.modules {
        match ctx.module(name).or_else(|| ctx.module_by_namespace(name)) {
            Some(module) if !modules.iter().any(|m| m.name == module.name) => modules.push(module),
            Some(_) => {}
            None => tracing::warn!(module = %name, "selected module not found"),
        }
    }
    if modules.is_empty() {
        return Err(GenerateError::ModulesNotFound {
            requested: options.modules.clone(),
        });
    }
    ctx.validate()?;

    let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
    let joined = names.join(",");
    tracing::info!(modules = %joined, "generating OpenAPI document");

    let tree = TreeIndex::new(ctx);
    let converter = TypeConverter::new(options.annotate_leafrefs)?;
    let mut builder = SchemaBuilder::new(ctx, &tree, converter);
    assign_names(ctx, &modules, &mut builder);

    let mut api = OpenApi::new(
        Info {
            title: format!("{joined} API"),
            description: format!("{joined} API generated from yang definitions"),
            version: options.version.clone(),
        },
        options.server_url.clone(),
    );

    let selected: HashSet<&str> = names.iter().copied().collect();
    for module in &modules {
        let mut walker = ModuleWalker {
            ctx,
            module,
            selected: &selected,
            builder: &mut builder,
            handler: PathHandler::new(module.name.clone(), options)?,
            paths: &mut api.paths,
        };
        if options.includes(Element::Data) {
            walker.data(options.max_depth);
        }
        if options.includes(Element::Rpc) {
            walker.rpcs();
        }
    }

    let (schemas, mut diagnostics) = builder.finish();
    api.components.schemas = schemas;

    if api.components.schemas.is_empty() {
        tracing::warn!("generated document has no definitions");
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::EmptyOutput,
            joined.clone(),
            "no schemas were generated; check the module selection",
        ));
    } else {
        api = postprocess::run_chain(api, &options.post_processors, &mut diagnostics);
    }

    tracing::info!(
        paths = api.paths.len(),
        schemas = api.components.schemas.len(),
        diagnostics = diagnostics.len(),
        "generation finished"
    );
    Ok(GenerateResult { api, diagnostics })
}

// ---------------------------------------------------------------------------
// Naming pre-pass
// ---------------------------------------------------------------------------

/// Name every modeled node up front so collisions resolve the same way
/// regardless of the order schemas are built in later. Data nodes claim
/// names before groupings.
fn assign_names(ctx: &SchemaContext, modules: &[&Module], builder: &mut SchemaBuilder<'_>) {
    fn walk(ctx: &SchemaContext, id: NodeId, builder: &mut SchemaBuilder<'_>) {
        let node = ctx.node(id);
        if matches!(node.kind, NodeKind::Container | NodeKind::List) {
            builder.name(id);
        }
        for &child in &node.children {
            walk(ctx, child, builder);
        }
    }

    for module in modules {
        tracing::debug!(module = %module.name, "naming data nodes");
        for &child in &module.children {
            walk(ctx, child, builder);
        }
    }
    for module in modules {
        tracing::debug!(module = %module.name, "naming rpcs");
        for &rpc in &module.rpcs {
            for &io in &ctx.node(rpc).children {
                if matches!(ctx.node(io).kind, NodeKind::RpcInput | NodeKind::RpcOutput) {
                    builder.name(io);
                }
                walk(ctx, io, builder);
            }
        }
    }
    for module in modules {
        tracing::debug!(module = %module.name, "naming augmentations");
        for &aug in &module.augmentations {
            walk(ctx, aug, builder);
        }
    }
    for module in &ctx.modules {
        for &grouping in &module.groupings {
            builder.name(grouping);
            walk(ctx, grouping, builder);
        }
    }
}

// ---------------------------------------------------------------------------
// Module walk
// ---------------------------------------------------------------------------

struct ModuleWalker<'w, 'a> {
    ctx: &'a SchemaContext,
    module: &'a Module,
    selected: &'w HashSet<&'w str>,
    builder: &'w mut SchemaBuilder<'a>,
    handler: PathHandler<'w>,
    paths: &'w mut IndexMap<String, PathItem>,
}

impl ModuleWalker<'_, '_> {
    fn data(&mut self, max_depth: usize) {
        let root = PathSegment::root(self.module.name.clone());
        for &child in &self.module.children {
            self.node(child, &root, max_depth);
        }
    }

    /// Visit a data node: register its paths, descend, then register its
    /// schema. Choices and cases add no segment.
    fn node(&mut self, id: NodeId, parent: &PathSegment<'_>, depth: usize) {
        let ctx = self.ctx;
        let node = ctx.node(id);
        if depth == 0 {
            tracing::debug!(node = %node.qname(), "maximum depth reached, skipping node and its children");
            return;
        }
        if !self.selected.contains(node.module.as_str()) {
            tracing::debug!(node = %node.qname(), "skipping node of unselected module");
            return;
        }

        match node.kind {
            NodeKind::Container => {
                tracing::info!(container = %node.name, "processing container");
                let segment = parent
                    .child(node.name.clone(), node.module.clone())
                    .with_read_only(!node.config);
                let model = self.builder.definition_id(&EffectiveStack::new(), id);
                self.handler.container(self.paths, &segment, &model);
                for &child in &node.children {
                    self.node(child, &segment, depth - 1);
                }
                self.builder.add_schema(&mut EffectiveStack::new(), id, None);
            }
            NodeKind::List => {
                tracing::info!(list = %node.name, "processing list");
                let keys = self.keys(id);
                let segment = parent
                    .child(node.name.clone(), node.module.clone())
                    .with_read_only(!node.config)
                    .with_keys(keys);
                let model = self.builder.definition_id(&EffectiveStack::new(), id);
                self.handler.list(self.paths, &segment, &model);
                for &child in &node.children {
                    self.node(child, &segment, depth - 1);
                }
                self.builder.add_schema(&mut EffectiveStack::new(), id, None);
            }
            NodeKind::Choice => {
                tracing::debug!(choice = %node.name, "inlining choice");
                for &case in &node.children {
                    let case_node = ctx.node(case);
                    if case_node.kind == NodeKind::Case {
                        for &child in &case_node.children {
                            self.node(child, parent, depth - 1);
                        }
                    } else {
                        self.node(case, parent, depth - 1);
                    }
                }
            }
            NodeKind::Leaf | NodeKind::LeafList => {}
            kind => {
                tracing::debug!(node = %node.qname(), ?kind, "skipping unsupported node kind");
                self.builder.diagnose(Diagnostic::new(
                    DiagnosticKind::SkippedNode,
                    node.qname().to_string(),
                    format!("{kind:?} is not a data node"),
                ));
            }
        }
    }

    /// Key leaves of a list as `(name, description, schema)`.
    fn keys(&mut self, list: NodeId) -> Vec<(String, Option<String>, Schema)> {
        let ctx = self.ctx;
        let node = ctx.node(list);
        node.keys
            .iter()
            .map(|key| match ctx.data_child_by_name(list, key) {
                Some(leaf) => (
                    key.clone(),
                    ctx.node(leaf).description.clone(),
                    self.builder.leaf_schema(leaf),
                ),
                None => {
                    tracing::warn!(list = %node.qname(), key = %key, "key leaf not found, using string");
                    self.builder.diagnose(Diagnostic::new(
                        DiagnosticKind::ResolutionInconsistency,
                        node.qname().to_string(),
                        format!("key {key} has no matching leaf"),
                    ));
                    (key.clone(), None, Schema::string())
                }
            })
            .collect()
    }

    fn rpcs(&mut self) {
        let ctx = self.ctx;
        let root = PathSegment::root(self.module.name.clone());
        for &rpc in &self.module.rpcs {
            let node = ctx.node(rpc);
            tracing::info!(rpc = %node.name, "processing rpc");
            let segment = root.child(node.name.clone(), node.module.clone()).as_rpc();

            let find = |kind: NodeKind| node.children.iter().copied().find(|&c| ctx.node(c).kind == kind);
            let input = find(NodeKind::RpcInput)
                .map(|i| (i, self.builder.add_schema(&mut EffectiveStack::new(), i, Some("input"))));
            let output = find(NodeKind::RpcOutput)
                .map(|o| (o, self.builder.add_schema(&mut EffectiveStack::new(), o, Some("output"))));

            self.handler.rpc(
                self.paths,
                &segment,
                input.as_ref().map(|entry| model_ref(ctx, entry)),
                output.as_ref().map(|entry| model_ref(ctx, entry)),
            );
        }
    }
}

fn model_ref<'m>(ctx: &'m SchemaContext, (id, name): &'m (NodeId, String)) -> ModelRef<'m> {
    ModelRef {
        name,
        description: ctx.node(*id).description.as_deref(),
    }
}
