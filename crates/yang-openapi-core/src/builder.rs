//! Schema synthesis.
//!
//! [`SchemaBuilder`] turns containers, lists, groupings and RPC
//! input/output nodes into named schemas. Nodes with the same identity (see
//! [`crate::equivalence`]) share one definition; nodes using several
//! groupings become an all-of over the groupings' definitions plus an inline
//! object; augmented nodes become an all-of over their base schema and one
//! fragment per augmentation.
//!
//! The [`EffectiveStack`] is passed explicitly through every call. Each
//! `schema` call pushes exactly one frame and pops it before returning.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::json;

use crate::context::{NodeId, NodeKind, SchemaContext, SchemaNode};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::equivalence::{EffectiveStack, Resolver, TreeIndex};
use crate::inheritance;
use crate::naming::{EnumKey, NameRegistry};
use crate::openapi::{Schema, SchemaKind};
use crate::types::{DefinitionSink, TypeConverter};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Named schemas registered so far, their names and the anomalies seen.
#[derive(Debug, Default)]
struct Definitions {
    names: NameRegistry,
    schemas: IndexMap<String, Schema>,
    diagnostics: Vec<Diagnostic>,
}

impl Definitions {
    /// Register `schema` under `name`. A structurally different schema
    /// already registered under the name is overridden with a warning.
    fn insert(&mut self, name: String, schema: Schema, subject: &str) {
        if let Some(existing) = self.schemas.get(&name) {
            if existing.equivalent(&schema) {
                return;
            }
            tracing::warn!(name = %name, node = %subject, "overriding model");
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::StructuralOverride { name: name.clone() },
                subject,
                format!("schema {name} replaced by a structurally different one"),
            ));
        }
        self.schemas.insert(name, schema);
    }
}

impl DefinitionSink for Definitions {
    fn add_enum(&mut self, ctx: &SchemaContext, key: EnumKey, values: &[String]) -> String {
        let (name, fresh) = self.names.enum_name(ctx, &key);
        if fresh {
            tracing::debug!(name = %name, "generating enum model");
            self.schemas
                .insert(name.clone(), Schema::enumeration(values.to_vec()));
        }
        name
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Groupings whose definitions can be referenced, and names of the
/// attributes that have to be inlined instead.
#[derive(Debug, Default)]
struct GroupingInfo {
    models: Vec<NodeId>,
    attributes: HashSet<String>,
}

impl GroupingInfo {
    fn merge(&mut self, other: GroupingInfo) {
        for model in other.models {
            if !self.models.contains(&model) {
                self.models.push(model);
            }
        }
        self.attributes.extend(other.attributes);
    }
}

/// Description of a node, with its reference appended as ` REF:<ref>`.
fn desc(node: &SchemaNode) -> Option<String> {
    match (&node.description, &node.reference) {
        (Some(d), Some(r)) => Some(format!("{d} REF:{r}")),
        (None, Some(r)) => Some(format!("REF:{r}")),
        (d, None) => d.clone(),
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct SchemaBuilder<'a> {
    ctx: &'a SchemaContext,
    resolver: Resolver<'a>,
    converter: TypeConverter,
    defs: Definitions,
    /// Built schema per node, for reuse by related nodes.
    existing: HashMap<NodeId, Schema>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(ctx: &'a SchemaContext, tree: &'a TreeIndex, converter: TypeConverter) -> Self {
        Self {
            ctx,
            resolver: Resolver::new(ctx, tree),
            converter,
            defs: Definitions::default(),
            existing: HashMap::new(),
        }
    }

    /// Name of a node as computed by the registry, without identity
    /// resolution. Used by the naming pre-pass.
    pub fn name(&mut self, id: NodeId) -> String {
        self.defs.names.name(self.ctx, self.resolver.tree(), id)
    }

    pub fn schemas(&self) -> &IndexMap<String, Schema> {
        &self.defs.schemas
    }

    /// Registered schemas and every diagnostic collected during the run.
    pub fn finish(mut self) -> (IndexMap<String, Schema>, Vec<Diagnostic>) {
        let mut diagnostics = self.defs.names.take_diagnostics();
        diagnostics.append(&mut self.defs.diagnostics);
        (self.defs.schemas, diagnostics)
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.defs.diagnostics.push(diagnostic);
    }

    /// Convert the type of leaf `id`, registering any enum it needs.
    pub fn leaf_schema(&mut self, id: NodeId) -> Schema {
        let ctx = self.ctx;
        let node = ctx.node(id);
        match &node.type_def {
            Some(ty) => self.converter.convert(self.ctx, ty, id, &mut self.defs),
            None => {
                tracing::debug!(node = %node.qname(), "leaf without type, using string");
                Schema::string()
            }
        }
    }

    /// Name of the definition that stands for `id` as seen from `stack`.
    pub fn definition_id(&mut self, stack: &EffectiveStack, id: NodeId) -> String {
        let tree = self.resolver.tree();
        if self.resolver.is_tree_augmented(id) {
            let effective = stack.find(self.ctx, &self.ctx.qname(id)).unwrap_or(id);
            return self.defs.names.name(self.ctx, tree, effective);
        }
        let identity = self.resolver.identity_of(stack, id);
        self.defs.names.name(self.ctx, tree, identity)
    }

    /// Build the schema of `id` and register it. With a `tag` the schema is
    /// wrapped as `{tag: schema}` and registered under the node's own name.
    /// Returns the name the schema is registered under.
    pub fn add_schema(&mut self, stack: &mut EffectiveStack, id: NodeId, tag: Option<&str>) -> String {
        let schema = self.build(stack, id);
        let subject = self.ctx.qname(id).to_string();
        let (name, schema) = match tag {
            Some(tag) => {
                let mut props = IndexMap::new();
                props.insert(tag.to_string(), schema);
                (self.name(id), Schema::object(props))
            }
            None => (self.definition_id(stack, id), schema),
        };
        self.defs.insert(name.clone(), schema, &subject);
        name
    }

    fn build(&mut self, stack: &mut EffectiveStack, id: NodeId) -> Schema {
        if self.resolver.is_tree_augmented(id) {
            return self.schema(stack, id);
        }
        match self.existing_model(stack, id) {
            Some(schema) => schema,
            None => self.schema(stack, id),
        }
    }

    fn existing_model(&self, stack: &EffectiveStack, id: NodeId) -> Option<Schema> {
        self.resolver
            .related(stack, id)
            .into_iter()
            .find_map(|n| self.existing.get(&n).cloned())
    }

    /// Reference to the definition of a container or list property,
    /// registering the definition when it is not built yet.
    fn ref_or_structure(&mut self, stack: &mut EffectiveStack, id: NodeId) -> Schema {
        let effective = stack
            .child(self.ctx, &self.ctx.qname(id))
            .filter(|&e| self.resolver.is_tree_augmented(e));

        match effective {
            Some(effective) => {
                let name = self.definition_id(stack, effective);
                if !self.existing.contains_key(&effective) {
                    tracing::debug!(name = %name, "adding referenced augmented model");
                    self.add_schema(stack, effective, None);
                }
                Schema::reference(name)
            }
            None => {
                let name = self.definition_id(stack, id);
                if self.existing_model(stack, id).is_none() {
                    tracing::debug!(name = %name, "adding referenced model");
                    self.add_schema(stack, id, None);
                }
                Schema::reference(name)
            }
        }
    }

    fn schema(&mut self, stack: &mut EffectiveStack, id: NodeId) -> Schema {
        let ctx = self.ctx;
        let node = ctx.node(id);
        let frame = if stack.is_empty() {
            id
        } else {
            match stack.child(self.ctx, &node.qname()) {
                Some(child) => child,
                None => {
                    if node.kind.is_data_node() {
                        tracing::warn!(node = %node.qname(), "no effective child found");
                    }
                    id
                }
            }
        };
        stack.push(frame);

        let to_model = self.ctx.origin(id);
        let mut schema = self.from_container(stack, to_model);

        if self.resolver.is_augmented(id) {
            tracing::debug!(node = %node.qname(), "processing augmentations");
            let base_name = self.definition_id(stack, to_model);
            let (mut members, description) = match schema.kind {
                SchemaKind::AllOf(members) => (members, schema.description),
                kind => {
                    let mut base = Schema::from(kind);
                    base.default = schema.default;
                    base.extensions = schema.extensions;
                    (vec![base], schema.description)
                }
            };
            for (idx, &aug) in node.augmentations.iter().enumerate() {
                let fragment = self.from_augmentation(stack, aug);
                let name = self.defs.names.augmentation_name(self.ctx, aug, id, &base_name, idx + 1);
                self.defs.insert(name.clone(), fragment, &self.ctx.qname(aug).to_string());
                members.push(Schema::reference(name));
            }
            schema = Schema::all_of(members).with_description(description);
        }

        self.existing.insert(id, schema.clone());
        if !self.resolver.is_tree_augmented(id) {
            self.existing.insert(to_model, schema.clone());
            let identity = self.resolver.identity_of(stack, id);
            self.existing.entry(identity).or_insert_with(|| schema.clone());
        }

        stack.pop();
        schema
    }

    /// Schema of a container with zero or one effective grouping use,
    /// following direct grouping uses down to the grouping that declares
    /// the content.
    fn from_container(&mut self, stack: &mut EffectiveStack, id: NodeId) -> Schema {
        let mut to_model = id;
        let simple = loop {
            let previous = to_model;
            let direct = self.resolver.is_direct_grouping(stack, to_model);
            let simple = direct || self.resolver.uses(to_model).is_empty();
            if direct {
                if let Some(grouping) = self.resolver.grouping(to_model) {
                    to_model = grouping;
                }
            }
            if previous == to_model || !simple {
                break simple;
            }
        };

        if simple {
            self.simple(stack, to_model)
        } else {
            self.composed(stack, to_model)
        }
    }

    fn from_augmentation(&mut self, stack: &mut EffectiveStack, aug: NodeId) -> Schema {
        let schema = self.from_container(stack, aug);
        let existing = self
            .defs
            .schemas
            .iter()
            .find(|(_, s)| s.equivalent(&schema))
            .map(|(name, _)| name.clone());

        let schema = match existing {
            Some(name) => {
                tracing::debug!(name = %name, "augmentation matches existing model");
                Schema::all_of(vec![Schema::reference(name)])
            }
            None => schema,
        };

        let module_name = &self.ctx.node(aug).module;
        match self.ctx.module(module_name) {
            Some(module) => schema.with_extension(
                "x-augmentation",
                json!({ "namespace": module.namespace, "prefix": module.name }),
            ),
            None => {
                tracing::warn!(module = %module_name, "augmenting module not found");
                self.defs.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ResolutionInconsistency,
                    self.ctx.qname(aug).to_string(),
                    format!("module {module_name} of augmentation not found"),
                ));
                schema
            }
        }
    }

    fn simple(&mut self, stack: &mut EffectiveStack, id: NodeId) -> Schema {
        let ctx = self.ctx;
        let node = ctx.node(id);
        tracing::debug!(node = %node.qname(), "added object type");
        let properties = self.structure(stack, id, &HashSet::new());
        Schema::object(properties).with_description(desc(node))
    }

    fn traverse(&mut self, stack: &EffectiveStack, def: NodeId) -> GroupingInfo {
        let mut info = GroupingInfo::default();
        for used in self.resolver.uses(def) {
            let sub = self.traverse(stack, used);
            info.merge(sub);
        }

        let ctx = self.ctx;
        let local = ctx.node(def).children.iter().filter(|&&c| !ctx.node(c).added_by_uses);
        let mut reuse = info.attributes.is_empty();
        if reuse {
            let none_augmented = local.clone().all(|&c| {
                stack
                    .child(ctx, &ctx.qname(c))
                    .map_or(true, |effective| !self.resolver.is_augmented(effective))
            });
            if none_augmented {
                tracing::debug!(grouping = %ctx.qname(def), "reusing grouping model");
                info.models = vec![def];
            } else {
                reuse = false;
            }
        }
        if !reuse {
            info.attributes
                .extend(local.map(|&c| ctx.node(c).name.clone()));
        }
        info
    }

    fn composed(&mut self, stack: &mut EffectiveStack, id: NodeId) -> Schema {
        let ctx = self.ctx;
        let node = ctx.node(id);
        let mut refs: Vec<String> = Vec::new();
        let mut attributes: HashSet<String> = HashSet::new();

        for used in self.resolver.uses(id) {
            let info = self.traverse(stack, used);
            for def in info.models {
                let name = self.definition_id(stack, def);
                if self.existing_model(stack, def).is_none() {
                    tracing::debug!(name = %name, "adding model for grouping");
                    self.add_schema(stack, def, None);
                }
                refs.push(name);
            }
            attributes.extend(info.attributes);
        }

        let refs = inheritance::optimize(&refs, &self.defs.schemas);
        if refs.len() > 1 {
            tracing::warn!(node = %node.qname(), references = ?refs, "multiple inheritance");
            self.defs.diagnostics.push(Diagnostic::new(
                DiagnosticKind::MultipleInheritance {
                    references: refs.clone(),
                },
                node.qname().to_string(),
                format!("{} grouping references remain after optimization", refs.len()),
            ));
        }

        let properties = self.structure(stack, id, &attributes);
        let mut members: Vec<Schema> = refs.iter().map(Schema::reference).collect();
        if properties.is_empty() {
            if members.len() == 1 {
                tracing::debug!(node = %node.qname(), "composed model without attributes");
            }
            return Schema::all_of(members).with_description(desc(node));
        }
        members.push(Schema::object(properties).with_description(desc(node)));
        Schema::all_of(members)
    }

    /// Properties of `id`: its local children plus the inherited children
    /// named in `attributes`. Choices are flattened into the same map.
    fn structure(
        &mut self,
        stack: &mut EffectiveStack,
        id: NodeId,
        attributes: &HashSet<String>,
    ) -> IndexMap<String, Schema> {
        let ctx = self.ctx;
        let included: Vec<NodeId> = ctx
            .node(id)
            .children
            .iter()
            .copied()
            .filter(|&c| self.resolver.is_local_child(id, c) || attributes.contains(&ctx.node(c).name))
            .collect();

        let mut properties = IndexMap::new();
        for &child in included.iter().filter(|&&c| ctx.node(c).kind != NodeKind::Choice) {
            if let Some((name, schema)) = self.property(stack, child) {
                properties.insert(name, schema);
            }
        }
        for &choice in included.iter().filter(|&&c| ctx.node(c).kind == NodeKind::Choice) {
            self.choice_properties(stack, choice, &mut properties);
        }
        properties
    }

    /// Every case's children tagged `x-choice: "<choice>:<case>"`. The last
    /// property written under a name wins.
    fn choice_properties(
        &mut self,
        stack: &mut EffectiveStack,
        choice: NodeId,
        properties: &mut IndexMap<String, Schema>,
    ) {
        let ctx = self.ctx;
        let choice_name = &ctx.node(choice).name;
        for &case in &ctx.node(choice).children {
            let case_node = ctx.node(case);
            // A shorthand case is the data node itself.
            let members: Vec<NodeId> = if case_node.kind == NodeKind::Case {
                case_node.children.clone()
            } else {
                vec![case]
            };
            for member in members {
                if ctx.node(member).kind == NodeKind::Choice {
                    self.choice_properties(stack, member, properties);
                    continue;
                }
                if let Some((name, schema)) = self.property(stack, member) {
                    let marker = format!("{choice_name}:{}", case_node.name);
                    properties.insert(name, schema.with_extension("x-choice", json!(marker)));
                }
            }
        }
    }

    fn property(&mut self, stack: &mut EffectiveStack, id: NodeId) -> Option<(String, Schema)> {
        let ctx = self.ctx;
        let node = ctx.node(id);
        let schema = match node.kind {
            NodeKind::Leaf => self.leaf_schema(id).with_default(node.default.clone()),
            NodeKind::LeafList => Schema::array(self.leaf_schema(id)),
            NodeKind::Container => self.ref_or_structure(stack, id),
            NodeKind::List => Schema::array(self.ref_or_structure(stack, id)),
            _ => {
                tracing::debug!(node = %node.qname(), kind = ?node.kind, "skipping unsupported property");
                return None;
            }
        };

        let name = if node.augmenting {
            if self.ctx.module(&node.module).is_none() {
                tracing::warn!(module = %node.module, "module of augmenting node not found");
                self.defs.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ResolutionInconsistency,
                    node.qname().to_string(),
                    format!("module {} not found", node.module),
                ));
            }
            format!("{}:{}", node.module, node.name)
        } else {
            node.name.clone()
        };
        Some((name, schema.with_description(desc(node))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextBuilder, TypeDef};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(ctx: &SchemaContext, nodes: &[NodeId]) -> (IndexMap<String, Schema>, Vec<Diagnostic>) {
        let tree = TreeIndex::new(ctx);
        let mut builder = SchemaBuilder::new(ctx, &tree, TypeConverter::new(true).unwrap());
        let mut stack = EffectiveStack::new();
        for &id in nodes {
            builder.add_schema(&mut stack, id, None);
            assert!(stack.is_empty());
        }
        builder.finish()
    }

    fn value(schema: &Schema) -> serde_json::Value {
        serde_json::to_value(schema).unwrap()
    }

    // ── Simple objects ──────────────────────────────────────────────────────

    #[test]
    fn test_simple_container() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let root = b.container("m", "root");
        b.describe(root, "top level").reference(root, "RFC 1");
        let name = b.leaf(root, "name", TypeDef::String);
        b.set_default(name, "x");
        b.leaf_list(root, "tags", TypeDef::Int32);
        let ctx = b.build();

        let (schemas, diagnostics) = run(&ctx, &[root]);
        assert!(diagnostics.is_empty());
        assert_eq!(
            value(&schemas["m.Root"]),
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "default": "x" },
                    "tags": { "type": "array", "items": { "type": "integer" } }
                },
                "description": "top level REF:RFC 1"
            })
        );
    }

    #[test]
    fn test_nested_container_is_referenced() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let root = b.container("m", "root");
        let items = b.list(root, "items", &["id"]);
        b.leaf(items, "id", TypeDef::String);
        let ctx = b.build();

        let (schemas, _) = run(&ctx, &[root]);
        assert_eq!(
            value(&schemas["m.Root"])["properties"],
            json!({
                "items": {
                    "type": "array",
                    "items": { "$ref": "#/components/schemas/m.root.Items" }
                }
            })
        );
        assert!(schemas.contains_key("m.root.Items"));
    }

    // ── Groupings ───────────────────────────────────────────────────────────

    #[test]
    fn test_direct_grouping_shares_definition() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let g = b.grouping("m", "address");
        b.leaf(g, "street", TypeDef::String);
        let home = b.container("m", "home");
        b.uses(home, g);
        let work = b.container("m", "work");
        b.uses(work, g);
        let ctx = b.build();

        let (schemas, diagnostics) = run(&ctx, &[home, work]);
        assert!(diagnostics.is_empty());
        let keys: Vec<_> = schemas.keys().cloned().collect();
        assert_eq!(keys, vec!["m.Address"]);
    }

    #[test]
    fn test_multiple_groupings_compose_all_of() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let a = b.grouping("m", "a");
        b.leaf(a, "x", TypeDef::String);
        let bg = b.grouping("m", "b");
        b.uses(bg, a);
        b.leaf(bg, "y", TypeDef::String);
        let c = b.grouping("m", "c");
        b.leaf(c, "z", TypeDef::String);
        let node = b.container("m", "node");
        b.uses(node, a).uses(node, bg).uses(node, c);
        b.leaf(node, "own", TypeDef::Boolean);
        let ctx = b.build();

        let (schemas, diagnostics) = run(&ctx, &[node]);
        let node_schema = &schemas["m.Node"];
        let refs: Vec<_> = node_schema
            .members()
            .unwrap()
            .iter()
            .filter_map(Schema::ref_name)
            .collect();
        assert_eq!(refs, vec!["m.B", "m.C"]);
        assert!(matches!(
            node_schema.members().unwrap().last().map(|m| &m.kind),
            Some(SchemaKind::Object(_))
        ));
        assert!(diagnostics
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::MultipleInheritance { .. })));
    }

    // ── Choices ─────────────────────────────────────────────────────────────

    #[test]
    fn test_choice_cases_are_inlined() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let root = b.container("m", "root");
        let choice = b.choice(root, "kind");
        let case1 = b.case(choice, "case1");
        b.leaf(case1, "a", TypeDef::String);
        let case2 = b.case(choice, "case2");
        b.leaf(case2, "b", TypeDef::Boolean);
        let ctx = b.build();

        let (schemas, _) = run(&ctx, &[root]);
        let props = value(&schemas["m.Root"])["properties"].clone();
        assert_eq!(props["a"]["x-choice"], json!("kind:case1"));
        assert_eq!(props["b"]["x-choice"], json!("kind:case2"));
    }

    // ── Augmentations ───────────────────────────────────────────────────────

    #[test]
    fn test_augmented_container_gets_fragment() {
        let mut b = ContextBuilder::new();
        b.module("base", "urn:base", "b");
        b.module("ext", "urn:ext", "e");
        let root = b.container("base", "root");
        b.leaf(root, "name", TypeDef::String);
        let aug = b.augment("ext", root);
        b.leaf(aug, "extra", TypeDef::String);
        let ctx = b.build();

        let (schemas, _) = run(&ctx, &[root]);
        let root_schema = value(&schemas["base.Root"]);
        assert_eq!(
            root_schema["allOf"][1],
            json!({ "$ref": "#/components/schemas/ext.RootAugmentation1" })
        );
        assert_eq!(
            root_schema["allOf"][0]["properties"],
            json!({ "name": { "type": "string" } })
        );

        let fragment = value(&schemas["ext.RootAugmentation1"]);
        assert_eq!(fragment["properties"], json!({ "ext:extra": { "type": "string" } }));
        assert_eq!(
            fragment["x-augmentation"],
            json!({ "namespace": "urn:ext", "prefix": "ext" })
        );
    }

    #[test]
    fn test_nested_build_restores_open_frames() {
        let mut b = ContextBuilder::new();
        b.module("base", "urn:base", "b");
        b.module("ext", "urn:ext", "e");
        let root = b.container("base", "root");
        let items = b.list(root, "items", &["id"]);
        b.leaf(items, "id", TypeDef::String);
        let aug = b.augment("ext", items);
        let stats = b.container(aug, "stats");
        b.leaf(stats, "hits", TypeDef::Uint32);
        let ctx = b.build();

        let tree = TreeIndex::new(&ctx);
        let mut builder = SchemaBuilder::new(&ctx, &tree, TypeConverter::new(true).unwrap());
        let mut stack = EffectiveStack::new();
        stack.push(root);
        builder.add_schema(&mut stack, items, None);

        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top(), Some(root));
        assert!(builder.schemas().contains_key("base.root.Items"));
    }

    // ── Enums ───────────────────────────────────────────────────────────────

    #[test]
    fn test_inline_enums_in_different_containers_stay_apart() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let values = || TypeDef::Enumeration {
            name: None,
            values: vec!["up".into(), "down".into()],
        };
        let a = b.container("m", "a");
        b.leaf(a, "status", values());
        let other = b.container("m", "b");
        b.leaf(other, "status", values());
        let ctx = b.build();

        let (schemas, _) = run(&ctx, &[a, other]);
        assert!(schemas.contains_key("m.a.StatusEnumeration"));
        assert!(schemas.contains_key("m.b.StatusEnumeration"));
        assert_eq!(
            value(&schemas["m.A"])["properties"]["status"],
            json!({ "$ref": "#/components/schemas/m.a.StatusEnumeration" })
        );
    }

    // ── Overrides ───────────────────────────────────────────────────────────

    #[test]
    fn test_equivalent_reinsert_is_silent() {
        let mut defs = Definitions::default();
        defs.insert("m.A".into(), Schema::string(), "m:a");
        defs.insert("m.A".into(), Schema::string(), "m:a");
        assert!(defs.diagnostics.is_empty());

        defs.insert("m.A".into(), Schema::boolean(), "m:a");
        assert_eq!(defs.diagnostics.len(), 1);
        assert_eq!(defs.schemas["m.A"], Schema::boolean());
    }
}
