//! Qualified schema names.
//!
//! A name is `<module package>.<ancestor packages>.<ClassName>`, e.g.
//! `ietf.interfaces.interfaces.Interface`. Copies that are not
//! tree-augmented share the name of the node they were copied from, so every
//! instantiation of a grouping's container resolves to one definition.

use std::collections::{HashMap, HashSet};

use heck::ToUpperCamelCase;

use crate::context::{NodeId, NodeKind, QName, SchemaContext};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::equivalence::TreeIndex;

// ---------------------------------------------------------------------------
// Name fragments
// ---------------------------------------------------------------------------

/// Class-cased form of a YANG identifier: `interface-type` → `InterfaceType`.
pub fn class_name(name: &str) -> String {
    let class = name.to_upper_camel_case();
    if class.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{class}")
    } else {
        class
    }
}

/// Package form of a module name: `ietf-interfaces` → `ietf.interfaces`.
pub fn package_segment(module: &str) -> String {
    module
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let part = part.to_ascii_lowercase();
            if part.starts_with(|c: char| c.is_ascii_digit()) {
                format!("_{part}")
            } else {
                part
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Last dot-separated segment of a qualified name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

fn join<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref())
        .filter(|p: &&str| !p.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Identity of an enumeration definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumKey {
    /// Enumeration declared by a typedef.
    Typedef(QName),
    /// Enumeration declared inline on a leaf (the leaf copies derive from).
    Inline(NodeId),
}

/// Names of every object and enum definition of one generation run.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: HashMap<NodeId, String>,
    /// Name to the node that computed it.
    claimed: HashMap<String, NodeId>,
    enums: HashMap<EnumKey, String>,
    enum_names: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of a container, list, grouping or RPC input/output.
    ///
    /// Idempotent per node. RPC input and output are named
    /// `<module>.<Rpc>Input` / `<module>.<Rpc>Output`.
    pub fn name(&mut self, ctx: &SchemaContext, tree: &TreeIndex, id: NodeId) -> String {
        if let Some(name) = self.names.get(&id) {
            return name.clone();
        }

        if !tree.is_tree_augmented(id) {
            let origin = ctx.origin(id);
            if origin != id {
                tracing::debug!(node = %ctx.qname(id), "reusing name of original definition");
                let name = self.name(ctx, tree, origin);
                self.names.insert(id, name.clone());
                return name;
            }
        }

        let name = self.compose(ctx, id);
        let name = self.claim(ctx, id, name);
        self.names.insert(id, name.clone());
        name
    }

    /// Whether a name has been handed out.
    pub fn is_known(&self, name: &str) -> bool {
        self.claimed.contains_key(name) || self.enum_names.contains(name)
    }

    fn compose(&self, ctx: &SchemaContext, id: NodeId) -> String {
        let node = ctx.node(id);
        let module = package_segment(&node.module);

        if matches!(node.kind, NodeKind::RpcInput | NodeKind::RpcOutput) {
            let rpc = node.parent.map(|p| ctx.node(p).name.as_str()).unwrap_or_default();
            let proposed = format!("{rpc}-{}", node.name);
            return join(&[&module, &class_name(&proposed)]);
        }

        let packages = ancestor_packages(ctx, id);
        join(&[&module, &packages, &class_name(&node.name)])
    }

    fn claim(&mut self, ctx: &SchemaContext, id: NodeId, name: String) -> String {
        let existing = self.claimed.get(&name).copied();
        match existing {
            None => {
                tracing::debug!(node = %ctx.qname(id), name = %name, "generated name");
                self.claimed.insert(name.clone(), id);
                name
            }
            Some(owner) if owner == id => name,
            Some(owner) => {
                let node = ctx.node(id);
                if node.kind == NodeKind::Grouping {
                    let packages = ancestor_packages(ctx, id);
                    let prefixed = join(&[
                        &package_segment(&node.module),
                        &packages,
                        &format!("G{}", class_name(&node.name)),
                    ]);
                    if !self.claimed.contains_key(&prefixed) {
                        tracing::debug!(grouping = %node.qname(), name = %prefixed, "grouping renamed");
                        self.claimed.insert(prefixed.clone(), id);
                        return prefixed;
                    }
                }
                tracing::error!(
                    name = %name,
                    node = %node.qname(),
                    owner = %ctx.qname(owner),
                    "object name collision"
                );
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::NameCollision {
                        name: name.clone(),
                        recovered: false,
                    },
                    node.qname().to_string(),
                    format!("name {name} is already used by {}", ctx.qname(owner)),
                ));
                name
            }
        }
    }

    /// Name of an enumeration definition, memoized by key.
    ///
    /// Returns the name and whether it was newly assigned.
    pub fn enum_name(&mut self, ctx: &SchemaContext, key: &EnumKey) -> (String, bool) {
        if let Some(name) = self.enums.get(key) {
            tracing::debug!(name = %name, "reusing enum model");
            return (name.clone(), false);
        }

        let base = match key {
            EnumKey::Typedef(qname) => {
                join(&[&package_segment(&qname.module), &class_name(&qname.name)])
            }
            EnumKey::Inline(leaf) => {
                let node = ctx.node(*leaf);
                join(&[
                    &package_segment(&node.module),
                    &ancestor_packages(ctx, *leaf),
                    &class_name(&format!("{}-enumeration", node.name)),
                ])
            }
        };

        let mut candidate = base.clone();
        let mut idx = 1;
        while self.is_known(&candidate) {
            tracing::warn!(name = %candidate, "name already defined for enum, adding suffix");
            candidate = format!("{base}{idx}");
            idx += 1;
        }
        if candidate != base {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::NameCollision {
                    name: base.clone(),
                    recovered: true,
                },
                base,
                format!("enumeration registered as {candidate}"),
            ));
        }

        self.enums.insert(key.clone(), candidate.clone());
        self.enum_names.insert(candidate.clone());
        (candidate, true)
    }

    /// Name of the `index`-th (1-based) augmentation fragment of `node`.
    pub fn augmentation_name(
        &mut self,
        ctx: &SchemaContext,
        augmentation: NodeId,
        node: NodeId,
        base_name: &str,
        index: usize,
    ) -> String {
        let module = package_segment(&ctx.node(augmentation).module);
        let name = join(&[
            &module,
            &ancestor_packages(ctx, node),
            &format!("{}Augmentation{index}", simple_name(base_name)),
        ]);
        self.claim(ctx, augmentation, name)
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Lower-cased class names of every ancestor, outermost first.
fn ancestor_packages(ctx: &SchemaContext, id: NodeId) -> String {
    let mut segments: Vec<String> = ctx
        .ancestors(id)
        .map(|a| class_name(&ctx.node(a).name).to_lowercase())
        .collect();
    segments.reverse();
    segments.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextBuilder, TypeDef};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_class_name_and_package_segment() {
        assert_eq!(class_name("interface-type"), "InterfaceType");
        assert_eq!(class_name("items"), "Items");
        assert_eq!(class_name("8021x"), "_8021x");
        assert_eq!(package_segment("ietf-interfaces"), "ietf.interfaces");
        assert_eq!(package_segment("Vendor_2-ext"), "vendor._2.ext");
        assert_eq!(simple_name("m.root.Items"), "Items");
    }

    #[test]
    fn test_name_includes_ancestor_packages() {
        let mut b = ContextBuilder::new();
        b.module("ietf-interfaces", "urn:if", "if");
        let root = b.container("ietf-interfaces", "interfaces");
        let list = b.list(root, "interface", &["name"]);
        let ctx = b.build();
        let tree = TreeIndex::new(&ctx);
        let mut names = NameRegistry::new();

        assert_eq!(names.name(&ctx, &tree, root), "ietf.interfaces.Interfaces");
        assert_eq!(
            names.name(&ctx, &tree, list),
            "ietf.interfaces.interfaces.Interface"
        );
    }

    #[test]
    fn test_copies_share_original_name() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let g = b.grouping("m", "g");
        let inner = b.container(g, "inner");
        let a = b.container("m", "a");
        b.uses(a, g);
        let c = b.container("m", "c");
        b.uses(c, g);
        let ctx = b.build();
        let tree = TreeIndex::new(&ctx);
        let mut names = NameRegistry::new();

        let copy_a = ctx.node(a).children[0];
        let copy_c = ctx.node(c).children[0];
        assert_eq!(names.name(&ctx, &tree, copy_a), "m.g.Inner");
        assert_eq!(names.name(&ctx, &tree, copy_c), "m.g.Inner");
        assert_eq!(names.name(&ctx, &tree, inner), "m.g.Inner");
    }

    #[test]
    fn test_tree_augmented_copy_gets_own_name() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let g = b.grouping("m", "g");
        b.container(g, "inner");
        let a = b.container("m", "a");
        b.uses(a, g);
        let copy = b.children(a)[0];
        let aug = b.augment("ext", copy);
        b.leaf(aug, "extra", TypeDef::String);
        let ctx = b.build();
        let tree = TreeIndex::new(&ctx);
        let mut names = NameRegistry::new();

        assert_eq!(names.name(&ctx, &tree, copy), "m.a.Inner");
    }

    #[test]
    fn test_rpc_input_output_names() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let rpc = b.rpc("m", "reset-counters");
        let input = b.input(rpc);
        let output = b.output(rpc);
        let ctx = b.build();
        let tree = TreeIndex::new(&ctx);
        let mut names = NameRegistry::new();

        assert_eq!(names.name(&ctx, &tree, input), "m.ResetCountersInput");
        assert_eq!(names.name(&ctx, &tree, output), "m.ResetCountersOutput");
    }

    #[test]
    fn test_grouping_collision_gets_prefix() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let container = b.container("m", "interfaces");
        let grouping = b.grouping("m", "interfaces");
        let ctx = b.build();
        let tree = TreeIndex::new(&ctx);
        let mut names = NameRegistry::new();

        assert_eq!(names.name(&ctx, &tree, container), "m.Interfaces");
        assert_eq!(names.name(&ctx, &tree, grouping), "m.GInterfaces");
        assert!(names.take_diagnostics().is_empty());
    }

    #[test]
    fn test_object_collision_is_reported() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let first = b.container("m", "a-b");
        let second = b.container("m", "a_b");
        let ctx = b.build();
        let tree = TreeIndex::new(&ctx);
        let mut names = NameRegistry::new();

        names.name(&ctx, &tree, first);
        names.name(&ctx, &tree, second);
        let diags = names.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].kind,
            DiagnosticKind::NameCollision {
                name: "m.AB".into(),
                recovered: false
            }
        );
    }

    // ── Enumerations ────────────────────────────────────────────────────────

    #[test]
    fn test_inline_enums_are_parent_qualified() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let enumeration = || TypeDef::Enumeration {
            name: None,
            values: vec!["up".into(), "down".into()],
        };
        let a = b.container("m", "a");
        let sa = b.leaf(a, "status", enumeration());
        let c = b.container("m", "c");
        let sc = b.leaf(c, "status", enumeration());
        let ctx = b.build();
        let mut names = NameRegistry::new();

        let (first, fresh_first) = names.enum_name(&ctx, &EnumKey::Inline(sa));
        let (second, fresh_second) = names.enum_name(&ctx, &EnumKey::Inline(sc));
        assert_eq!(first, "m.a.StatusEnumeration");
        assert_eq!(second, "m.c.StatusEnumeration");
        assert!(fresh_first && fresh_second);

        let (again, fresh) = names.enum_name(&ctx, &EnumKey::Inline(sa));
        assert_eq!(again, first);
        assert!(!fresh);
    }

    #[test]
    fn test_enum_collision_gets_incrementing_suffix() {
        let ctx = SchemaContext::default();
        let mut names = NameRegistry::new();
        // Same class name from differently spelled typedefs.
        let keys = [
            EnumKey::Typedef(QName::new("m", "oper-status")),
            EnumKey::Typedef(QName::new("m", "oper_status")),
            EnumKey::Typedef(QName::new("m", "OperStatus")),
        ];

        let assigned: Vec<String> = keys.iter().map(|k| names.enum_name(&ctx, k).0).collect();
        assert_eq!(assigned, vec!["m.OperStatus", "m.OperStatus1", "m.OperStatus2"]);
        assert_eq!(names.take_diagnostics().len(), 2);
    }
}
