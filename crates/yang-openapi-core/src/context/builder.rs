//! Programmatic construction of a [`SchemaContext`].
//!
//! The builder applies the same linking rules a resolving parser does:
//! `uses` instantiates derived copies of the grouping's children, and
//! children added to an augmentation are spliced into the augmentation's
//! target.

use super::{Module, NodeId, NodeKind, SchemaContext, SchemaNode, TypeDef};

/// Where a new node is attached.
#[derive(Debug, Clone, Copy)]
pub enum Parent<'a> {
    /// Top level of the named module.
    Module(&'a str),
    Node(NodeId),
}

impl<'a> From<&'a str> for Parent<'a> {
    fn from(module: &'a str) -> Self {
        Parent::Module(module)
    }
}

impl From<NodeId> for Parent<'static> {
    fn from(id: NodeId) -> Self {
        Parent::Node(id)
    }
}

#[derive(Debug, Default)]
pub struct ContextBuilder {
    modules: Vec<Module>,
    nodes: Vec<SchemaNode>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a module. Declaring the same name twice updates the namespace
    /// and prefix.
    pub fn module(&mut self, name: &str, namespace: &str, prefix: &str) -> &mut Self {
        let module = self.module_mut(name);
        module.namespace = namespace.to_string();
        module.prefix = prefix.to_string();
        self
    }

    pub fn revision(&mut self, module: &str, revision: &str) -> &mut Self {
        self.module_mut(module).revision = Some(revision.to_string());
        self
    }

    // -----------------------------------------------------------------------
    // Data nodes
    // -----------------------------------------------------------------------

    pub fn container<'a>(&mut self, parent: impl Into<Parent<'a>>, name: &str) -> NodeId {
        self.add(parent.into(), NodeKind::Container, name)
    }

    pub fn list<'a>(&mut self, parent: impl Into<Parent<'a>>, name: &str, keys: &[&str]) -> NodeId {
        let id = self.add(parent.into(), NodeKind::List, name);
        self.node_mut(id).keys = keys.iter().map(|k| k.to_string()).collect();
        id
    }

    pub fn leaf<'a>(&mut self, parent: impl Into<Parent<'a>>, name: &str, ty: TypeDef) -> NodeId {
        let id = self.add(parent.into(), NodeKind::Leaf, name);
        self.node_mut(id).type_def = Some(ty);
        id
    }

    pub fn leaf_list<'a>(
        &mut self,
        parent: impl Into<Parent<'a>>,
        name: &str,
        ty: TypeDef,
    ) -> NodeId {
        let id = self.add(parent.into(), NodeKind::LeafList, name);
        self.node_mut(id).type_def = Some(ty);
        id
    }

    pub fn choice<'a>(&mut self, parent: impl Into<Parent<'a>>, name: &str) -> NodeId {
        self.add(parent.into(), NodeKind::Choice, name)
    }

    pub fn case(&mut self, choice: NodeId, name: &str) -> NodeId {
        self.add(Parent::Node(choice), NodeKind::Case, name)
    }

    // -----------------------------------------------------------------------
    // Definitions
    // -----------------------------------------------------------------------

    /// A top-level grouping. Its content must be complete before it is used.
    pub fn grouping(&mut self, module: &str, name: &str) -> NodeId {
        self.add(Parent::Module(module), NodeKind::Grouping, name)
    }

    pub fn rpc(&mut self, module: &str, name: &str) -> NodeId {
        self.add(Parent::Module(module), NodeKind::Rpc, name)
    }

    pub fn input(&mut self, rpc: NodeId) -> NodeId {
        self.add(Parent::Node(rpc), NodeKind::RpcInput, "input")
    }

    pub fn output(&mut self, rpc: NodeId) -> NodeId {
        self.add(Parent::Node(rpc), NodeKind::RpcOutput, "output")
    }

    /// Record that `node` uses `grouping` and instantiate copies of the
    /// grouping's children under it.
    ///
    /// Direct copies are flagged `added-by-uses`; nested copies keep the flag
    /// of the node they were copied from. Every copy links back to its source
    /// through `original`.
    pub fn uses(&mut self, node: NodeId, grouping: NodeId) -> &mut Self {
        self.node_mut(node).uses.push(grouping);
        let sources = self.nodes[grouping.index()].children.clone();
        for source in sources {
            self.instantiate(node, source, true);
        }
        self
    }

    /// Declare an augmentation of `target` owned by `module`. Children added
    /// to the returned node become augmenting children of `target`.
    pub fn augment(&mut self, module: &str, target: NodeId) -> NodeId {
        let name = self.nodes[target.index()].name.clone();
        let config = self.nodes[target.index()].config;
        let mut node = SchemaNode::new(NodeKind::Augmentation, module, name);
        node.target = Some(target);
        node.config = config;
        let id = self.push(node);
        self.module_mut(module).augmentations.push(id);
        self.node_mut(target).augmentations.push(id);
        id
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    pub fn describe(&mut self, id: NodeId, description: &str) -> &mut Self {
        self.node_mut(id).description = Some(description.to_string());
        self
    }

    pub fn reference(&mut self, id: NodeId, reference: &str) -> &mut Self {
        self.node_mut(id).reference = Some(reference.to_string());
        self
    }

    pub fn set_default(&mut self, id: NodeId, value: &str) -> &mut Self {
        self.node_mut(id).default = Some(value.to_string());
        self
    }

    /// Set the config flag of a node and everything below it.
    pub fn set_config(&mut self, id: NodeId, config: bool) -> &mut Self {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = self.node_mut(current);
            node.config = config;
            pending.extend(node.children.iter().copied());
        }
        self
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.index()]
    }

    pub fn build(self) -> SchemaContext {
        SchemaContext {
            modules: self.modules,
            nodes: self.nodes,
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn module_mut(&mut self, name: &str) -> &mut Module {
        let index = match self.modules.iter().position(|m| m.name == name) {
            Some(index) => index,
            None => {
                self.modules
                    .push(Module::new(name, format!("urn:{name}"), name));
                self.modules.len() - 1
            }
        };
        &mut self.modules[index]
    }

    fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn add(&mut self, parent: Parent<'_>, kind: NodeKind, name: &str) -> NodeId {
        match parent {
            Parent::Module(module) => {
                let id = self.push(SchemaNode::new(kind, module, name));
                let module = self.module_mut(module);
                match kind {
                    NodeKind::Grouping => module.groupings.push(id),
                    NodeKind::Rpc => module.rpcs.push(id),
                    _ => module.children.push(id),
                }
                id
            }
            Parent::Node(owner) => {
                let owner_node = &self.nodes[owner.index()];
                let mut node = SchemaNode::new(kind, owner_node.module.clone(), name);
                let spliced_into = match (owner_node.kind, owner_node.target) {
                    (NodeKind::Augmentation, Some(target)) => {
                        node.augmenting = true;
                        node.config = self.nodes[target.index()].config;
                        node.parent = Some(target);
                        Some(target)
                    }
                    _ => {
                        node.config = owner_node.config;
                        node.parent = Some(owner);
                        None
                    }
                };
                let id = self.push(node);
                self.node_mut(owner).children.push(id);
                if let Some(target) = spliced_into {
                    self.node_mut(target).children.push(id);
                }
                id
            }
        }
    }

    fn instantiate(&mut self, parent: NodeId, source: NodeId, direct: bool) -> NodeId {
        let src = self.nodes[source.index()].clone();
        let id = self.add(Parent::Node(parent), src.kind, &src.name);
        let copy = self.node_mut(id);
        copy.description = src.description;
        copy.reference = src.reference;
        copy.keys = src.keys;
        copy.type_def = src.type_def;
        copy.default = src.default;
        copy.uses = src.uses;
        copy.original = Some(source);
        copy.added_by_uses = direct || src.added_by_uses;
        copy.config = copy.config && src.config;
        for child in src.children {
            self.instantiate(id, child, false);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_creates_linked_copies() {
        let mut b = ContextBuilder::new();
        b.module("m", "urn:m", "m");
        let g = b.grouping("m", "endpoint");
        let host = b.leaf(g, "host", TypeDef::String);
        let inner = b.container(g, "inner");
        let port = b.leaf(inner, "port", TypeDef::Uint16);
        let root = b.container("m", "root");
        b.uses(root, g);

        let ctx = b.build();
        let root_node = ctx.node(root);
        assert_eq!(root_node.uses, vec![g]);
        assert_eq!(root_node.children.len(), 2);

        let host_copy = ctx.node(root_node.children[0]);
        assert_eq!(host_copy.original, Some(host));
        assert!(host_copy.added_by_uses);
        assert_eq!(host_copy.parent, Some(root));

        let inner_copy = root_node.children[1];
        let port_copy = ctx.node(ctx.node(inner_copy).children[0]);
        assert_eq!(port_copy.original, Some(port));
        assert!(!port_copy.added_by_uses);
        assert_eq!(ctx.origin(ctx.node(inner_copy).children[0]), port);
    }

    #[test]
    fn test_copies_take_using_module() {
        let mut b = ContextBuilder::new();
        b.module("types", "urn:types", "t");
        b.module("m", "urn:m", "m");
        let g = b.grouping("types", "g");
        b.leaf(g, "x", TypeDef::String);
        let root = b.container("m", "root");
        b.uses(root, g);

        let ctx = b.build();
        let copy = ctx.node(ctx.node(root).children[0]);
        assert_eq!(copy.module, "m");
    }

    #[test]
    fn test_augment_splices_into_target() {
        let mut b = ContextBuilder::new();
        b.module("base", "urn:base", "b");
        b.module("ext", "urn:ext", "e");
        let root = b.container("base", "root");
        b.leaf(root, "name", TypeDef::String);
        let aug = b.augment("ext", root);
        let extra = b.leaf(aug, "extra", TypeDef::Boolean);
        let stats = b.container(aug, "stats");
        let hits = b.leaf(stats, "hits", TypeDef::Uint32);

        let ctx = b.build();
        assert_eq!(ctx.node(root).augmentations, vec![aug]);
        assert!(ctx.node(root).children.contains(&extra));
        assert_eq!(ctx.node(aug).children, vec![extra, stats]);
        assert!(!ctx.node(hits).augmenting);
        assert_eq!(ctx.node(hits).module, "ext");

        let extra_node = ctx.node(extra);
        assert!(extra_node.augmenting);
        assert_eq!(extra_node.module, "ext");
        assert_eq!(extra_node.parent, Some(root));
        assert_eq!(ctx.module("ext").map(|m| m.augmentations.clone()), Some(vec![aug]));
    }

    #[test]
    fn test_set_config_applies_to_subtree() {
        let mut b = ContextBuilder::new();
        let state = b.container("m", "state");
        let inner = b.container(state, "inner");
        let leaf = b.leaf(inner, "counter", TypeDef::Uint64);
        b.set_config(state, false);
        let late = b.leaf(state, "late", TypeDef::String);

        let ctx = b.build();
        assert!(!ctx.node(inner).config);
        assert!(!ctx.node(leaf).config);
        assert!(!ctx.node(late).config);
    }

    #[test]
    fn test_rpc_input_output() {
        let mut b = ContextBuilder::new();
        let rpc = b.rpc("m", "reset");
        let input = b.input(rpc);
        let output = b.output(rpc);

        let ctx = b.build();
        assert_eq!(ctx.module("m").map(|m| m.rpcs.clone()), Some(vec![rpc]));
        assert_eq!(ctx.node(input).kind, NodeKind::RpcInput);
        assert_eq!(ctx.node(output).parent, Some(rpc));
    }
}
