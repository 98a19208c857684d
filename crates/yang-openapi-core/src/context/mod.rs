//! Read-only model of a resolved YANG schema context.
//!
//! Parsing, module resolution, type derivation and augmentation linking all
//! happen outside this crate. What arrives here is a flat arena of nodes that
//! refer to each other by [`NodeId`]. The generator never mutates a context.
//!
//! Two conventions matter to the generator:
//!
//! - Nodes instantiated from a grouping (`uses`) are *copies* carrying an
//!   [`SchemaNode::original`] back-link to the grouping's node, the using
//!   module as their `module`, and `added-by-uses` on the direct copies.
//! - Augmenting children appear both in the augmentation's `children` and in
//!   the target's `children`, have the target as `parent`, and are flagged
//!   `augmenting`.
//!
//! [`ContextBuilder`] produces contexts that follow both conventions.

mod builder;

pub use builder::{ContextBuilder, Parent};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Index of a node in [`SchemaContext::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Qualified name of a schema node: owning module plus local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    pub module: String,
    pub name: String,
}

impl QName {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.name)
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Container,
    List,
    Leaf,
    LeafList,
    Choice,
    Case,
    Grouping,
    Augmentation,
    Rpc,
    RpcInput,
    RpcOutput,
}

impl NodeKind {
    /// Nodes that are part of the data tree proper.
    ///
    /// Groupings, augmentations and the RPC statement itself are definitions
    /// rather than data nodes.
    pub fn is_data_node(self) -> bool {
        !matches!(self, NodeKind::Grouping | NodeKind::Augmentation | NodeKind::Rpc)
    }

    /// Nodes that become named object schemas.
    pub fn is_modeled(self) -> bool {
        matches!(
            self,
            NodeKind::Container
                | NodeKind::List
                | NodeKind::Grouping
                | NodeKind::RpcInput
                | NodeKind::RpcOutput
        )
    }

    /// Nodes that are invisible in the data tree (their children are seen
    /// as children of the enclosing node).
    pub fn is_transparent(self) -> bool {
        matches!(self, NodeKind::Choice | NodeKind::Case)
    }
}

/// Built-in YANG type a leaf resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeDef {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64,
    String,
    Binary,
    Bits,
    Empty,
    Union,
    IdentityRef,
    InstanceIdentifier,
    /// `name` is the typedef that declared the enumeration; absent for an
    /// enumeration declared inline on a leaf.
    Enumeration {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<QName>,
        values: Vec<String>,
    },
    /// `target` may be supplied by a parser that already resolved the path.
    LeafRef {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<NodeId>,
    },
}

fn default_config() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaNode {
    pub kind: NodeKind,
    /// Local name.
    pub name: String,
    /// Name of the module whose namespace the node belongs to.
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// `false` for operational (state) data.
    #[serde(default = "default_config", skip_serializing_if = "is_true")]
    pub config: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    /// Groupings this node uses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<NodeId>,
    /// Augmentations applied to this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub augmentations: Vec<NodeId>,
    /// The node this one was copied from (weak back-link).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<NodeId>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub augmenting: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub added_by_uses: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    /// Key leaf names of a list, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_def: Option<TypeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Target node of an augmentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
}

impl SchemaNode {
    pub fn new(kind: NodeKind, module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            module: module.into(),
            description: None,
            reference: None,
            config: true,
            children: Vec::new(),
            uses: Vec::new(),
            augmentations: Vec::new(),
            original: None,
            augmenting: false,
            added_by_uses: false,
            parent: None,
            keys: Vec::new(),
            type_def: None,
            default: None,
            target: None,
        }
    }

    pub fn qname(&self) -> QName {
        QName::new(self.module.clone(), self.name.clone())
    }

    pub fn has_qname(&self, qname: &QName) -> bool {
        self.name == qname.name && self.module == qname.module
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Module {
    pub name: String,
    pub namespace: String,
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub groupings: Vec<NodeId>,
    #[serde(default)]
    pub augmentations: Vec<NodeId>,
    #[serde(default)]
    pub rpcs: Vec<NodeId>,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            prefix: prefix.into(),
            revision: None,
            children: Vec::new(),
            groupings: Vec::new(),
            augmentations: Vec::new(),
            rpcs: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaContext {
    pub modules: Vec<Module>,
    pub nodes: Vec<SchemaNode>,
}

impl SchemaContext {
    /// Parse and validate a context serialized as JSON.
    pub fn from_json(json: &str) -> Result<Self, GenerateError> {
        let ctx: SchemaContext = serde_json::from_str(json)?;
        ctx.validate()?;
        Ok(ctx)
    }

    /// Look up a node. Ids come from this context, so an out-of-range id is
    /// a caller bug; [`SchemaContext::validate`] guarantees that every id
    /// stored inside the context is in range.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn module_by_namespace(&self, namespace: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.namespace == namespace)
    }

    pub fn module_by_prefix(&self, prefix: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.prefix == prefix)
    }

    pub fn qname(&self, id: NodeId) -> QName {
        self.node(id).qname()
    }

    /// Follow the derivation chain to the node everything was copied from.
    pub fn origin(&self, id: NodeId) -> NodeId {
        let mut current = id;
        // A well-formed chain is acyclic; the bound keeps a malformed one finite.
        for _ in 0..self.nodes.len() {
            match self.node(current).original {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Child matching `qname`, looking through choices and cases.
    pub fn data_child(&self, parent: NodeId, qname: &QName) -> Option<NodeId> {
        self.find_child(parent, &|n: &SchemaNode| n.has_qname(qname))
    }

    /// Child matching a local name, looking through choices and cases.
    pub fn data_child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.find_child(parent, &|n: &SchemaNode| n.name == name)
    }

    fn find_child(&self, parent: NodeId, matches: &dyn Fn(&SchemaNode) -> bool) -> Option<NodeId> {
        for &child in &self.node(parent).children {
            let node = self.node(child);
            if node.kind.is_transparent() {
                if let Some(found) = self.find_child(child, matches) {
                    return Some(found);
                }
            } else if matches(node) {
                return Some(child);
            }
        }
        None
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ctx: self,
            next: self.node(id).parent,
        }
    }

    /// Nearest ancestor that is part of the data tree (skips choice/case).
    pub fn data_parent(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| !self.node(a).kind.is_transparent())
    }

    /// Check that every stored id refers to an existing node of a fitting
    /// kind and that no node is reachable from itself.
    pub fn validate(&self) -> Result<(), GenerateError> {
        self.validate_links()?;
        self.validate_acyclic()?;
        self.validate_chains()
    }

    fn validate_links(&self) -> Result<(), GenerateError> {
        let check = |owner: NodeId, id: NodeId, what: &str| {
            if self.get(id).is_none() {
                return Err(GenerateError::InvalidContext {
                    node: owner,
                    message: format!("{what} {id} does not exist"),
                });
            }
            Ok(())
        };

        for (i, node) in self.nodes.iter().enumerate() {
            let owner = NodeId(i as u32);
            for &child in &node.children {
                check(owner, child, "child")?;
            }
            for &grouping in &node.uses {
                check(owner, grouping, "used grouping")?;
                if self.node(grouping).kind != NodeKind::Grouping {
                    return Err(GenerateError::InvalidContext {
                        node: owner,
                        message: format!("uses {grouping}, which is not a grouping"),
                    });
                }
            }
            for &aug in &node.augmentations {
                check(owner, aug, "augmentation")?;
                if self.node(aug).kind != NodeKind::Augmentation {
                    return Err(GenerateError::InvalidContext {
                        node: owner,
                        message: format!("augmented by {aug}, which is not an augmentation"),
                    });
                }
            }
            for id in [node.original, node.parent, node.target].into_iter().flatten() {
                check(owner, id, "linked node")?;
            }
            if let Some(TypeDef::LeafRef {
                target: Some(target),
                ..
            }) = &node.type_def
            {
                check(owner, *target, "leafref target")?;
            }
        }

        for module in &self.modules {
            let lists = [
                &module.children,
                &module.groupings,
                &module.augmentations,
                &module.rpcs,
            ];
            for &id in lists.into_iter().flatten() {
                if self.get(id).is_none() {
                    return Err(GenerateError::InvalidContext {
                        node: id,
                        message: format!("referenced by module {} but does not exist", module.name),
                    });
                }
            }
        }
        Ok(())
    }

    /// Nodes a traversal descends into from `id`.
    fn edges(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        node.children
            .iter()
            .chain(&node.uses)
            .chain(&node.augmentations)
            .copied()
            .collect()
    }

    /// Depth-first search over children, used groupings and augmentations.
    /// Augmenting children are shared by the augmentation and its target,
    /// so the graph is a DAG rather than a tree.
    fn validate_acyclic(&self) -> Result<(), GenerateError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        for start in self.ids() {
            if marks[start.index()] != Mark::New {
                continue;
            }
            marks[start.index()] = Mark::Open;
            let mut stack = vec![(start, self.edges(start).into_iter())];
            while let Some((id, pending)) = stack.last_mut() {
                let id = *id;
                let Some(next) = pending.next() else {
                    marks[id.index()] = Mark::Done;
                    stack.pop();
                    continue;
                };
                match marks[next.index()] {
                    Mark::New => {
                        marks[next.index()] = Mark::Open;
                        stack.push((next, self.edges(next).into_iter()));
                    }
                    Mark::Open => {
                        return Err(GenerateError::InvalidContext {
                            node: id,
                            message: format!("descending into {next} leads back to itself"),
                        });
                    }
                    Mark::Done => {}
                }
            }
        }
        Ok(())
    }

    /// `parent` and `original` links must end after finitely many steps.
    fn validate_chains(&self) -> Result<(), GenerateError> {
        self.validate_chain("parent", |n| n.parent)?;
        self.validate_chain("original", |n| n.original)
    }

    fn validate_chain(
        &self,
        what: &str,
        link: impl Fn(&SchemaNode) -> Option<NodeId>,
    ) -> Result<(), GenerateError> {
        for start in self.ids() {
            let mut current = link(self.node(start));
            let mut steps = 0;
            while let Some(id) = current {
                steps += 1;
                if id == start || steps > self.nodes.len() {
                    return Err(GenerateError::InvalidContext {
                        node: start,
                        message: format!("{what} chain loops"),
                    });
                }
                current = link(self.node(id));
            }
        }
        Ok(())
    }
}

pub struct Ancestors<'a> {
    ctx: &'a SchemaContext,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ctx.node(current).parent;
        Some(current)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
