//! Identity resolution across structurally duplicated nodes.
//!
//! A grouping's container that is instantiated in three places yields three
//! copies in the context, but only one schema should be emitted for them.
//! This module decides which node a given occurrence stands for.
//!
//! The decision depends on where the occurrence is seen from: a copy nested
//! inside an augmented ancestor may have a different effective shape than
//! its source. The chain of nodes currently being modeled is tracked by an
//! [`EffectiveStack`] that the caller threads through the traversal.

use crate::context::{NodeId, NodeKind, QName, SchemaContext};

// ---------------------------------------------------------------------------
// Tree augmentation index
// ---------------------------------------------------------------------------

/// Precomputed "tree-augmented" flags: a node is tree-augmented when it or
/// any node below it carries an augmentation.
#[derive(Debug, Clone)]
pub struct TreeIndex {
    tree_augmented: Vec<bool>,
}

impl TreeIndex {
    pub fn new(ctx: &SchemaContext) -> Self {
        let mut memo: Vec<Option<bool>> = vec![None; ctx.nodes.len()];
        for id in ctx.ids() {
            mark(ctx, id, &mut memo);
        }
        Self {
            tree_augmented: memo.into_iter().map(|v| v.unwrap_or(false)).collect(),
        }
    }

    pub fn is_tree_augmented(&self, id: NodeId) -> bool {
        self.tree_augmented.get(id.index()).copied().unwrap_or(false)
    }
}

fn mark(ctx: &SchemaContext, id: NodeId, memo: &mut Vec<Option<bool>>) -> bool {
    if let Some(known) = memo[id.index()] {
        return known;
    }
    // Provisional value; a malformed cyclic context terminates here.
    memo[id.index()] = Some(false);

    let node = ctx.node(id);
    let mut augmented = !node.augmentations.is_empty();
    for &child in &node.children {
        augmented |= mark(ctx, child, memo);
    }
    memo[id.index()] = Some(augmented);
    augmented
}

// ---------------------------------------------------------------------------
// Effective node stack
// ---------------------------------------------------------------------------

/// Nodes currently being modeled, outermost first.
#[derive(Debug, Clone, Default)]
pub struct EffectiveStack {
    frames: Vec<NodeId>,
}

/// Where a node sits relative to the open frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
    /// No frame is open; the node is seen at its own position.
    Root,
    /// The version of the node visible through the open frames.
    Found(NodeId),
    /// Frames are open but none of them shows the node.
    Missing,
}

impl EffectiveStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: NodeId) {
        self.frames.push(id);
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<NodeId> {
        self.frames.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Innermost open frame with the given qualified name.
    pub fn find(&self, ctx: &SchemaContext, qname: &QName) -> Option<NodeId> {
        self.frames
            .iter()
            .rev()
            .copied()
            .find(|&f| ctx.node(f).has_qname(qname))
    }

    /// Container or list child matching `qname` under the innermost frame
    /// that has one. A frame is first searched by qualified name, then by
    /// local name, since grouping content instantiated in another module
    /// carries that module's namespace.
    pub fn child(&self, ctx: &SchemaContext, qname: &QName) -> Option<NodeId> {
        let is_model = |id: &NodeId| matches!(ctx.node(*id).kind, NodeKind::Container | NodeKind::List);
        self.frames.iter().rev().find_map(|&frame| {
            ctx.data_child(frame, qname)
                .filter(is_model)
                .or_else(|| ctx.data_child_by_name(frame, &qname.name).filter(is_model))
        })
    }

    pub fn counterpart(&self, ctx: &SchemaContext, id: NodeId) -> Counterpart {
        let Some(top) = self.top() else {
            return Counterpart::Root;
        };
        if let Some(found) = self.child(ctx, &ctx.qname(id)) {
            return Counterpart::Found(found);
        }
        let (node, top_node) = (ctx.node(id), ctx.node(top));
        if node.name == top_node.name || ctx.origin(top) == ctx.origin(id) {
            return Counterpart::Found(top);
        }
        Counterpart::Missing
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Grouping and identity queries over one context.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    ctx: &'a SchemaContext,
    tree: &'a TreeIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(ctx: &'a SchemaContext, tree: &'a TreeIndex) -> Self {
        Self { ctx, tree }
    }

    pub fn ctx(&self) -> &'a SchemaContext {
        self.ctx
    }

    pub fn tree(&self) -> &'a TreeIndex {
        self.tree
    }

    pub fn is_augmented(&self, id: NodeId) -> bool {
        !self.ctx.node(id).augmentations.is_empty()
    }

    pub fn is_tree_augmented(&self, id: NodeId) -> bool {
        self.tree.is_tree_augmented(id)
    }

    /// The node the given one was ultimately copied from, if any.
    pub fn original(&self, id: NodeId) -> Option<NodeId> {
        let origin = self.ctx.origin(id);
        (origin != id).then_some(origin)
    }

    /// Groupings used by a node, minus any that another used grouping
    /// already inherits.
    pub fn uses(&self, id: NodeId) -> Vec<NodeId> {
        let mut used: Vec<NodeId> = Vec::new();
        for &g in &self.ctx.node(id).uses {
            if !used.contains(&g) {
                used.push(g);
            }
        }
        if used.len() < 2 {
            return used;
        }
        used.iter()
            .copied()
            .filter(|&g| !used.iter().any(|&o| o != g && self.inherits(o, g)))
            .collect()
    }

    /// Whether grouping `child` uses `parent`, directly or transitively.
    pub fn inherits(&self, child: NodeId, parent: NodeId) -> bool {
        let mut pending: Vec<NodeId> = self.ctx.node(child).uses.clone();
        let mut seen: Vec<NodeId> = Vec::new();
        while let Some(g) = pending.pop() {
            if g == parent {
                return true;
            }
            if seen.contains(&g) {
                continue;
            }
            seen.push(g);
            pending.extend(self.ctx.node(g).uses.iter().copied());
        }
        false
    }

    /// The single grouping a node uses.
    pub fn grouping(&self, id: NodeId) -> Option<NodeId> {
        match self.uses(id).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Whether `child` is declared by `container` itself rather than brought
    /// in by a grouping or by another module's augmentation.
    pub fn is_local_child(&self, container: NodeId, child: NodeId) -> bool {
        let ctx = self.ctx;
        if ctx.node(child).added_by_uses {
            return false;
        }
        let owner = ctx.node(container);
        owner.kind == NodeKind::Augmentation
            || !owner
                .augmentations
                .iter()
                .any(|&aug| ctx.node(aug).children.contains(&child))
    }

    /// A node whose whole content is one grouping: a single `uses`, no
    /// augmentation and no child of its own.
    ///
    /// For a data node the version visible through the open frames must not
    /// be tree-augmented either. When frames are open but none shows the
    /// node, the answer is `false`.
    pub fn is_direct_grouping(&self, stack: &EffectiveStack, id: NodeId) -> bool {
        let node = self.ctx.node(id);
        if node.kind.is_data_node() {
            let effective = match stack.counterpart(self.ctx, id) {
                Counterpart::Root => id,
                Counterpart::Found(found) => found,
                Counterpart::Missing => {
                    tracing::debug!(
                        node = %node.qname(),
                        "no effective counterpart, not treating as direct grouping"
                    );
                    return false;
                }
            };
            if self.is_tree_augmented(effective) {
                return false;
            }
        }

        if self.is_augmented(id) {
            return false;
        }

        self.uses(id).len() == 1
            && node
                .children
                .iter()
                .all(|&c| self.ctx.node(c).added_by_uses)
    }

    /// The node whose schema stands for `id`.
    ///
    /// Evaluated in order: a tree-augmented node is its own identity; a copy
    /// has the identity of its source; a direct grouping use has the
    /// identity of the grouping.
    pub fn identity_of(&self, stack: &EffectiveStack, id: NodeId) -> NodeId {
        if self.is_tree_augmented(id) {
            return id;
        }
        if let Some(original) = self.ctx.node(id).original {
            return self.identity_of(stack, original);
        }
        if self.is_direct_grouping(stack, id) {
            if let Some(grouping) = self.grouping(id) {
                return self.identity_of(stack, grouping);
            }
        }
        id
    }

    /// Nodes whose already built schema may be reused for `id`: the node,
    /// its ultimate source, and the grouping when that is a direct use.
    pub fn related(&self, stack: &EffectiveStack, id: NodeId) -> Vec<NodeId> {
        let mut result = vec![id];
        let candidate = match self.original(id) {
            Some(original) => {
                result.push(original);
                original
            }
            None => id,
        };
        if self.is_direct_grouping(stack, candidate) {
            if let Some(grouping) = self.grouping(candidate) {
                result.push(grouping);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextBuilder, TypeDef};

    struct Fixture {
        ctx: SchemaContext,
        tree: TreeIndex,
    }

    impl Fixture {
        fn new(b: ContextBuilder) -> Self {
            let ctx = b.build();
            let tree = TreeIndex::new(&ctx);
            Self { ctx, tree }
        }

        fn resolver(&self) -> Resolver<'_> {
            Resolver::new(&self.ctx, &self.tree)
        }
    }

    // ── Tree augmentation ───────────────────────────────────────────────────

    #[test]
    fn test_tree_augmented_propagates_to_ancestors() {
        let mut b = ContextBuilder::new();
        let root = b.container("m", "root");
        let mid = b.container(root, "mid");
        let leaf_parent = b.container(mid, "deep");
        let sibling = b.container(root, "sibling");
        let aug = b.augment("ext", leaf_parent);
        b.leaf(aug, "x", TypeDef::String);
        let f = Fixture::new(b);

        assert!(f.tree.is_tree_augmented(root));
        assert!(f.tree.is_tree_augmented(mid));
        assert!(f.tree.is_tree_augmented(leaf_parent));
        assert!(!f.tree.is_tree_augmented(sibling));
    }

    // ── Direct grouping ─────────────────────────────────────────────────────

    #[test]
    fn test_direct_grouping_identity_is_grouping() {
        let mut b = ContextBuilder::new();
        let g = b.grouping("m", "g");
        b.leaf(g, "x", TypeDef::String);
        let node = b.container("m", "holder");
        b.uses(node, g);
        let f = Fixture::new(b);
        let r = f.resolver();
        let stack = EffectiveStack::new();

        assert!(r.is_direct_grouping(&stack, node));
        assert_eq!(r.identity_of(&stack, node), g);
        assert_eq!(r.related(&stack, node), vec![node, g]);
    }

    #[test]
    fn test_local_child_prevents_direct_grouping() {
        let mut b = ContextBuilder::new();
        let g = b.grouping("m", "g");
        b.leaf(g, "x", TypeDef::String);
        let node = b.container("m", "holder");
        b.uses(node, g);
        b.leaf(node, "own", TypeDef::String);
        let f = Fixture::new(b);
        let r = f.resolver();
        let stack = EffectiveStack::new();

        assert!(!r.is_direct_grouping(&stack, node));
        assert_eq!(r.identity_of(&stack, node), node);
    }

    #[test]
    fn test_copy_identity_is_original() {
        let mut b = ContextBuilder::new();
        let g = b.grouping("m", "g");
        let inner = b.container(g, "inner");
        b.leaf(inner, "x", TypeDef::String);
        let a = b.container("m", "a");
        b.uses(a, g);
        let copy = b.children(a)[0];
        let f = Fixture::new(b);
        let r = f.resolver();

        assert_eq!(r.identity_of(&EffectiveStack::new(), copy), inner);
        assert_eq!(r.original(copy), Some(inner));
    }

    #[test]
    fn test_tree_augmented_copy_keeps_own_identity() {
        let mut b = ContextBuilder::new();
        let g = b.grouping("m", "g");
        let inner = b.container(g, "inner");
        b.leaf(inner, "x", TypeDef::String);
        let a = b.container("m", "a");
        b.uses(a, g);
        let copy = b.children(a)[0];
        let aug = b.augment("ext", copy);
        b.leaf(aug, "y", TypeDef::String);
        let f = Fixture::new(b);

        assert_eq!(f.resolver().identity_of(&EffectiveStack::new(), copy), copy);
    }

    #[test]
    fn test_augmented_counterpart_blocks_direct_grouping() {
        let mut b = ContextBuilder::new();
        let h = b.grouping("m", "h");
        b.leaf(h, "v", TypeDef::String);
        let g = b.grouping("m", "g");
        let inner = b.container(g, "inner");
        b.uses(inner, h);
        let a = b.container("m", "a");
        b.uses(a, g);
        let copy = b.children(a)[0];
        let aug = b.augment("ext", copy);
        b.leaf(aug, "extra", TypeDef::String);
        let f = Fixture::new(b);
        let r = f.resolver();

        // Seen on its own, the grouping's container is a pure `uses h`.
        assert!(r.is_direct_grouping(&EffectiveStack::new(), inner));

        // Seen from inside `a`, its counterpart is augmented.
        let mut stack = EffectiveStack::new();
        stack.push(a);
        assert_eq!(stack.counterpart(&f.ctx, inner), Counterpart::Found(copy));
        assert!(!r.is_direct_grouping(&stack, inner));
    }

    #[test]
    fn test_missing_counterpart_is_fail_safe() {
        let mut b = ContextBuilder::new();
        let g = b.grouping("m", "g");
        b.leaf(g, "x", TypeDef::String);
        let holder = b.container("m", "holder");
        b.uses(holder, g);
        let unrelated = b.container("m", "unrelated");
        let f = Fixture::new(b);
        let r = f.resolver();

        let mut stack = EffectiveStack::new();
        stack.push(unrelated);
        assert_eq!(stack.counterpart(&f.ctx, holder), Counterpart::Missing);
        assert!(!r.is_direct_grouping(&stack, holder));
        assert_eq!(r.identity_of(&stack, holder), holder);
    }

    // ── Uses optimization ───────────────────────────────────────────────────

    #[test]
    fn test_uses_drops_inherited_grouping() {
        let mut b = ContextBuilder::new();
        let a = b.grouping("m", "a");
        b.leaf(a, "x", TypeDef::String);
        let bg = b.grouping("m", "b");
        b.uses(bg, a);
        b.leaf(bg, "y", TypeDef::String);
        let node = b.container("m", "node");
        b.uses(node, a);
        b.uses(node, bg);
        let f = Fixture::new(b);
        let r = f.resolver();

        assert!(r.inherits(bg, a));
        assert!(!r.inherits(a, bg));
        assert_eq!(r.uses(node), vec![bg]);
        assert_eq!(r.grouping(node), Some(bg));
    }

    #[test]
    fn test_stack_find_and_child() {
        let mut b = ContextBuilder::new();
        let root = b.container("m", "root");
        let child = b.container(root, "child");
        b.leaf(root, "name", TypeDef::String);
        let f = Fixture::new(b);

        let mut stack = EffectiveStack::new();
        stack.push(root);
        assert_eq!(stack.find(&f.ctx, &QName::new("m", "root")), Some(root));
        assert_eq!(stack.child(&f.ctx, &QName::new("m", "child")), Some(child));
        assert_eq!(stack.child(&f.ctx, &QName::new("other", "child")), Some(child));
        assert_eq!(stack.child(&f.ctx, &QName::new("m", "name")), None);
        assert_eq!(stack.pop(), Some(root));
        assert!(stack.is_empty());
    }
}
