//! The sample tree of a CAD.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. The root carries
//! no value; a node at depth `d` carries the value of the variable on level
//! `n - d`, so a root-to-leaf path read backwards is a point. Children are
//! kept strictly increasing by value.
//!
//! Node ids are never reused, so a stale id (for instance in a trace) is
//! detected by [`SampleTree::contains`].

use crate::elimination_set::PolyId;
use oxcad_math::RealAlgebraicNumber;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::fmt;

/// Handle of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    value: Option<RealAlgebraicNumber>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Polynomials of the child level whose roots are among the children.
    lifted: FxHashSet<PolyId>,
    /// Lifted polynomials whose roots were all isolated, so a child that is
    /// not recorded as their root is not one.
    resolved: FxHashSet<PolyId>,
    /// Polynomials of this node's level that vanish at its value.
    vanishing: FxHashSet<PolyId>,
}

impl Node {
    fn new(value: Option<RealAlgebraicNumber>, parent: Option<NodeId>) -> Self {
        Self {
            value,
            parent,
            children: Vec::new(),
            lifted: FxHashSet::default(),
            resolved: FxHashSet::default(),
            vanishing: FxHashSet::default(),
        }
    }
}

/// Last successful path, one node per depth (index 0 is the root).
pub type Trace = Vec<Option<NodeId>>;

/// Arena-backed tree of sample values.
#[derive(Debug, Clone)]
pub struct SampleTree {
    nodes: Vec<Option<Node>>,
    live: usize,
}

impl Default for SampleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(None, None))],
            live: 1,
        }
    }

    /// The root.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check whether only the root is left.
    pub fn is_empty(&self) -> bool {
        self.live == 1
    }

    /// Check whether `id` is a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(Option::is_some)
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("sample tree node {:?} does not exist", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("sample tree node {:?} does not exist", id),
        }
    }

    /// Sample value of a node, `None` for the root.
    pub fn value(&self, id: NodeId) -> Option<&RealAlgebraicNumber> {
        self.node(id).value.as_ref()
    }

    /// Replace the value of a node with an equal one (numeric or root
    /// upgrade).
    pub fn set_value(&mut self, id: NodeId, value: RealAlgebraicNumber) {
        let node = self.node_mut(id);
        debug_assert!(node
            .value
            .as_ref()
            .map_or(false, |v| v.cmp_value(&value) == Ordering::Equal));
        node.value = Some(value);
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children in increasing order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Values of the children in increasing order.
    pub fn child_values(&self, id: NodeId) -> Vec<RealAlgebraicNumber> {
        self.children(id)
            .iter()
            .filter_map(|&c| self.value(c).cloned())
            .collect()
    }

    /// Distance from the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            depth += 1;
            cur = p;
        }
        depth
    }

    /// Polynomials already used to create children of `id`.
    pub fn lifted(&self, id: NodeId) -> &FxHashSet<PolyId> {
        &self.node(id).lifted
    }

    /// Record that the roots of `p` are among the children of `id`.
    pub fn mark_lifted(&mut self, id: NodeId, p: PolyId) -> bool {
        self.node_mut(id).lifted.insert(p)
    }

    /// Forget `removed` in every node's lifting record.
    pub fn forget_lifted(&mut self, removed: &FxHashSet<PolyId>) {
        for node in self.nodes.iter_mut().flatten() {
            node.lifted.retain(|p| !removed.contains(p));
            node.resolved.retain(|p| !removed.contains(p));
            node.vanishing.retain(|p| !removed.contains(p));
        }
    }

    /// Record that every root of `p` over `id` is a child of `id`.
    pub fn mark_resolved(&mut self, id: NodeId, p: PolyId) {
        self.node_mut(id).resolved.insert(p);
    }

    /// Record that `p` vanishes at the value of `id`.
    pub fn mark_vanishing(&mut self, id: NodeId, p: PolyId) {
        self.node_mut(id).vanishing.insert(p);
    }

    /// Whether `p` is known to vanish at the value of `id`: `Some(true)` if
    /// it was recorded as a root, `Some(false)` if the parent isolated all
    /// roots of `p` and this value is not among them, `None` otherwise.
    pub fn vanishes(&self, id: NodeId, p: PolyId) -> Option<bool> {
        if self.node(id).vanishing.contains(&p) {
            return Some(true);
        }
        let parent = self.parent(id)?;
        self.node(parent).resolved.contains(&p).then_some(false)
    }

    /// The child of `parent` with value `value`.
    pub fn find_child(&self, parent: NodeId, value: &RealAlgebraicNumber) -> Option<NodeId> {
        let siblings = self.children(parent);
        let pos = siblings.partition_point(|&c| {
            self.value(c)
                .map_or(true, |v| v.cmp_value(value) == Ordering::Less)
        });
        siblings
            .get(pos)
            .copied()
            .filter(|&c| self.value(c).is_some_and(|v| v.cmp_value(value) == Ordering::Equal))
    }

    /// Insert a child with a value different from all siblings.
    pub fn insert_child(&mut self, parent: NodeId, value: RealAlgebraicNumber) -> NodeId {
        let pos = {
            let siblings = self.children(parent);
            let pos = siblings.partition_point(|&c| {
                self.value(c)
                    .map_or(true, |v| v.cmp_value(&value) == Ordering::Less)
            });
            debug_assert!(siblings
                .get(pos)
                .and_then(|&c| self.value(c))
                .map_or(true, |v| v.cmp_value(&value) == Ordering::Greater));
            pos
        };
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(Some(value), Some(parent))));
        self.live += 1;
        self.node_mut(parent).children.insert(pos, id);
        id
    }

    /// Remove a node and everything below it. The root only loses its
    /// children.
    pub fn remove_subtree(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let children = std::mem::take(&mut self.node_mut(cur).children);
            stack.extend(children);
            if cur != self.root() {
                self.nodes[cur.index()] = None;
                self.live -= 1;
            }
        }
        if id == self.root() {
            self.node_mut(id).lifted.clear();
        }
    }

    /// Remove everything but the root.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Nodes without children, left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(cur) = stack.pop() {
            let children = self.children(cur);
            if children.is_empty() {
                out.push(cur);
            } else {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    /// All nodes, parents before children, left to right.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.live);
        let mut stack = vec![self.root()];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.children(cur).iter().rev().copied());
        }
        out
    }

    /// Nodes at depth `depth`, left to right.
    pub fn nodes_at_depth(&self, depth: usize) -> Vec<NodeId> {
        let mut layer = vec![self.root()];
        for _ in 0..depth {
            layer = layer
                .iter()
                .flat_map(|&n| self.children(n).iter().copied())
                .collect();
        }
        layer
    }

    /// Nodes from depth 1 down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            path.push(cur);
            cur = p;
        }
        path.reverse();
        path
    }

    /// Values along the path to `id`, depth 1 first.
    pub fn values_on_path(&self, id: NodeId) -> Vec<RealAlgebraicNumber> {
        self.path(id)
            .into_iter()
            .filter_map(|n| self.value(n).cloned())
            .collect()
    }

    /// Leftmost path from the root down to a leaf.
    pub fn leftmost_path(&self) -> Vec<NodeId> {
        let mut path = vec![self.root()];
        let mut cur = self.root();
        while let Some(&first) = self.children(cur).first() {
            path.push(first);
            cur = first;
        }
        path
    }

    /// Keep only the first child of every node at depth `depth - 1`.
    pub fn merge_children_at_depth(&mut self, depth: usize) {
        if depth == 0 {
            return;
        }
        for node in self.nodes_at_depth(depth - 1) {
            self.node_mut(node).resolved.clear();
            let extra: Vec<NodeId> = self.children(node).iter().skip(1).copied().collect();
            for child in extra {
                self.remove_subtree(child);
            }
        }
    }

    /// Remove the nodes at `depth`, attaching their children to their
    /// parents. Siblings at that depth are merged first.
    pub fn remove_depth(&mut self, depth: usize) {
        if depth == 0 {
            return;
        }
        self.merge_children_at_depth(depth);
        for node in self.nodes_at_depth(depth) {
            let Some(parent) = self.parent(node) else {
                continue;
            };
            let children = std::mem::take(&mut self.node_mut(node).children);
            for &c in &children {
                self.node_mut(c).parent = Some(parent);
            }
            let lifted = std::mem::take(&mut self.node_mut(node).lifted);
            let resolved = std::mem::take(&mut self.node_mut(node).resolved);
            let p = self.node_mut(parent);
            p.children = children;
            p.lifted = lifted;
            p.resolved = resolved;
            self.nodes[node.index()] = None;
            self.live -= 1;
        }
    }

    /// Check that children are strictly increasing everywhere.
    pub fn is_ordered(&self) -> bool {
        self.nodes.iter().flatten().all(|node| {
            node.children.windows(2).all(|w| match (self.value(w[0]), self.value(w[1])) {
                (Some(a), Some(b)) => a.cmp_value(b) == Ordering::Less,
                _ => false,
            })
        })
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, indent: usize) -> fmt::Result {
        match self.value(id) {
            Some(v) => writeln!(f, "{:indent$}{}", "", v, indent = indent)?,
            None => writeln!(f, "{:indent$}*", "", indent = indent)?,
        }
        for &c in self.children(id) {
            self.fmt_node(f, c, indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for SampleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxcad_math::rational::rat;

    fn num(n: i64) -> RealAlgebraicNumber {
        RealAlgebraicNumber::from_rational(rat(n))
    }

    #[test]
    fn test_children_stay_sorted() {
        let mut tree = SampleTree::new();
        let root = tree.root();
        for n in [3, -1, 7, 0] {
            tree.insert_child(root, num(n));
        }
        let values: Vec<i64> = tree
            .child_values(root)
            .iter()
            .map(|v| v.to_f64() as i64)
            .collect();
        assert_eq!(values, vec![-1, 0, 3, 7]);
        assert!(tree.is_ordered());
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_paths_and_depths() {
        let mut tree = SampleTree::new();
        let a = tree.insert_child(tree.root(), num(1));
        let b = tree.insert_child(a, num(2));
        let c = tree.insert_child(a, num(5));
        assert_eq!(tree.depth(b), 2);
        assert_eq!(tree.path(c), vec![a, c]);
        assert_eq!(tree.values_on_path(c), vec![num(1), num(5)]);
        assert_eq!(tree.leaves(), vec![b, c]);
        assert_eq!(tree.nodes_at_depth(2), vec![b, c]);
        assert_eq!(tree.leftmost_path(), vec![tree.root(), a, b]);
        assert_eq!(tree.preorder(), vec![tree.root(), a, b, c]);
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = SampleTree::new();
        let a = tree.insert_child(tree.root(), num(1));
        let b = tree.insert_child(a, num(2));
        let c = tree.insert_child(tree.root(), num(4));
        tree.remove_subtree(a);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert_eq!(tree.children(tree.root()), &[c]);
        assert_eq!(tree.len(), 2);
        tree.remove_subtree(tree.root());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_merge_and_remove_depth() {
        let mut tree = SampleTree::new();
        let a = tree.insert_child(tree.root(), num(1));
        let b = tree.insert_child(tree.root(), num(2));
        let a1 = tree.insert_child(a, num(10));
        let a2 = tree.insert_child(a, num(20));
        tree.insert_child(b, num(30));

        tree.remove_depth(1);
        assert!(!tree.contains(b));
        assert_eq!(tree.children(tree.root()), &[a1, a2]);
        assert_eq!(tree.parent(a1), Some(tree.root()));
        assert_eq!(tree.depth(a2), 1);
        assert!(tree.is_ordered());
    }

    #[test]
    fn test_lifting_records() {
        let mut tree = SampleTree::new();
        let root = tree.root();
        let p = crate::elimination_set::PolyPool::new().intern(oxcad_math::UnivariatePolynomial::new(
            oxcad_math::Polynomial::from_var(0),
            0,
        ));
        assert!(tree.mark_lifted(root, p));
        assert!(!tree.mark_lifted(root, p));
        let removed: FxHashSet<PolyId> = [p].into_iter().collect();
        tree.forget_lifted(&removed);
        assert!(tree.lifted(root).is_empty());
    }

    #[test]
    fn test_root_records() {
        let mut tree = SampleTree::new();
        let root = tree.root();
        let p = crate::elimination_set::PolyPool::new().intern(oxcad_math::UnivariatePolynomial::new(
            oxcad_math::Polynomial::from_var(0),
            0,
        ));
        let below = tree.insert_child(root, num(-1));
        let zero = tree.insert_child(root, num(0));
        assert_eq!(tree.find_child(root, &num(0)), Some(zero));
        assert_eq!(tree.find_child(root, &num(5)), None);

        assert_eq!(tree.vanishes(zero, p), None);
        tree.mark_vanishing(zero, p);
        tree.mark_resolved(root, p);
        assert_eq!(tree.vanishes(zero, p), Some(true));
        assert_eq!(tree.vanishes(below, p), Some(false));

        // dropping siblings loses the guarantee for the survivors
        tree.merge_children_at_depth(1);
        assert_eq!(tree.vanishes(below, p), None);
        assert!(!tree.contains(zero));

        let removed: FxHashSet<PolyId> = [p].into_iter().collect();
        tree.mark_vanishing(below, p);
        tree.forget_lifted(&removed);
        assert_eq!(tree.vanishes(below, p), None);
    }
}
