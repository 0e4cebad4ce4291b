//! Priority-bucketed traversal of a tree.
//!
//! Nodes are grouped by a priority (height by default) and handed out one
//! whole bucket at a time, highest priority first. Two queues are kept in
//! lock-step with [`synchronize`] so that every comparison step sees nodes of
//! equal priority on both sides.

use std::collections::BTreeMap;

use indextree::NodeId;

use crate::trace;
use crate::tree::DiffTree;

/// Which metric a node is bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityKind {
    /// Height of the subtree (leaves are 1).
    #[default]
    Height,
    /// Number of nodes in the subtree.
    Size,
}

impl PriorityKind {
    /// Priority of `id` in `tree`.
    pub fn of<T: DiffTree>(self, tree: &T, id: NodeId) -> usize {
        match self {
            PriorityKind::Height => tree.height(id),
            PriorityKind::Size => tree.size(id),
        }
    }
}

/// A queue of tree nodes bucketed by priority.
pub struct PriorityTreeQueue<'t, T: DiffTree> {
    tree: &'t T,
    buckets: BTreeMap<usize, Vec<NodeId>>,
    min_priority: usize,
    priority: PriorityKind,
}

impl<'t, T: DiffTree> PriorityTreeQueue<'t, T> {
    /// Create a queue seeded with `root`.
    pub fn new(tree: &'t T, root: NodeId, min_priority: usize, priority: PriorityKind) -> Self {
        let mut queue = Self {
            tree,
            buckets: BTreeMap::new(),
            min_priority,
            priority,
        };
        queue.add(root);
        queue
    }

    fn add(&mut self, id: NodeId) {
        let priority = self.priority.of(self.tree, id);
        if priority < self.min_priority {
            return;
        }
        self.buckets.entry(priority).or_default().push(id);
    }

    /// Priority of the top bucket, `None` when empty.
    pub fn current_priority(&self) -> Option<usize> {
        self.buckets.keys().next_back().copied()
    }

    /// Whether no node is queued.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Remove and return the whole top bucket.
    pub fn pop(&mut self) -> Vec<NodeId> {
        self.buckets
            .pop_last()
            .map(|(_, nodes)| nodes)
            .unwrap_or_default()
    }

    /// Queue the direct children of `id`, each under its own priority.
    pub fn open(&mut self, id: NodeId) {
        let tree = self.tree;
        for child in tree.children(id) {
            self.add(child);
        }
    }

    /// Pop the top bucket and open every node in it.
    pub fn pop_open(&mut self) -> Vec<NodeId> {
        let popped = self.pop();
        for &id in &popped {
            self.open(id);
        }
        popped
    }

    /// Drop every queued node.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Number of queued nodes across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Bring both queues to the same top priority.
///
/// The side with the higher top bucket is popped and opened until both tops
/// agree. Returns `false` (and clears both queues) when either side runs dry.
pub fn synchronize<TA, TB>(a: &mut PriorityTreeQueue<'_, TA>, b: &mut PriorityTreeQueue<'_, TB>) -> bool
where
    TA: DiffTree,
    TB: DiffTree,
{
    while let (Some(pa), Some(pb)) = (a.current_priority(), b.current_priority()) {
        if pa == pb {
            return true;
        }
        if pa > pb {
            trace!(pa, pb, "synchronize: opening side a");
            a.pop_open();
        } else {
            trace!(pa, pb, "synchronize: opening side b");
            b.pop_open();
        }
    }
    a.clear();
    b.clear();
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeData, SimpleTypes, Tree};

    type TestTypes = SimpleTypes<&'static str, &'static str>;

    // root(4) -> [a(3) -> [b(2) -> [leaf]], leaf]
    fn deep() -> Tree<TestTypes> {
        let mut tree: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let a = tree.add_child(tree.root, NodeData::new("a"));
        let b = tree.add_child(a, NodeData::new("b"));
        tree.add_child(b, NodeData::labeled("leaf", "x"));
        tree.add_child(tree.root, NodeData::labeled("leaf", "y"));
        tree.compute_metrics();
        tree
    }

    // root(2) -> [leaf, leaf]
    fn shallow() -> Tree<TestTypes> {
        let mut tree: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        tree.add_child(tree.root, NodeData::labeled("leaf", "x"));
        tree.add_child(tree.root, NodeData::labeled("leaf", "y"));
        tree.compute_metrics();
        tree
    }

    #[test]
    fn test_pop_returns_whole_bucket() {
        let tree = shallow();
        let mut queue = PriorityTreeQueue::new(&tree, tree.root, 1, PriorityKind::Height);
        assert_eq!(queue.current_priority(), Some(2));
        assert_eq!(queue.pop(), vec![tree.root]);
        assert!(queue.is_empty());

        queue.open(tree.root);
        assert_eq!(queue.current_priority(), Some(1));
        assert_eq!(queue.pop().len(), 2);
    }

    #[test]
    fn test_min_priority_filters_leaves() {
        let tree = shallow();
        let mut queue = PriorityTreeQueue::new(&tree, tree.root, 2, PriorityKind::Height);
        queue.pop_open();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_synchronize_levels_queues() {
        let a = deep();
        let b = shallow();
        let mut qa = PriorityTreeQueue::new(&a, a.root, 1, PriorityKind::Height);
        let mut qb = PriorityTreeQueue::new(&b, b.root, 1, PriorityKind::Height);

        assert!(synchronize(&mut qa, &mut qb));
        assert_eq!(qa.current_priority(), Some(2));
        assert_eq!(qb.current_priority(), Some(2));
    }

    #[test]
    fn test_synchronize_clears_on_exhaustion() {
        let a = deep();
        let b = shallow();
        let mut qa = PriorityTreeQueue::new(&a, a.root, 1, PriorityKind::Height);
        let mut qb = PriorityTreeQueue::new(&b, b.root, 1, PriorityKind::Height);
        qb.pop();

        assert!(!synchronize(&mut qa, &mut qb));
        assert!(qa.is_empty());
        assert!(qb.is_empty());
    }

    #[test]
    fn test_size_priority() {
        let tree = deep();
        let queue = PriorityTreeQueue::new(&tree, tree.root, 1, PriorityKind::Size);
        assert_eq!(queue.current_priority(), Some(5));
        assert_eq!(queue.len(), 1);
    }
}
