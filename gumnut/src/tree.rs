//! Tree representation consumed by the matcher.
//!
//! Trees live in an [`indextree::Arena`]. Every node carries a kind tag, an
//! optional label, a source span and three precomputed metrics: a structural
//! hash, a height and a size. Front-ends that already know the metrics can set
//! them directly on [`NodeData`]; everyone else calls
//! [`Tree::compute_metrics`] once the tree is built.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use indextree::{Arena, NodeId};
use rapidhash::RapidHasher;

/// Structural hash of a subtree (kind, label and the hashes of all children).
pub type NodeHash = u64;

/// The type parameters of a tree: what a node kind and a node label are.
pub trait TreeTypes: 'static {
    /// Closed set of node kinds (statement, expression, declaration, ...).
    type Kind: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;
    /// Node label (identifier, literal value, operator, ...).
    type Label: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;
}

/// Ready-made [`TreeTypes`] for any kind and label types.
pub struct SimpleTypes<K, L = String>(PhantomData<(K, L)>);

impl<K, L> TreeTypes for SimpleTypes<K, L>
where
    K: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static,
    L: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static,
{
    type Kind = K;
    type Label = L;
}

/// A point in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// Byte offset from the start of the file.
    pub offset: usize,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

/// Source range covered by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First position covered.
    pub start: Position,
    /// Position right after the node.
    pub end: Position,
}

impl Span {
    /// Create a span from two positions.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A span that only knows its line range (offsets and columns left at zero).
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start: Position {
                line: start_line,
                ..Position::default()
            },
            end: Position {
                line: end_line,
                ..Position::default()
            },
        }
    }

    /// A span that only knows its byte range.
    pub fn offsets(start: usize, end: usize) -> Self {
        Self {
            start: Position {
                offset: start,
                ..Position::default()
            },
            end: Position {
                offset: end,
                ..Position::default()
            },
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Payload of a tree node.
pub struct NodeData<T: TreeTypes> {
    /// Structural hash of the subtree rooted here.
    pub hash: NodeHash,
    /// Number of nodes on the longest downward path, this node included (a leaf has height 1).
    pub height: usize,
    /// Number of nodes in the subtree, this node included.
    pub size: usize,
    /// Node kind.
    pub kind: T::Kind,
    /// Optional label.
    pub label: Option<T::Label>,
    /// Source range.
    pub span: Span,
}

impl<T: TreeTypes> NodeData<T> {
    /// A node without label. Metrics are filled in by [`Tree::compute_metrics`].
    pub fn new(kind: T::Kind) -> Self {
        Self {
            hash: 0,
            height: 1,
            size: 1,
            kind,
            label: None,
            span: Span::default(),
        }
    }

    /// A labeled node.
    pub fn labeled(kind: T::Kind, label: impl Into<T::Label>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(kind)
        }
    }

    /// Set the span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Set precomputed metrics (for front-ends that already have them).
    pub fn with_metrics(mut self, hash: NodeHash, height: usize, size: usize) -> Self {
        self.hash = hash;
        self.height = height;
        self.size = size;
        self
    }
}

impl<T: TreeTypes> Clone for NodeData<T> {
    fn clone(&self) -> Self {
        Self {
            hash: self.hash,
            height: self.height,
            size: self.size,
            kind: self.kind.clone(),
            label: self.label.clone(),
            span: self.span,
        }
    }
}

impl<T: TreeTypes> fmt::Debug for NodeData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(label) = &self.label {
            write!(f, " {label:?}")?;
        }
        write!(f, " h={} #{:016x}", self.height, self.hash)
    }
}

/// Read access to a tree, as needed by the matcher.
///
/// The two trees of a diff may be different concrete types as long as they
/// share the same [`TreeTypes`].
pub trait DiffTree {
    /// Kind and label types.
    type Types: TreeTypes;

    /// Root node.
    fn root(&self) -> NodeId;

    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Structural hash of the subtree rooted at `id`.
    fn hash(&self, id: NodeId) -> NodeHash;

    /// Height of `id` (leaves have height 1).
    fn height(&self, id: NodeId) -> usize;

    /// Number of nodes in the subtree rooted at `id`.
    fn size(&self, id: NodeId) -> usize;

    /// Kind of `id`.
    fn kind(&self, id: NodeId) -> &<Self::Types as TreeTypes>::Kind;

    /// Label of `id`, if any.
    fn label(&self, id: NodeId) -> Option<&<Self::Types as TreeTypes>::Label>;

    /// Source range of `id`.
    fn span(&self, id: NodeId) -> Span;

    /// Parent of `id`, `None` for the root.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Direct children of `id`, in order.
    fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_;

    /// Number of direct children.
    fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Index of `id` among its siblings.
    fn position(&self, id: NodeId) -> usize;

    /// All nodes in preorder.
    fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.subtree(self.root())
    }

    /// `id` followed by all of its descendants, in preorder.
    fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_;

    /// Strict descendants of `id`, in preorder.
    fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.subtree(id).skip(1)
    }

    /// Strict ancestors of `id`, closest first.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        core::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Whether `id` is a node of this tree.
    fn contains(&self, id: NodeId) -> bool;
}

/// An arena-backed tree.
pub struct Tree<T: TreeTypes> {
    /// Node storage.
    pub arena: Arena<NodeData<T>>,
    /// Root node.
    pub root: NodeId,
}

impl<T: TreeTypes> Tree<T> {
    /// Create a tree holding only a root.
    pub fn new(root_data: NodeData<T>) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(root_data);
        Self { arena, root }
    }

    /// Append a child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData<T>) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    /// Payload of `id`.
    pub fn get(&self, id: NodeId) -> &NodeData<T> {
        self.arena[id].get()
    }

    /// Recompute hash, height and size of every node, bottom-up.
    pub fn compute_metrics(&mut self) {
        let order: Vec<NodeId> = self.root.descendants(&self.arena).collect();

        // Reverse preorder visits every child before its parent.
        for &id in order.iter().rev() {
            let mut height = 0;
            let mut size = 1;
            let mut hasher = RapidHasher::default();
            {
                let data = self.arena[id].get();
                data.kind.hash(&mut hasher);
                data.label.hash(&mut hasher);
            }
            let mut child_count = 0usize;
            for child in id.children(&self.arena) {
                let child_data = self.arena[child].get();
                height = height.max(child_data.height);
                size += child_data.size;
                child_data.hash.hash(&mut hasher);
                child_count += 1;
            }
            child_count.hash(&mut hasher);

            if let Some(node) = self.arena.get_mut(id) {
                let data = node.get_mut();
                data.height = height + 1;
                data.size = size;
                data.hash = hasher.finish();
            }
        }
    }
}

impl<T: TreeTypes> DiffTree for Tree<T> {
    type Types = T;

    fn root(&self) -> NodeId {
        self.root
    }

    fn node_count(&self) -> usize {
        self.arena.count()
    }

    fn hash(&self, id: NodeId) -> NodeHash {
        self.get(id).hash
    }

    fn height(&self, id: NodeId) -> usize {
        self.get(id).height
    }

    fn size(&self, id: NodeId) -> usize {
        self.get(id).size
    }

    fn kind(&self, id: NodeId) -> &T::Kind {
        &self.get(id).kind
    }

    fn label(&self, id: NodeId) -> Option<&T::Label> {
        self.get(id).label.as_ref()
    }

    fn span(&self, id: NodeId) -> Span {
        self.get(id).span
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    fn position(&self, id: NodeId) -> usize {
        // preceding_siblings includes the node itself
        id.preceding_siblings(&self.arena).count() - 1
    }

    fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    fn contains(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|node| !node.is_removed())
            && id.ancestors(&self.arena).last() == Some(self.root)
    }
}

/// Whether the subtrees at `a` and `b` have the same shape and the same
/// kind and label at every node.
pub fn is_isomorphic<TA, TB>(tree_a: &TA, a: NodeId, tree_b: &TB, b: NodeId) -> bool
where
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    let mut stack = vec![(a, b)];
    while let Some((a_id, b_id)) = stack.pop() {
        if tree_a.hash(a_id) != tree_b.hash(b_id)
            || tree_a.kind(a_id) != tree_b.kind(b_id)
            || tree_a.label(a_id) != tree_b.label(b_id)
            || tree_a.child_count(a_id) != tree_b.child_count(b_id)
        {
            return false;
        }
        stack.extend(tree_a.children(a_id).zip(tree_b.children(b_id)));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestTypes = SimpleTypes<&'static str, &'static str>;

    fn sample() -> (Tree<TestTypes>, NodeId, NodeId) {
        let mut tree: Tree<TestTypes> = Tree::new(NodeData::new("block"));
        let stmt = tree.add_child(tree.root, NodeData::new("stmt"));
        let name = tree.add_child(stmt, NodeData::labeled("name", "x"));
        tree.add_child(tree.root, NodeData::labeled("name", "y"));
        tree.compute_metrics();
        (tree, stmt, name)
    }

    #[test]
    fn test_metrics() {
        let (tree, stmt, name) = sample();
        assert_eq!(tree.height(name), 1);
        assert_eq!(tree.height(stmt), 2);
        assert_eq!(tree.height(tree.root), 3);
        assert_eq!(tree.size(tree.root), 4);
        assert_eq!(tree.size(stmt), 2);
    }

    #[test]
    fn test_hash_depends_on_label() {
        let (tree, _, _) = sample();
        let children: Vec<_> = tree.children(tree.root).collect();
        let names: Vec<_> = tree.descendants(tree.root).filter(|&id| tree.child_count(id) == 0).collect();
        assert_eq!(children.len(), 2);
        assert_ne!(tree.hash(names[0]), tree.hash(names[1]));
    }

    #[test]
    fn test_isomorphic_copies() {
        let (a, _, _) = sample();
        let (b, _, _) = sample();
        assert!(is_isomorphic(&a, a.root, &b, b.root));

        let mut c: Tree<TestTypes> = Tree::new(NodeData::new("block"));
        let stmt = c.add_child(c.root, NodeData::new("stmt"));
        c.add_child(stmt, NodeData::labeled("name", "z"));
        c.add_child(c.root, NodeData::labeled("name", "y"));
        c.compute_metrics();
        assert!(!is_isomorphic(&a, a.root, &c, c.root));
    }

    #[test]
    fn test_isomorphic_on_deep_chains() {
        fn chain(depth: usize, leaf: &'static str) -> Tree<TestTypes> {
            let mut tree: Tree<TestTypes> = Tree::new(NodeData::new("infix"));
            let mut parent = tree.root;
            for _ in 0..depth {
                parent = tree.add_child(parent, NodeData::new("infix"));
            }
            tree.add_child(parent, NodeData::labeled("name", leaf));
            tree.compute_metrics();
            tree
        }

        let a = chain(100_000, "x");
        let b = chain(100_000, "x");
        assert!(is_isomorphic(&a, a.root, &b, b.root));
        let c = chain(100_000, "y");
        assert!(!is_isomorphic(&a, a.root, &c, c.root));
    }

    #[test]
    fn test_position_and_ancestors() {
        let (tree, stmt, name) = sample();
        assert_eq!(tree.position(stmt), 0);
        let last = tree.children(tree.root).last().unwrap();
        assert_eq!(tree.position(last), 1);
        let ancestors: Vec<_> = tree.ancestors(name).collect();
        assert_eq!(ancestors, vec![stmt, tree.root]);
        assert!(tree.contains(name));
        assert_eq!(tree.iter().count(), 4);
    }
}
