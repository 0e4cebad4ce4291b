//! Subtree matching driver and the final one-to-one mapping store.
//!
//! Matching runs in phases:
//! 1. Identical roots: if both trees are isomorphic, commit everything
//! 2. Rounds of candidate generation and resolution, driven by a
//!    [`SubtreeMatchingStrategy`]
//!
//! Each round sees the nodes left uncommitted by the previous one as
//! transparent, so subtrees that were hidden behind a rejected candidate get
//! compared in the next round.

use crate::{debug, trace};

use crate::priority::PriorityKind;
use crate::strategy::{GreedySubtreeMatcher, ResolveReport, SubtreeMatchingStrategy};
use crate::tree::{DiffTree, is_isomorphic};
use indextree::NodeId;
use rapidhash::RapidHashSet as HashSet;

/// A bidirectional mapping between nodes in two trees.
/// Uses Vec for O(1) lookups indexed by NodeId.
#[derive(Debug, Clone)]
pub struct Matching {
    /// Map from tree A node to tree B node (indexed by A's NodeId)
    a_to_b: Vec<Option<NodeId>>,
    /// Map from tree B node to tree A node (indexed by B's NodeId)
    b_to_a: Vec<Option<NodeId>>,
    /// All matched pairs, in commit order
    pairs: Vec<(NodeId, NodeId)>,
}

impl Default for Matching {
    fn default() -> Self {
        Self::new()
    }
}

impl Matching {
    /// Create a new empty matching.
    pub fn new() -> Self {
        Self {
            a_to_b: Vec::new(),
            b_to_a: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Create a new matching with preallocated capacity.
    pub fn with_capacity(max_a: usize, max_b: usize) -> Self {
        Self {
            a_to_b: vec![None; max_a + 1],
            b_to_a: vec![None; max_b + 1],
            pairs: Vec::new(),
        }
    }

    /// Add a match between two nodes.
    ///
    /// Returns `false` and leaves the matching untouched if either node is
    /// already matched.
    #[inline]
    pub fn add(&mut self, a: NodeId, b: NodeId) -> bool {
        if self.contains_a(a) || self.contains_b(b) {
            return false;
        }

        let a_idx = usize::from(a);
        let b_idx = usize::from(b);

        // Grow vectors if needed
        if a_idx >= self.a_to_b.len() {
            self.a_to_b.resize(a_idx + 1, None);
        }
        if b_idx >= self.b_to_a.len() {
            self.b_to_a.resize(b_idx + 1, None);
        }

        self.a_to_b[a_idx] = Some(b);
        self.b_to_a[b_idx] = Some(a);
        self.pairs.push((a, b));
        true
    }

    /// Match `a` with `b` and every pair of corresponding descendants.
    ///
    /// Descendants correspond by position, so the subtrees are expected to be
    /// isomorphic. Pairs where either side is already matched are skipped
    /// together with their subtrees.
    pub fn add_recursively<TA, TB>(&mut self, tree_a: &TA, tree_b: &TB, a: NodeId, b: NodeId)
    where
        TA: DiffTree,
        TB: DiffTree<Types = TA::Types>,
    {
        let mut stack = vec![(a, b)];
        while let Some((a_id, b_id)) = stack.pop() {
            if !self.add(a_id, b_id) {
                continue;
            }
            let a_children: Vec<_> = tree_a.children(a_id).collect();
            let b_children: Vec<_> = tree_b.children(b_id).collect();
            stack.extend(a_children.into_iter().zip(b_children).rev());
        }
    }

    /// Partner of `a` in tree B.
    #[inline]
    pub fn get_b(&self, a: NodeId) -> Option<NodeId> {
        partner(&self.a_to_b, a)
    }

    /// Partner of `b` in tree A.
    #[inline]
    pub fn get_a(&self, b: NodeId) -> Option<NodeId> {
        partner(&self.b_to_a, b)
    }

    /// Whether `a` (tree A) has a partner.
    #[inline]
    pub fn contains_a(&self, a: NodeId) -> bool {
        self.get_b(a).is_some()
    }

    /// Whether `b` (tree B) has a partner.
    #[inline]
    pub fn contains_b(&self, b: NodeId) -> bool {
        self.get_a(b).is_some()
    }

    /// Committed pairs, oldest first.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of committed pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing was committed.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn partner(side: &[Option<NodeId>], id: NodeId) -> Option<NodeId> {
    side.get(usize::from(id)).copied().flatten()
}

/// Configuration for the matching algorithm.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Metric nodes are bucketed by.
    pub priority: PriorityKind,

    /// Nodes with a priority below this are never queued. Candidates at or
    /// below it are subject to tiny-tree suppression.
    pub min_priority: usize,

    /// Run further rounds below candidates that were left uncommitted.
    /// With this off, matching is a single generation/resolution round.
    pub descend_into_rejected: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            priority: PriorityKind::Height,
            min_priority: 1,
            descend_into_rejected: true,
        }
    }
}

/// Candidate nodes that went through resolution without being committed.
///
/// Later rounds look through them instead of proposing them again.
#[derive(Debug, Default, Clone)]
pub struct Exhausted {
    /// Nodes of tree A.
    pub a: HashSet<NodeId>,
    /// Nodes of tree B.
    pub b: HashSet<NodeId>,
}

/// Statistics for one generation/resolution round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Equal-priority batches compared.
    pub batches: usize,
    /// Node pairs whose hashes were compared.
    pub comparisons: usize,
    /// What resolution did with the candidates.
    pub resolution: ResolveReport,
}

/// What a full matching run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Both roots were isomorphic and everything was committed up front.
    pub identical_roots: bool,
    /// One entry per round, in order.
    pub rounds: Vec<RoundReport>,
}

impl MatchReport {
    /// Ambiguous pairs seen across all rounds.
    pub fn ambiguous_pairs(&self) -> usize {
        self.rounds.iter().map(|r| r.resolution.ambiguous_pairs).sum()
    }

    /// Candidate pairs committed across all rounds (roots of committed subtrees).
    pub fn committed(&self) -> usize {
        self.rounds
            .iter()
            .map(|r| r.resolution.unique_committed + r.resolution.ambiguous_committed)
            .sum()
    }
}

/// Compute the matching between two trees with the classic greedy strategy.
///
/// The two trees can have different concrete types as long as they share the same
/// TreeTypes.
pub fn compute_matching<TA, TB>(tree_a: &TA, tree_b: &TB, config: &MatchingConfig) -> Matching
where
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    let (matching, _report) =
        compute_matching_with(&GreedySubtreeMatcher::new(), tree_a, tree_b, config);
    matching
}

/// Compute the matching between two trees with the given strategy.
pub fn compute_matching_with<S, TA, TB>(
    strategy: &S,
    tree_a: &TA,
    tree_b: &TB,
    config: &MatchingConfig,
) -> (Matching, MatchReport)
where
    S: SubtreeMatchingStrategy<TA::Types>,
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    debug!(
        nodes_a = tree_a.node_count(),
        nodes_b = tree_b.node_count(),
        "compute_matching start"
    );
    let mut matching = Matching::with_capacity(tree_a.node_count(), tree_b.node_count());

    // Phase 1: identical roots
    if is_isomorphic(tree_a, tree_a.root(), tree_b, tree_b.root()) {
        matching.add_recursively(tree_a, tree_b, tree_a.root(), tree_b.root());
        debug!(matched = matching.len(), "identical roots");
        let report = MatchReport {
            identical_roots: true,
            rounds: Vec::new(),
        };
        return (matching, report);
    }

    // Phase 2: generation/resolution rounds
    let report = extend_matching(strategy, tree_a, tree_b, &mut matching, config);
    debug!(
        matched = matching.len(),
        rounds = report.rounds.len(),
        "compute_matching done"
    );
    (matching, report)
}

/// Run generation/resolution rounds on top of an existing matching.
///
/// Nodes already in `matching` are never proposed again, so this can follow
/// other matchers.
pub fn extend_matching<S, TA, TB>(
    strategy: &S,
    tree_a: &TA,
    tree_b: &TB,
    matching: &mut Matching,
    config: &MatchingConfig,
) -> MatchReport
where
    S: SubtreeMatchingStrategy<TA::Types>,
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    let mut report = MatchReport::default();
    let mut exhausted = Exhausted::default();

    loop {
        let generation = strategy.generate(tree_a, tree_b, matching, &exhausted, config);
        if generation.candidates.is_empty() {
            break;
        }

        let resolution = strategy.resolve(tree_a, tree_b, &generation.candidates, matching, config);
        trace!(
            round = report.rounds.len(),
            candidates = generation.candidates.len(),
            matched = matching.len(),
            "round done"
        );

        let mut leftover = 0usize;
        for a in generation.candidates.all_srcs() {
            if !matching.contains_a(a) && exhausted.a.insert(a) {
                leftover += 1;
            }
        }
        for b in generation.candidates.all_dsts() {
            if !matching.contains_b(b) && exhausted.b.insert(b) {
                leftover += 1;
            }
        }

        report.rounds.push(RoundReport {
            batches: generation.batches,
            comparisons: generation.comparisons,
            resolution,
        });

        if !config.descend_into_rejected || leftover == 0 {
            break;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeData, SimpleTypes, Tree};

    type TestTypes = SimpleTypes<&'static str, &'static str>;

    fn leaf(label: &'static str) -> NodeData<TestTypes> {
        NodeData::labeled("leaf", label)
    }

    #[test]
    fn test_identical_trees() {
        let mut tree_a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        tree_a.add_child(tree_a.root, leaf("1"));
        tree_a.add_child(tree_a.root, leaf("2"));
        tree_a.compute_metrics();

        let mut tree_b: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        tree_b.add_child(tree_b.root, leaf("1"));
        tree_b.add_child(tree_b.root, leaf("2"));
        tree_b.compute_metrics();

        let matching = compute_matching(&tree_a, &tree_b, &MatchingConfig::default());

        // All nodes should be matched
        assert_eq!(matching.len(), 3);
        assert_eq!(matching.get_b(tree_a.root), Some(tree_b.root));
    }

    #[test]
    fn test_partial_match() {
        // Trees with same structure but one subtree differs
        let mut tree_a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let child1_a = tree_a.add_child(tree_a.root, NodeData::new("stmt"));
        tree_a.add_child(child1_a, leaf("1"));
        let child2_a = tree_a.add_child(tree_a.root, NodeData::new("stmt"));
        tree_a.add_child(child2_a, leaf("2"));
        tree_a.compute_metrics();

        let mut tree_b: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let child1_b = tree_b.add_child(tree_b.root, NodeData::new("stmt"));
        tree_b.add_child(child1_b, leaf("1"));
        let child2_b = tree_b.add_child(tree_b.root, NodeData::new("stmt"));
        tree_b.add_child(child2_b, leaf("3"));
        tree_b.compute_metrics();

        let matching = compute_matching(&tree_a, &tree_b, &MatchingConfig::default());

        // The identical subtree should be matched
        assert!(
            matching.contains_a(child1_a),
            "Identical subtrees should match"
        );
        assert_eq!(matching.get_b(child1_a), Some(child1_b));
        assert!(!matching.contains_a(child2_a));
        assert!(!matching.contains_a(tree_a.root));
    }

    #[test]
    fn test_add_recursively_maps_whole_subtree() {
        let mut tree_a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let s = tree_a.add_child(tree_a.root, NodeData::new("stmt"));
        tree_a.add_child(s, leaf("x"));
        tree_a.add_child(s, leaf("y"));
        tree_a.compute_metrics();

        let mut tree_b: Tree<TestTypes> = Tree::new(NodeData::new("wrapper"));
        let t = tree_b.add_child(tree_b.root, NodeData::new("stmt"));
        let x = tree_b.add_child(t, leaf("x"));
        let y = tree_b.add_child(t, leaf("y"));
        tree_b.compute_metrics();

        let mut matching = Matching::new();
        matching.add_recursively(&tree_a, &tree_b, s, t);
        assert_eq!(matching.len(), 3);
        let children: Vec<_> = tree_a.children(s).collect();
        assert_eq!(matching.get_b(children[0]), Some(x));
        assert_eq!(matching.get_b(children[1]), Some(y));
        assert_eq!(matching.get_a(y), Some(children[1]));
    }

    #[test]
    fn test_add_refuses_second_partner() {
        let mut tree: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let x = tree.add_child(tree.root, leaf("x"));
        let mut matching = Matching::new();
        assert!(matching.add(tree.root, tree.root));
        assert!(!matching.add(tree.root, x));
        assert!(!matching.add(x, tree.root));
        assert_eq!(matching.len(), 1);
    }

    fn chain(depth: usize, leaf_label: &'static str) -> Tree<TestTypes> {
        let mut tree: Tree<TestTypes> = Tree::new(NodeData::new("infix"));
        let mut parent = tree.root;
        for _ in 0..depth {
            parent = tree.add_child(parent, NodeData::new("infix"));
        }
        tree.add_child(parent, leaf(leaf_label));
        tree.compute_metrics();
        tree
    }

    #[test]
    fn test_single_node_trees() {
        let mut tree_a: Tree<TestTypes> = Tree::new(leaf("x"));
        tree_a.compute_metrics();
        let mut tree_b: Tree<TestTypes> = Tree::new(leaf("x"));
        tree_b.compute_metrics();
        let matching = compute_matching(&tree_a, &tree_b, &MatchingConfig::default());
        assert_eq!(matching.len(), 1);
        assert_eq!(matching.get_b(tree_a.root), Some(tree_b.root));

        let mut tree_c: Tree<TestTypes> = Tree::new(leaf("y"));
        tree_c.compute_metrics();
        let matching = compute_matching(&tree_a, &tree_c, &MatchingConfig::default());
        assert!(matching.is_empty());
    }

    #[test]
    fn test_deep_identical_chains() {
        let tree_a = chain(100_000, "x");
        let tree_b = chain(100_000, "x");
        let (matching, report) = compute_matching_with(
            &GreedySubtreeMatcher::new(),
            &tree_a,
            &tree_b,
            &MatchingConfig::default(),
        );
        assert!(report.identical_roots);
        assert_eq!(matching.len(), 100_002);
        assert_eq!(matching.get_b(tree_a.root), Some(tree_b.root));
    }

    #[test]
    fn test_deep_chains_with_different_leaves() {
        let tree_a = chain(100_000, "x");
        let tree_b = chain(100_000, "y");
        let matching = compute_matching(&tree_a, &tree_b, &MatchingConfig::default());
        assert!(matching.is_empty());
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let mut tree_a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        tree_a.add_child(tree_a.root, leaf("a"));
        tree_a.compute_metrics();
        let mut tree_b: Tree<TestTypes> = Tree::new(NodeData::new("other"));
        tree_b.add_child(tree_b.root, leaf("b"));
        tree_b.compute_metrics();

        let (matching, report) = compute_matching_with(
            &GreedySubtreeMatcher::new(),
            &tree_a,
            &tree_b,
            &MatchingConfig::default(),
        );
        assert!(matching.is_empty());
        assert!(!report.identical_roots);
        assert_eq!(report.committed(), 0);
    }
}
