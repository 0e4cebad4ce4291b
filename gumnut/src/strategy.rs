//! Greedy subtree matching strategies.
//!
//! A strategy has two phases. Generation walks both trees through
//! [`PriorityTreeQueue`]s in lock-step and records every isomorphic pair of
//! equal priority as a candidate; it is shared by all strategies. Resolution
//! turns the many-to-many candidates into committed one-to-one matches and is
//! what strategies differ in.

use crate::{debug, trace};

use indextree::NodeId;
use rapidhash::RapidHashSet as HashSet;

use crate::compare::{CandidateComparator, FullMappingComparator};
use crate::matching::{Exhausted, Matching, MatchingConfig};
use crate::multi::CandidateSet;
use crate::policy::{AcceptAll, AcceptancePolicy};
use crate::priority::{PriorityTreeQueue, synchronize};
use crate::tree::{DiffTree, TreeTypes, is_isomorphic};

/// Output of the generation phase.
#[derive(Debug, Default)]
pub struct Generation {
    /// Isomorphic pairs of equal priority.
    pub candidates: CandidateSet,
    /// Equal-priority batches compared.
    pub batches: usize,
    /// Node pairs whose hashes were compared.
    pub comparisons: usize,
}

/// What the resolution phase did with a candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Candidate pairs received.
    pub candidates: usize,
    /// Sources dropped as tiny trees.
    pub tiny_suppressed: usize,
    /// Mutually unique pairs committed.
    pub unique_committed: usize,
    /// Mutually unique pairs refused by the policy.
    pub unique_rejected: usize,
    /// Pairs that went through disambiguation.
    pub ambiguous_pairs: usize,
    /// Ambiguous pairs committed.
    pub ambiguous_committed: usize,
}

/// A subtree matching strategy: greedy candidate generation followed by a
/// pluggable resolution step.
pub trait SubtreeMatchingStrategy<T: TreeTypes> {
    /// Collect isomorphic candidate pairs.
    fn generate<TA, TB>(
        &self,
        tree_a: &TA,
        tree_b: &TB,
        matching: &Matching,
        exhausted: &Exhausted,
        config: &MatchingConfig,
    ) -> Generation
    where
        TA: DiffTree<Types = T>,
        TB: DiffTree<Types = T>,
    {
        generate_candidates(tree_a, tree_b, matching, exhausted, config)
    }

    /// Commit candidates into `matching`.
    fn resolve<TA, TB>(
        &self,
        tree_a: &TA,
        tree_b: &TB,
        candidates: &CandidateSet,
        matching: &mut Matching,
        config: &MatchingConfig,
    ) -> ResolveReport
    where
        TA: DiffTree<Types = T>,
        TB: DiffTree<Types = T>;
}

/// Walk both trees highest priority first and record isomorphic pairs.
///
/// For every synchronized batch, each (src, dst) pair with equal hashes that
/// is fully isomorphic and not yet matched becomes a candidate. Batch nodes
/// that got no candidate are opened so their children are compared at their
/// own priority. Matched nodes are neither proposed nor opened; exhausted
/// nodes are opened but never proposed.
pub fn generate_candidates<TA, TB>(
    tree_a: &TA,
    tree_b: &TB,
    matching: &Matching,
    exhausted: &Exhausted,
    config: &MatchingConfig,
) -> Generation
where
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    let mut queue_a =
        PriorityTreeQueue::new(tree_a, tree_a.root(), config.min_priority, config.priority);
    let mut queue_b =
        PriorityTreeQueue::new(tree_b, tree_b.root(), config.min_priority, config.priority);
    let mut generation = Generation::default();

    while !(queue_a.is_empty() || queue_b.is_empty()) {
        if !synchronize(&mut queue_a, &mut queue_b) {
            break;
        }

        let batch_a = queue_a.pop();
        let batch_b = queue_b.pop();
        generation.batches += 1;
        trace!(
            size_a = batch_a.len(),
            size_b = batch_b.len(),
            "generate: batch"
        );

        for &a in &batch_a {
            if matching.contains_a(a) || exhausted.a.contains(&a) {
                continue;
            }
            for &b in &batch_b {
                if matching.contains_b(b) || exhausted.b.contains(&b) {
                    continue;
                }
                generation.comparisons += 1;
                if tree_a.hash(a) == tree_b.hash(b) && is_isomorphic(tree_a, a, tree_b, b) {
                    generation.candidates.add(a, b);
                }
            }
        }

        for a in batch_a {
            if !matching.contains_a(a) && !generation.candidates.has_src(a) {
                queue_a.open(a);
            }
        }
        for b in batch_b {
            if !matching.contains_b(b) && !generation.candidates.has_dst(b) {
                queue_b.open(b);
            }
        }
    }

    debug!(
        batches = generation.batches,
        candidates = generation.candidates.len(),
        "generate done"
    );
    generation
}

/// Resolve candidates under an acceptance policy and a ranking.
///
/// 1. Tiny sources are skipped outright.
/// 2. Mutually unique pairs are committed if the policy accepts them and
///    dropped otherwise.
/// 3. Every other source contributes the cross product of its destinations
///    and of the sources sharing its first destination to the ambiguous
///    list; those sources are not looked at again.
/// 4. The ambiguous list is filtered by the policy, ranked, and committed
///    greedily: a pair is skipped once either side lies inside a subtree
///    committed earlier in this pass.
pub fn resolve_candidates<TA, TB, P, C>(
    policy: &P,
    comparator: &C,
    tree_a: &TA,
    tree_b: &TB,
    candidates: &CandidateSet,
    matching: &mut Matching,
    config: &MatchingConfig,
) -> ResolveReport
where
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
    P: AcceptancePolicy<<TA::Types as TreeTypes>::Kind>,
    C: CandidateComparator,
{
    let mut report = ResolveReport {
        candidates: candidates.len(),
        ..ResolveReport::default()
    };
    let mut ambiguous: Vec<(NodeId, NodeId)> = Vec::new();
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::default();
    let mut ignored: HashSet<NodeId> = HashSet::default();

    for src in candidates.all_srcs() {
        let kind = tree_a.kind(src);
        let height = tree_a.height(src);

        if policy.is_tiny(kind, height, config.min_priority) {
            trace!(a = usize::from(src), %kind, height, "resolve: tiny tree suppressed");
            report.tiny_suppressed += 1;
            continue;
        }

        let dsts = candidates.dsts(src);
        if candidates.is_src_unique(src) && candidates.is_dst_unique(dsts[0]) {
            let dst = dsts[0];
            if policy.is_acceptable(kind, height)
                && !matching.contains_a(src)
                && !matching.contains_b(dst)
            {
                trace!(a = usize::from(src), b = usize::from(dst), %kind, "resolve: unique match");
                matching.add_recursively(tree_a, tree_b, src, dst);
                report.unique_committed += 1;
            } else {
                trace!(a = usize::from(src), b = usize::from(dst), %kind, "resolve: unique match rejected");
                report.unique_rejected += 1;
            }
            continue;
        }

        if ignored.contains(&src) {
            continue;
        }
        let group_srcs = candidates.srcs(dsts[0]);
        for &asrc in group_srcs {
            for &adst in dsts {
                if seen.insert((asrc, adst)) {
                    ambiguous.push((asrc, adst));
                }
            }
        }
        ignored.extend(group_srcs.iter().copied());
    }

    report.ambiguous_pairs = ambiguous.len();
    ambiguous.retain(|&(a, _)| policy.is_acceptable(tree_a.kind(a), tree_a.height(a)));
    comparator.rank(tree_a, tree_b, matching, &mut ambiguous);

    let mut claimed_a: HashSet<NodeId> = HashSet::default();
    let mut claimed_b: HashSet<NodeId> = HashSet::default();
    for (a, b) in ambiguous {
        if claimed_a.contains(&a)
            || claimed_b.contains(&b)
            || matching.contains_a(a)
            || matching.contains_b(b)
        {
            continue;
        }
        trace!(a = usize::from(a), b = usize::from(b), "resolve: ambiguous match retained");
        matching.add_recursively(tree_a, tree_b, a, b);
        claimed_a.extend(tree_a.subtree(a));
        claimed_b.extend(tree_b.subtree(b));
        report.ambiguous_committed += 1;
    }

    debug!(
        candidates = report.candidates,
        unique = report.unique_committed,
        ambiguous = report.ambiguous_committed,
        "resolve done"
    );
    report
}

/// Classic greedy subtree matcher: commits every unique pair and the best
/// ranked ambiguous ones, whatever their kind.
#[derive(Debug, Clone)]
pub struct GreedySubtreeMatcher<C = FullMappingComparator> {
    comparator: C,
}

impl Default for GreedySubtreeMatcher<FullMappingComparator> {
    fn default() -> Self {
        Self::new()
    }
}

impl GreedySubtreeMatcher<FullMappingComparator> {
    /// Create a matcher with the default ranking.
    pub fn new() -> Self {
        Self {
            comparator: FullMappingComparator,
        }
    }
}

impl<C: CandidateComparator> GreedySubtreeMatcher<C> {
    /// Use a custom ranking for ambiguous candidates.
    pub fn with_comparator(comparator: C) -> Self {
        Self { comparator }
    }
}

impl<T, C> SubtreeMatchingStrategy<T> for GreedySubtreeMatcher<C>
where
    T: TreeTypes,
    C: CandidateComparator,
{
    fn resolve<TA, TB>(
        &self,
        tree_a: &TA,
        tree_b: &TB,
        candidates: &CandidateSet,
        matching: &mut Matching,
        config: &MatchingConfig,
    ) -> ResolveReport
    where
        TA: DiffTree<Types = T>,
        TB: DiffTree<Types = T>,
    {
        resolve_candidates(
            &AcceptAll,
            &self.comparator,
            tree_a,
            tree_b,
            candidates,
            matching,
            config,
        )
    }
}

/// Identical-subtree matcher with a node-kind policy.
///
/// Only candidates the policy deems meaningful on their own are committed;
/// tiny, generic subtrees are left to whatever runs next.
#[derive(Debug, Clone)]
pub struct IdenticalSubtreeMatcher<P, C = FullMappingComparator> {
    policy: P,
    comparator: C,
}

impl<P> IdenticalSubtreeMatcher<P, FullMappingComparator> {
    /// Create a matcher with the default ranking.
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            comparator: FullMappingComparator,
        }
    }
}

impl<P, C> IdenticalSubtreeMatcher<P, C> {
    /// Create a matcher with a custom ranking.
    pub fn with_comparator(policy: P, comparator: C) -> Self {
        Self { policy, comparator }
    }

    /// The policy in use.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<T, P, C> SubtreeMatchingStrategy<T> for IdenticalSubtreeMatcher<P, C>
where
    T: TreeTypes,
    P: AcceptancePolicy<T::Kind>,
    C: CandidateComparator,
{
    fn resolve<TA, TB>(
        &self,
        tree_a: &TA,
        tree_b: &TB,
        candidates: &CandidateSet,
        matching: &mut Matching,
        config: &MatchingConfig,
    ) -> ResolveReport
    where
        TA: DiffTree<Types = T>,
        TB: DiffTree<Types = T>,
    {
        resolve_candidates(
            &self.policy,
            &self.comparator,
            tree_a,
            tree_b,
            candidates,
            matching,
            config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::compute_matching_with;
    use crate::tree::{NodeData, SimpleTypes, Tree};
    use facet_testhelpers::test;

    type TestTypes = SimpleTypes<&'static str, &'static str>;

    /// Receivers are always tiny, blocks and short returns are never accepted.
    struct StatementLike;

    impl AcceptancePolicy<&'static str> for StatementLike {
        fn is_tiny(&self, kind: &&'static str, _height: usize, _min_priority: usize) -> bool {
            *kind == "receiver"
        }

        fn is_acceptable(&self, kind: &&'static str, height: usize) -> bool {
            match *kind {
                "block" => false,
                "return" => height > 2,
                _ => true,
            }
        }
    }

    fn matcher() -> IdenticalSubtreeMatcher<StatementLike> {
        IdenticalSubtreeMatcher::new(StatementLike)
    }

    #[test]
    fn test_policy_is_exposed() {
        let matcher = matcher();
        assert!(matcher.policy().is_tiny(&"receiver", 5, 1));
        assert!(!matcher.policy().is_acceptable(&"return", 2));
        assert!(matcher.policy().is_acceptable(&"return", 3));
    }

    fn stmt(tree: &mut Tree<TestTypes>, parent: NodeId, kind: &'static str, name: &'static str) -> NodeId {
        let id = tree.add_child(parent, NodeData::new(kind));
        tree.add_child(id, NodeData::labeled("name", name));
        id
    }

    #[test]
    fn test_receiver_is_never_committed() {
        let mut a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let recv_a = { let parent = a.root; stmt(&mut a, parent, "receiver", "r") };
        let call_a = { let parent = a.root; stmt(&mut a, parent, "call", "f") };
        a.compute_metrics();

        let mut b: Tree<TestTypes> = Tree::new(NodeData::new("other"));
        let call_b = { let parent = b.root; stmt(&mut b, parent, "call", "f") };
        let recv_b = { let parent = b.root; stmt(&mut b, parent, "receiver", "r") };
        b.compute_metrics();

        let (matching, report) =
            compute_matching_with(&matcher(), &a, &b, &MatchingConfig::default());
        assert_eq!(matching.get_b(call_a), Some(call_b));
        assert!(!matching.contains_a(recv_a));
        assert!(!matching.contains_b(recv_b));
        assert_eq!(report.rounds[0].resolution.tiny_suppressed, 1);
    }

    #[test]
    fn test_short_return_is_rejected_but_its_content_is_not() {
        let mut a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let ret_a = { let parent = a.root; stmt(&mut a, parent, "return", "x") };
        a.add_child(a.root, NodeData::labeled("name", "y"));
        a.compute_metrics();

        let mut b: Tree<TestTypes> = Tree::new(NodeData::new("other"));
        let ret_b = { let parent = b.root; stmt(&mut b, parent, "return", "x") };
        b.compute_metrics();

        let (matching, report) =
            compute_matching_with(&matcher(), &a, &b, &MatchingConfig::default());
        assert!(!matching.contains_a(ret_a));
        assert_eq!(report.rounds[0].resolution.unique_rejected, 1);

        let name_a = a.children(ret_a).next().unwrap();
        let name_b = b.children(ret_b).next().unwrap();
        assert_eq!(matching.get_b(name_a), Some(name_b));
        assert_eq!(report.rounds.len(), 2);
    }

    #[test]
    fn test_no_descent_when_disabled() {
        let mut a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        { let parent = a.root; stmt(&mut a, parent, "return", "x") };
        a.add_child(a.root, NodeData::labeled("name", "y"));
        a.compute_metrics();

        let mut b: Tree<TestTypes> = Tree::new(NodeData::new("other"));
        { let parent = b.root; stmt(&mut b, parent, "return", "x") };
        b.compute_metrics();

        let config = MatchingConfig {
            descend_into_rejected: false,
            ..MatchingConfig::default()
        };
        let (matching, report) = compute_matching_with(&matcher(), &a, &b, &config);
        assert!(matching.is_empty());
        assert_eq!(report.rounds.len(), 1);
    }

    #[test]
    fn test_greedy_accepts_short_return() {
        let mut a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let ret_a = { let parent = a.root; stmt(&mut a, parent, "return", "x") };
        a.add_child(a.root, NodeData::labeled("name", "y"));
        a.compute_metrics();

        let mut b: Tree<TestTypes> = Tree::new(NodeData::new("other"));
        let ret_b = { let parent = b.root; stmt(&mut b, parent, "return", "x") };
        b.compute_metrics();

        let (matching, _) = compute_matching_with(
            &GreedySubtreeMatcher::new(),
            &a,
            &b,
            &MatchingConfig::default(),
        );
        assert_eq!(matching.get_b(ret_a), Some(ret_b));
    }

    #[test]
    fn test_ambiguous_candidates_commit_one_to_one() {
        let mut a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let a0 = { let parent = a.root; stmt(&mut a, parent, "call", "x") };
        let a1 = { let parent = a.root; stmt(&mut a, parent, "call", "x") };
        a.compute_metrics();

        let mut b: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let b0 = { let parent = b.root; stmt(&mut b, parent, "call", "x") };
        let b1 = { let parent = b.root; stmt(&mut b, parent, "call", "x") };
        let b2 = { let parent = b.root; stmt(&mut b, parent, "call", "x") };
        b.compute_metrics();

        let (matching, report) =
            compute_matching_with(&matcher(), &a, &b, &MatchingConfig::default());
        assert_eq!(report.ambiguous_pairs(), 6);
        assert_eq!(report.committed(), 2);
        assert_eq!(matching.get_b(a0), Some(b0));
        assert_eq!(matching.get_b(a1), Some(b1));
        assert!(!matching.contains_b(b2));
        // two statements and their names
        assert_eq!(matching.len(), 4);
    }

    #[test]
    fn test_matching_is_deterministic() {
        let build = |names: &[&'static str]| {
            let mut tree: Tree<TestTypes> = Tree::new(NodeData::new("block"));
            for &name in names {
                let s = tree.add_child(tree.root, NodeData::new("call"));
                stmt(&mut tree, s, "arg", name);
            }
            tree.compute_metrics();
            tree
        };
        let a = build(&["x", "y", "x", "x", "z"]);
        let b = build(&["x", "x", "w", "y", "x"]);

        let (first, first_report) =
            compute_matching_with(&matcher(), &a, &b, &MatchingConfig::default());
        for _ in 0..5 {
            let (again, again_report) =
                compute_matching_with(&matcher(), &a, &b, &MatchingConfig::default());
            assert_eq!(
                first.pairs().collect::<Vec<_>>(),
                again.pairs().collect::<Vec<_>>()
            );
            assert_eq!(first_report, again_report);
        }
    }

    #[test]
    fn test_generation_skips_matched_nodes() {
        let mut a: Tree<TestTypes> = Tree::new(NodeData::new("root"));
        let s_a = { let parent = a.root; stmt(&mut a, parent, "call", "x") };
        a.compute_metrics();
        let mut b: Tree<TestTypes> = Tree::new(NodeData::new("other"));
        let s_b = { let parent = b.root; stmt(&mut b, parent, "call", "x") };
        b.compute_metrics();

        let config = MatchingConfig::default();
        let generation = generate_candidates(&a, &b, &Matching::new(), &Exhausted::default(), &config);
        assert_eq!(generation.candidates.pairs().collect::<Vec<_>>(), vec![(s_a, s_b)]);

        let mut matching = Matching::new();
        matching.add_recursively(&a, &b, s_a, s_b);
        let generation = generate_candidates(&a, &b, &matching, &Exhausted::default(), &config);
        assert!(generation.candidates.is_empty());
    }
}
