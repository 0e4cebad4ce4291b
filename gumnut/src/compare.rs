//! Ranking of ambiguous candidates.
//!
//! When a subtree has several isomorphic counterparts, the resolver sorts the
//! ambiguous pairs best-first and commits them greedily. The ranking is a
//! policy: [`FullMappingComparator`] is the default, anything implementing
//! [`CandidateComparator`] can replace it. Whatever the policy, the order must
//! be total so that repeated runs commit the same pairs.

use core::cmp::Ordering;

use indextree::NodeId;
use rapidhash::RapidHashSet as HashSet;
use smallvec::SmallVec;

use crate::matching::Matching;
use crate::tree::DiffTree;

/// Sorts ambiguous candidate pairs, best first.
pub trait CandidateComparator {
    /// Reorder `candidates` in place. `matching` holds everything committed so far.
    fn rank<TA, TB>(
        &self,
        tree_a: &TA,
        tree_b: &TB,
        matching: &Matching,
        candidates: &mut [(NodeId, NodeId)],
    ) where
        TA: DiffTree,
        TB: DiffTree<Types = TA::Types>;
}

/// Ranks by surrounding structure first, then by position.
///
/// Criteria, in order:
/// 1. sibling similarity: Dice coefficient of the parents' descendants under
///    the current matching (higher first)
/// 2. ancestor similarity: longest common subsequence of ancestor kinds,
///    Dice-normalized (higher first)
/// 3. distance between the child-index paths to the roots (lower first)
/// 4. textual distance between the spans (lower first)
/// 5. start offset of the source, then of the destination
/// 6. arena index of the source, then of the destination
#[derive(Debug, Clone, Copy, Default)]
pub struct FullMappingComparator;

#[derive(Debug, Clone, Copy)]
struct Score {
    siblings: f64,
    ancestors: f64,
    parents_position: f64,
    textual: usize,
    src_start: usize,
    dst_start: usize,
    src_index: usize,
    dst_index: usize,
}

impl Score {
    fn compute<TA, TB>(tree_a: &TA, tree_b: &TB, matching: &Matching, a: NodeId, b: NodeId) -> Self
    where
        TA: DiffTree,
        TB: DiffTree<Types = TA::Types>,
    {
        let span_a = tree_a.span(a);
        let span_b = tree_b.span(b);
        Self {
            siblings: sibling_similarity(tree_a, tree_b, matching, a, b),
            ancestors: ancestor_similarity(tree_a, tree_b, a, b),
            parents_position: position_distance(tree_a, tree_b, a, b),
            textual: span_a.start.offset.abs_diff(span_b.start.offset)
                + span_a.end.offset.abs_diff(span_b.end.offset),
            src_start: span_a.start.offset,
            dst_start: span_b.start.offset,
            src_index: usize::from(a),
            dst_index: usize::from(b),
        }
    }

    fn rank(&self, other: &Self) -> Ordering {
        other
            .siblings
            .total_cmp(&self.siblings)
            .then_with(|| other.ancestors.total_cmp(&self.ancestors))
            .then_with(|| self.parents_position.total_cmp(&other.parents_position))
            .then_with(|| self.textual.cmp(&other.textual))
            .then_with(|| self.src_start.cmp(&other.src_start))
            .then_with(|| self.dst_start.cmp(&other.dst_start))
            .then_with(|| self.src_index.cmp(&other.src_index))
            .then_with(|| self.dst_index.cmp(&other.dst_index))
    }
}

impl CandidateComparator for FullMappingComparator {
    fn rank<TA, TB>(
        &self,
        tree_a: &TA,
        tree_b: &TB,
        matching: &Matching,
        candidates: &mut [(NodeId, NodeId)],
    ) where
        TA: DiffTree,
        TB: DiffTree<Types = TA::Types>,
    {
        let mut scored: Vec<(Score, (NodeId, NodeId))> = candidates
            .iter()
            .map(|&(a, b)| (Score::compute(tree_a, tree_b, matching, a, b), (a, b)))
            .collect();
        scored.sort_by(|x, y| x.0.rank(&y.0));
        for (slot, (_, pair)) in candidates.iter_mut().zip(scored) {
            *slot = pair;
        }
    }
}

/// Dice coefficient of the parents' descendants, counting descendants whose
/// match lies under the other parent.
fn sibling_similarity<TA, TB>(tree_a: &TA, tree_b: &TB, matching: &Matching, a: NodeId, b: NodeId) -> f64
where
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    let (Some(parent_a), Some(parent_b)) = (tree_a.parent(a), tree_b.parent(b)) else {
        return 0.0;
    };
    let desc_b: HashSet<NodeId> = tree_b.descendants(parent_b).collect();
    let mut total_a = 0usize;
    let mut common = 0usize;
    for desc in tree_a.descendants(parent_a) {
        total_a += 1;
        if matching.get_b(desc).is_some_and(|m| desc_b.contains(&m)) {
            common += 1;
        }
    }
    let total = total_a + desc_b.len();
    if total == 0 {
        0.0
    } else {
        2.0 * common as f64 / total as f64
    }
}

/// Dice-normalized longest common subsequence of the ancestor kind chains.
fn ancestor_similarity<TA, TB>(tree_a: &TA, tree_b: &TB, a: NodeId, b: NodeId) -> f64
where
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    let kinds_a: Vec<_> = tree_a.ancestors(a).map(|p| tree_a.kind(p)).collect();
    let kinds_b: Vec<_> = tree_b.ancestors(b).map(|p| tree_b.kind(p)).collect();
    let total = kinds_a.len() + kinds_b.len();
    if total == 0 {
        return 0.0;
    }

    let mut prev = vec![0usize; kinds_b.len() + 1];
    let mut row = vec![0usize; kinds_b.len() + 1];
    for ka in &kinds_a {
        for (j, kb) in kinds_b.iter().enumerate() {
            row[j + 1] = if ka == kb {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        core::mem::swap(&mut prev, &mut row);
    }
    let lcs = prev[kinds_b.len()];
    2.0 * lcs as f64 / total as f64
}

/// Euclidean distance between the child-index paths from each node to its root.
fn position_distance<TA, TB>(tree_a: &TA, tree_b: &TB, a: NodeId, b: NodeId) -> f64
where
    TA: DiffTree,
    TB: DiffTree<Types = TA::Types>,
{
    let path_a = position_path(tree_a, a);
    let path_b = position_path(tree_b, b);
    path_a
        .iter()
        .zip(path_b.iter())
        .map(|(&pa, &pb)| {
            let d = pa as f64 - pb as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn position_path<T: DiffTree>(tree: &T, id: NodeId) -> SmallVec<[usize; 16]> {
    let mut path = SmallVec::new();
    let mut current = id;
    while let Some(parent) = tree.parent(current) {
        path.push(tree.position(current));
        current = parent;
    }
    path
}
