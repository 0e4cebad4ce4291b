//! Matching two versions of a file.

use gumnut::indextree::NodeId;
use gumnut::{IdenticalSubtreeMatcher, MatchReport, Matching, MatchingConfig, compute_matching_with};
use rayon::prelude::*;

use crate::ast::AstTree;
use crate::debug;
use crate::policy::StatementPolicy;

/// The node matching between a before and an after tree.
pub struct TreeDiff {
    before: AstTree,
    after: AstTree,
    matching: Matching,
    report: MatchReport,
}

impl TreeDiff {
    /// The tree before the change.
    pub fn before(&self) -> &AstTree {
        &self.before
    }

    /// The tree after the change.
    pub fn after(&self) -> &AstTree {
        &self.after
    }

    /// The final one-to-one node matching.
    pub fn matching(&self) -> &Matching {
        &self.matching
    }

    /// What the matcher did to get there.
    pub fn report(&self) -> &MatchReport {
        &self.report
    }

    /// Counterpart of a before node, if it has one.
    pub fn after_of(&self, before: NodeId) -> Option<NodeId> {
        self.matching.get_b(before)
    }

    /// Counterpart of an after node, if it has one.
    pub fn before_of(&self, after: NodeId) -> Option<NodeId> {
        self.matching.get_a(after)
    }
}

/// Match `before` against `after` with the statement policy.
pub fn diff_trees(before: AstTree, after: AstTree, config: &MatchingConfig) -> TreeDiff {
    let matcher = IdenticalSubtreeMatcher::new(StatementPolicy);
    let (matching, report) = compute_matching_with(&matcher, &before, &after, config);
    debug!(
        before = before.file_path(),
        after = after.file_path(),
        matched = matching.len(),
        ambiguous = report.ambiguous_pairs(),
        "diff_trees"
    );
    TreeDiff {
        before,
        after,
        matching,
        report,
    }
}

/// Match many independent tree pairs in parallel. Results keep the input order.
pub fn diff_many(pairs: Vec<(AstTree, AstTree)>, config: &MatchingConfig) -> Vec<TreeDiff> {
    pairs
        .into_par_iter()
        .map(|(before, after)| diff_trees(before, after, config))
        .collect()
}
