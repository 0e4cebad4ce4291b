//! # Gumnut
//!
//! GumTree-style greedy subtree matching with pluggable ambiguity resolution.
//!
//! Named after the woody fruit of the gum tree.
//!
//! ## Algorithm Overview
//!
//! Given two trees, gumnut finds pairs of identical (isomorphic) subtrees:
//!
//! 1. **Identical roots**: if both trees are isomorphic, everything matches
//! 2. **Generation**: both trees are walked highest subtree first through
//!    [`PriorityTreeQueue`]s kept in lock-step; every isomorphic pair of equal
//!    height becomes a candidate
//! 3. **Resolution**: unique candidates are committed directly, ambiguous ones
//!    are ranked by a [`CandidateComparator`] and committed greedily, both
//!    under an [`AcceptancePolicy`]
//! 4. **Descent**: candidates that were not committed are looked through in a
//!    further round, so their inner subtrees still get a chance
//!
//! ## Usage
//!
//! ```
//! use gumnut::{DiffTree, MatchingConfig, NodeData, SimpleTypes, Tree, compute_matching};
//!
//! type Types = SimpleTypes<&'static str, &'static str>;
//!
//! let mut a: Tree<Types> = Tree::new(NodeData::new("block"));
//! a.add_child(a.root, NodeData::labeled("call", "f"));
//! a.add_child(a.root, NodeData::labeled("call", "g"));
//! a.compute_metrics();
//!
//! let mut b: Tree<Types> = Tree::new(NodeData::new("block"));
//! b.add_child(b.root, NodeData::labeled("call", "g"));
//! b.compute_metrics();
//!
//! let matching = compute_matching(&a, &b, &MatchingConfig::default());
//! let g = a.children(a.root).last().unwrap();
//! assert!(matching.contains_a(g));
//! ```

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

pub use indextree;

mod tracing_macros;
pub(crate) use tracing_macros::{debug, trace};

/// Ranking of ambiguous candidates
pub mod compare;
/// Matching driver and the one-to-one mapping store
pub mod matching;
/// Many-to-many candidate store
pub mod multi;
/// Node-kind acceptance policies
pub mod policy;
/// Priority-bucketed tree traversal
pub mod priority;
/// Generation and resolution strategies
pub mod strategy;
/// Tree representation
pub mod tree;

pub use compare::{CandidateComparator, FullMappingComparator};
pub use matching::{
    Exhausted, MatchReport, Matching, MatchingConfig, RoundReport, compute_matching,
    compute_matching_with, extend_matching,
};
pub use multi::{CandidateSet, MultiMappingStore};
pub use policy::{AcceptAll, AcceptancePolicy};
pub use priority::{PriorityKind, PriorityTreeQueue, synchronize};
pub use strategy::{
    Generation, GreedySubtreeMatcher, IdenticalSubtreeMatcher, ResolveReport,
    SubtreeMatchingStrategy, generate_candidates, resolve_candidates,
};
pub use tree::{
    DiffTree, NodeData, NodeHash, Position, SimpleTypes, Span, Tree, TreeTypes, is_isomorphic,
};
