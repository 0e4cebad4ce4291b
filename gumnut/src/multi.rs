//! Many-to-many candidate store.
//!
//! Holds the isomorphic pairs found by the generation phase until the
//! resolution phase turns them into committed one-to-one matches. Iteration
//! follows insertion order so that resolution never depends on hash order.

use indextree::NodeId;
use rapidhash::RapidHashMap as HashMap;
use smallvec::SmallVec;

type Partners = SmallVec<[NodeId; 2]>;

/// A many-to-many relation between source and destination nodes.
#[derive(Debug, Default, Clone)]
pub struct MultiMappingStore {
    src_to_dsts: HashMap<NodeId, Partners>,
    dst_to_srcs: HashMap<NodeId, Partners>,
    src_order: Vec<NodeId>,
    dst_order: Vec<NodeId>,
    pairs: Vec<(NodeId, NodeId)>,
}

/// Candidates produced by one generation round.
pub type CandidateSet = MultiMappingStore;

impl MultiMappingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate pair. Returns `false` if it was already present.
    pub fn add(&mut self, src: NodeId, dst: NodeId) -> bool {
        let dsts = self.src_to_dsts.entry(src).or_default();
        if dsts.contains(&dst) {
            return false;
        }
        if dsts.is_empty() {
            self.src_order.push(src);
        }
        dsts.push(dst);

        let srcs = self.dst_to_srcs.entry(dst).or_default();
        if srcs.is_empty() {
            self.dst_order.push(dst);
        }
        srcs.push(src);

        self.pairs.push((src, dst));
        true
    }

    /// Whether `src` has at least one candidate.
    pub fn has_src(&self, src: NodeId) -> bool {
        self.src_to_dsts.contains_key(&src)
    }

    /// Whether `dst` has at least one candidate.
    pub fn has_dst(&self, dst: NodeId) -> bool {
        self.dst_to_srcs.contains_key(&dst)
    }

    /// Destination candidates of `src`, in insertion order.
    pub fn dsts(&self, src: NodeId) -> &[NodeId] {
        self.src_to_dsts
            .get(&src)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// Source candidates of `dst`, in insertion order.
    pub fn srcs(&self, dst: NodeId) -> &[NodeId] {
        self.dst_to_srcs
            .get(&dst)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `src` has exactly one candidate.
    pub fn is_src_unique(&self, src: NodeId) -> bool {
        self.dsts(src).len() == 1
    }

    /// Whether `dst` has exactly one candidate.
    pub fn is_dst_unique(&self, dst: NodeId) -> bool {
        self.srcs(dst).len() == 1
    }

    /// Every source with at least one candidate, in insertion order.
    pub fn all_srcs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.src_order.iter().copied()
    }

    /// Every destination with at least one candidate, in insertion order.
    pub fn all_dsts(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dst_order.iter().copied()
    }

    /// Every pair, in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the store holds no pair.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
