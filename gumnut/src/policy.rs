//! Node-kind policy applied during ambiguity resolution.

/// Decides which candidate pairs are trustworthy enough to commit.
///
/// Both questions are asked about the source node of a candidate; the
/// destination is isomorphic to it, so it has the same kind and height.
pub trait AcceptancePolicy<K> {
    /// Whether a candidate is too small and generic to be considered at all.
    fn is_tiny(&self, kind: &K, height: usize, min_priority: usize) -> bool;

    /// Whether a candidate may be committed on its own.
    fn is_acceptable(&self, kind: &K, height: usize) -> bool;
}

/// Suppresses nothing and accepts everything (classic greedy behavior).
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<K> AcceptancePolicy<K> for AcceptAll {
    fn is_tiny(&self, _kind: &K, _height: usize, _min_priority: usize) -> bool {
        false
    }

    fn is_acceptable(&self, _kind: &K, _height: usize) -> bool {
        true
    }
}

impl<K, P: AcceptancePolicy<K> + ?Sized> AcceptancePolicy<K> for &P {
    fn is_tiny(&self, kind: &K, height: usize, min_priority: usize) -> bool {
        (**self).is_tiny(kind, height, min_priority)
    }

    fn is_acceptable(&self, kind: &K, height: usize) -> bool {
        (**self).is_acceptable(kind, height)
    }
}
