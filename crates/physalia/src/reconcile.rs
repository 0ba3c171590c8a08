//! Snapshot reconciliation.
//!
//! Source data is messy: the same entity appears in several relation files,
//! relation pairs repeat, and some records carry no identifier at all. The
//! reconciler is deliberately lenient — malformed records vanish, duplicates
//! collapse to their first occurrence — so a bad row never takes the graph
//! down.

use crate::record::{EdgeRecord, NodeRecord};
use rustc_hash::FxHashSet;

/// The deduplicated working set handed to annotation and indexing.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// How an incremental update combines with the live working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// The new snapshot discards the old one.
    #[default]
    Replace,
    /// New records are concatenated onto the existing arrays, then the whole
    /// set is re-deduplicated so derived fields see the union.
    Append,
}

/// Produces a snapshot where node ids and (source, target) pairs are unique,
/// first occurrence winning. Inputs are never mutated; records missing an
/// identifier are dropped silently.
pub fn reconcile(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> Snapshot {
    let mut seen_ids: FxHashSet<&str> = FxHashSet::default();
    let mut out_nodes: Vec<NodeRecord> = Vec::with_capacity(nodes.len());
    for n in nodes {
        if n.id.is_empty() {
            continue;
        }
        if seen_ids.insert(n.id.as_str()) {
            out_nodes.push(n.clone());
        }
    }

    let mut seen_pairs: FxHashSet<(&str, &str)> = FxHashSet::default();
    let mut out_edges: Vec<EdgeRecord> = Vec::with_capacity(edges.len());
    for e in edges {
        if e.source.is_empty() || e.target.is_empty() {
            continue;
        }
        if seen_pairs.insert((e.source.as_str(), e.target.as_str())) {
            out_edges.push(e.clone());
        }
    }

    Snapshot {
        nodes: out_nodes,
        edges: out_edges,
    }
}
