//! String-keyed directed graph container.
//!
//! Unlike a general-purpose graph library, insertion follows the snapshot
//! contract of the reconciler: a node id is added once (first occurrence
//! wins), and an edge is added only when both endpoints already exist and the
//! directed pair is not already present. Parallel edges are never stored;
//! self-loops are.

use rustc_hash::FxBuildHasher;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// A directed edge, identified by its endpoint pair.
#[derive(Debug, Clone)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
}

impl EdgeKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.target == other.target
    }
}

impl Eq for EdgeKey {}

impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.target.hash(state);
    }
}

#[derive(Clone, Copy, Hash)]
struct EdgeKeyView<'a> {
    source: &'a str,
    target: &'a str,
}

impl<'a> hashbrown::Equivalent<EdgeKey> for EdgeKeyView<'a> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.source == self.source && key.target == self.target
    }
}

// Degree and neighbor queries are called per node on every annotation pass,
// so scanning the edge list each time would be O(E) per query. The adjacency
// cache maps each node index to the edge indices leaving/entering it and is
// rebuilt lazily after a topology change.
//
// Note: interior mutability keeps query APIs on `&self`.
#[derive(Debug, Clone)]
struct AdjCache {
    generation: u64,
    out: Vec<Vec<usize>>,
    in_: Vec<Vec<usize>>,
}

pub struct Graph {
    nodes: Vec<String>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeKey>,
    edge_index: HashMap<EdgeKey, usize>,

    adj_gen: u64,
    adj_cache: RefCell<Option<AdjCache>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            adj_gen: 0,
            adj_cache: RefCell::new(None),
        }
    }

    /// Builds an index from id and endpoint-pair sequences, applying the
    /// first-wins dedup rules of [`add_node`](Self::add_node) and
    /// [`add_edge`](Self::add_edge).
    pub fn build<'a, N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = &'a str>,
        E: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut g = Self::new();
        for id in nodes {
            g.add_node(id);
        }
        for (source, target) in edges {
            g.add_edge(source, target);
        }
        g
    }

    fn invalidate_adj(&mut self) {
        self.adj_gen = self.adj_gen.wrapping_add(1);
        *self.adj_cache.get_mut() = None;
    }

    fn ensure_adj(&self) -> std::cell::RefMut<'_, AdjCache> {
        let generation = self.adj_gen;
        let mut cache = self.adj_cache.borrow_mut();
        let stale = cache
            .as_ref()
            .map(|c| c.generation != generation)
            .unwrap_or(true);
        if stale {
            let mut out: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
            let mut in_: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
            for (edge_idx, e) in self.edges.iter().enumerate() {
                let Some(&s_idx) = self.node_index.get(e.source.as_str()) else {
                    continue;
                };
                let Some(&t_idx) = self.node_index.get(e.target.as_str()) else {
                    continue;
                };
                out[s_idx].push(edge_idx);
                in_[t_idx].push(edge_idx);
            }
            *cache = Some(AdjCache {
                generation,
                out,
                in_,
            });
        }
        std::cell::RefMut::map(cache, |c| {
            c.as_mut()
                .expect("adjacency cache should be present after ensure")
        })
    }

    /// Adds a node id. Returns `false` (keeping the first occurrence) if the
    /// id is already present.
    pub fn add_node(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.node_index.contains_key(id.as_str()) {
            return false;
        }
        self.invalidate_adj();
        let idx = self.nodes.len();
        self.nodes.push(id.clone());
        self.node_index.insert(id, idx);
        true
    }

    /// Adds a directed edge. Returns `false` when either endpoint is unknown
    /// or the pair is already present (first occurrence wins).
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        if !self.node_index.contains_key(source) || !self.node_index.contains_key(target) {
            return false;
        }
        let view = EdgeKeyView { source, target };
        if self.edge_index.contains_key(&view) {
            return false;
        }
        self.invalidate_adj();
        let key = EdgeKey::new(source, target);
        let idx = self.edges.len();
        self.edges.push(key.clone());
        self.edge_index.insert(key, idx);
        true
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edge_index
            .contains_key(&EdgeKeyView { source, target })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.clone()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        let Some(&idx) = self.node_index.get(id) else {
            return 0;
        };
        self.ensure_adj().out[idx].len()
    }

    pub fn in_degree(&self, id: &str) -> usize {
        let Some(&idx) = self.node_index.get(id) else {
            return 0;
        };
        self.ensure_adj().in_[idx].len()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.in_degree(id) + self.out_degree(id)
    }

    /// Degree with self-loop edges excluded entirely. A self-loop contributes
    /// one out-edge and one in-edge, so it is subtracted from both sides.
    pub fn degree_without_self_loops(&self, id: &str) -> usize {
        let d = self.degree(id);
        if self.has_edge(id, id) { d - 2 } else { d }
    }

    pub fn successors(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        let out_edges = &cache.out[idx];
        let mut out: Vec<&str> = Vec::with_capacity(out_edges.len());
        for &edge_idx in out_edges {
            out.push(self.edges[edge_idx].target.as_str());
        }
        out
    }

    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        let in_edges = &cache.in_[idx];
        let mut out: Vec<&str> = Vec::with_capacity(in_edges.len());
        for &edge_idx in in_edges {
            out.push(self.edges[edge_idx].source.as_str());
        }
        out
    }

    pub fn first_predecessor<'a>(&'a self, id: &str) -> Option<&'a str> {
        let &idx = self.node_index.get(id)?;
        let source = {
            let cache = self.ensure_adj();
            let edge_idx = *cache.in_[idx].first()?;
            self.edges[edge_idx].source.as_str()
        };
        Some(source)
    }

    /// Undirected neighborhood of `id`, deduplicated, in edge insertion order.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for w in self.successors(id) {
            if !out.iter().any(|x| x == &w) {
                out.push(w);
            }
        }
        for u in self.predecessors(id) {
            if !out.iter().any(|x| x == &u) {
                out.push(u);
            }
        }
        out
    }
}
