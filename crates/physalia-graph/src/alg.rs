//! Traversal and query algorithms over [`Graph`].
//!
//! Results use `BTreeSet`/`Vec<String>` so callers get deterministic ordering
//! regardless of hash-map iteration order.

use crate::Graph;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};

/// Which edges a traversal is allowed to follow from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Outbound,
    Inbound,
    /// Run the outbound and inbound expansions independently and union the
    /// results. This is weaker than an undirected traversal: a node reachable
    /// only by alternating edge directions is not included.
    Both,
}

/// Collects every node within `depth` hops of `root`, root included.
///
/// An unknown root yields the empty set.
pub fn neighborhood(g: &Graph, root: &str, depth: usize, dir: Direction) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    if !g.has_node(root) {
        return out;
    }
    match dir {
        Direction::Outbound => bfs_into(g, root, depth, false, &mut out),
        Direction::Inbound => bfs_into(g, root, depth, true, &mut out),
        Direction::Both => {
            bfs_into(g, root, depth, false, &mut out);
            bfs_into(g, root, depth, true, &mut out);
        }
    }
    out
}

fn bfs_into(g: &Graph, root: &str, depth: usize, inbound: bool, out: &mut BTreeSet<String>) {
    // Per-pass visited set: in `Both` mode the two passes are independent and
    // may revisit each other's nodes; the union set absorbs the duplicates.
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    visited.insert(root);
    queue.push_back((root, 0));
    while let Some((v, d)) = queue.pop_front() {
        out.insert(v.to_string());
        if d == depth {
            continue;
        }
        let next = if inbound {
            g.predecessors(v)
        } else {
            g.successors(v)
        };
        for w in next {
            if visited.insert(w) {
                queue.push_back((w, d + 1));
            }
        }
    }
}

/// Shortest directed path from `from` to `to`, all edges unit cost, found by
/// a bidirectional Dijkstra search (forward frontier over out-edges, backward
/// frontier over in-edges).
///
/// Returns the ordered node sequence including both endpoints, or `None` when
/// either id is unknown or no directed path exists. The search is not
/// symmetric: `from` is always the path source.
pub fn shortest_path(g: &Graph, from: &str, to: &str) -> Option<Vec<String>> {
    if !g.has_node(from) || !g.has_node(to) {
        return None;
    }
    if from == to {
        return Some(vec![from.to_string()]);
    }

    let mut dist_f: FxHashMap<&str, u64> = FxHashMap::default();
    let mut dist_b: FxHashMap<&str, u64> = FxHashMap::default();
    let mut parent_f: FxHashMap<&str, &str> = FxHashMap::default();
    let mut parent_b: FxHashMap<&str, &str> = FxHashMap::default();
    let mut heap_f: BinaryHeap<Reverse<(u64, &str)>> = BinaryHeap::new();
    let mut heap_b: BinaryHeap<Reverse<(u64, &str)>> = BinaryHeap::new();

    dist_f.insert(from, 0);
    dist_b.insert(to, 0);
    heap_f.push(Reverse((0, from)));
    heap_b.push(Reverse((0, to)));

    let mut best = u64::MAX;
    let mut meet: Option<&str> = None;

    loop {
        prune_stale(&mut heap_f, &dist_f);
        prune_stale(&mut heap_b, &dist_b);
        let (Some(&Reverse((top_f, _))), Some(&Reverse((top_b, _)))) =
            (heap_f.peek(), heap_b.peek())
        else {
            break;
        };
        // Once the frontiers together cannot beat the best meeting point, the
        // candidate path is optimal.
        if top_f.saturating_add(top_b) >= best {
            break;
        }

        if top_f <= top_b {
            let Some(Reverse((d, v))) = heap_f.pop() else {
                break;
            };
            if let Some(&db) = dist_b.get(v) {
                if d + db < best {
                    best = d + db;
                    meet = Some(v);
                }
            }
            for w in g.successors(v) {
                let nd = d + 1;
                if nd < dist_f.get(w).copied().unwrap_or(u64::MAX) {
                    dist_f.insert(w, nd);
                    parent_f.insert(w, v);
                    heap_f.push(Reverse((nd, w)));
                    if let Some(&db) = dist_b.get(w) {
                        if nd + db < best {
                            best = nd + db;
                            meet = Some(w);
                        }
                    }
                }
            }
        } else {
            let Some(Reverse((d, v))) = heap_b.pop() else {
                break;
            };
            if let Some(&df) = dist_f.get(v) {
                if d + df < best {
                    best = d + df;
                    meet = Some(v);
                }
            }
            for u in g.predecessors(v) {
                let nd = d + 1;
                if nd < dist_b.get(u).copied().unwrap_or(u64::MAX) {
                    dist_b.insert(u, nd);
                    parent_b.insert(u, v);
                    heap_b.push(Reverse((nd, u)));
                    if let Some(&df) = dist_f.get(u) {
                        if nd + df < best {
                            best = nd + df;
                            meet = Some(u);
                        }
                    }
                }
            }
        }
    }

    let meet = meet?;

    let mut path: Vec<String> = Vec::new();
    let mut cur = meet;
    while let Some(&p) = parent_f.get(cur) {
        path.push(cur.to_string());
        cur = p;
    }
    path.push(cur.to_string());
    path.reverse();

    let mut cur = meet;
    while let Some(&n) = parent_b.get(cur) {
        path.push(n.to_string());
        cur = n;
    }
    Some(path)
}

fn prune_stale<'a>(heap: &mut BinaryHeap<Reverse<(u64, &'a str)>>, dist: &FxHashMap<&'a str, u64>) {
    while let Some(&Reverse((d, v))) = heap.peek() {
        if dist.get(v).copied().unwrap_or(u64::MAX) < d {
            heap.pop();
        } else {
            break;
        }
    }
}

/// Connectivity by transitive relation walking: counts every out-edge
/// encountered while recursively following outbound relations from `root`.
///
/// The on-stack guard makes cyclic relation data terminate: a node currently
/// being expanded is not re-entered (its edge is still counted), and the
/// guard is released when the traversal unwinds past it. Edges reachable via
/// multiple converging paths are therefore counted once per path — observed
/// behavior of the recursive walker this replaces, kept as-is.
pub fn transitive_link_count(g: &Graph, root: &str) -> usize {
    if !g.has_node(root) {
        return 0;
    }
    let mut on_stack: BTreeSet<String> = BTreeSet::new();
    walk(g, root, &mut on_stack)
}

fn walk(g: &Graph, v: &str, on_stack: &mut BTreeSet<String>) -> usize {
    on_stack.insert(v.to_string());
    let mut total = 0;
    for w in g.successors(v) {
        total += 1;
        if !on_stack.contains(w) {
            total += walk(g, w, on_stack);
        }
    }
    on_stack.remove(v);
    total
}

/// Connectivity by adjacency counting.
pub fn adjacency_link_count(g: &Graph, id: &str) -> usize {
    g.degree(id)
}

/// Ids of every node whose non-self-loop degree is zero. A node whose only
/// edge is a self-loop is still a singleton.
pub fn singletons(g: &Graph) -> BTreeSet<String> {
    g.nodes()
        .filter(|id| g.degree_without_self_loops(id) == 0)
        .map(|id| id.to_string())
        .collect()
}

/// Ordered ancestor chain of `id`: repeatedly follows the first inbound
/// relation (edge insertion order) until a root or a cycle is reached.
pub fn parent_chain(g: &Graph, id: &str) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    seen.insert(id);
    let mut cur = id;
    while let Some(p) = g.first_predecessor(cur) {
        if !seen.insert(p) {
            break;
        }
        chain.push(p.to_string());
        cur = p;
    }
    chain
}
