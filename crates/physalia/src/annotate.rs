//! Derived per-record state: connectivity, radii, colors, label geometry.
//!
//! Annotation runs after every reconciliation, over the freshly rebuilt
//! graph index. The simulation and the rendering layer both read these
//! states; only the simulation writes the position/velocity fields back.

use crate::record::{EdgeRecord, NodeRecord, Rgb, UNGROUPED_COLOR};
use crate::text::{measure_label, split_long_text};
use physalia_graph::{Graph, alg};
use physalia_sim::PathGeometry;
use rustc_hash::FxHashMap;

/// How a node's `link_cnt` is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityPolicy {
    /// In-degree plus out-degree from the adjacency index.
    #[default]
    Adjacency,
    /// Count of all edges reachable by recursively following outbound
    /// relations, cycle-guarded. Double-counts converging paths; see
    /// `transitive_link_count`.
    Transitive,
}

/// A node record plus everything derived from it, including live simulation
/// state.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub record: NodeRecord,
    pub link_cnt: usize,
    pub radius: f64,
    pub color: Rgb,
    pub label_lines: Vec<String>,
    pub label_width: f64,
    pub label_height: f64,
    /// Ordered ancestor ids, derived from inbound relations.
    pub parent_chain: Vec<String>,
    /// Visibility hint for the renderer (singleton filtering).
    pub hidden: bool,

    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl NodeState {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Label font size is proportional to the node, with a readable floor.
    pub fn font_size(&self) -> f64 {
        self.radius.max(8.0)
    }

    /// Collision half extents: the label box around the circle.
    pub fn half_extents(&self) -> (f64, f64) {
        (
            self.radius + self.label_width / 2.0,
            self.radius.max(self.label_height / 2.0),
        )
    }
}

/// An edge record plus derived stroke width and the last computed path.
#[derive(Debug, Clone)]
pub struct EdgeState {
    pub record: EdgeRecord,
    pub stroke_width: f64,
    /// `None` until the first tick, or when an endpoint is unresolved.
    pub path: Option<PathGeometry>,
}

/// Square-root scale from connectivity to circle radius, clamped to `range`.
pub fn radius_scale(link_cnt: usize, max_cnt: usize, range: (f64, f64)) -> f64 {
    let (lo, hi) = range;
    if max_cnt == 0 {
        return lo;
    }
    let t = (link_cnt as f64).sqrt() / (max_cnt as f64).sqrt();
    (lo + (hi - lo) * t).clamp(lo, hi)
}

pub(crate) struct AnnotateOptions<'a> {
    pub(crate) policy: ConnectivityPolicy,
    pub(crate) radius_range: (f64, f64),
    pub(crate) palette: &'a [Rgb],
    pub(crate) label_wrap: usize,
}

/// Ordinal color assignment: distinct categories sorted, then mapped onto the
/// palette in order, cycling when there are more categories than colors.
fn category_colors(nodes: &[NodeRecord], palette: &[Rgb]) -> FxHashMap<String, Rgb> {
    let mut categories: Vec<&str> = nodes
        .iter()
        .filter_map(|n| n.category.as_deref())
        .collect();
    categories.sort_unstable();
    categories.dedup();

    let mut colors = FxHashMap::default();
    for (i, c) in categories.into_iter().enumerate() {
        let color = if palette.is_empty() {
            UNGROUPED_COLOR
        } else {
            palette[i % palette.len()]
        };
        colors.insert(c.to_string(), color);
    }
    colors
}

pub(crate) fn annotate_nodes(
    nodes: &[NodeRecord],
    graph: &Graph,
    opts: &AnnotateOptions<'_>,
) -> Vec<NodeState> {
    let counts: Vec<usize> = nodes
        .iter()
        .map(|n| match opts.policy {
            ConnectivityPolicy::Adjacency => graph.degree(&n.id),
            ConnectivityPolicy::Transitive => alg::transitive_link_count(graph, &n.id),
        })
        .collect();
    let max_cnt = counts.iter().copied().max().unwrap_or(0);
    let colors = category_colors(nodes, opts.palette);

    nodes
        .iter()
        .zip(counts)
        .map(|(record, link_cnt)| {
            let radius = radius_scale(link_cnt, max_cnt, opts.radius_range);
            let color = record
                .category
                .as_deref()
                .and_then(|c| colors.get(c).copied())
                .unwrap_or(UNGROUPED_COLOR);
            let label_lines = split_long_text(record.display_label(), opts.label_wrap);
            let font_size = radius.max(8.0);
            let metrics = measure_label(&label_lines, font_size);
            let parent_chain = alg::parent_chain(graph, &record.id);
            NodeState {
                record: record.clone(),
                link_cnt,
                radius,
                color,
                label_lines,
                label_width: metrics.width,
                label_height: metrics.height,
                parent_chain,
                hidden: false,
                x: f64::NAN,
                y: f64::NAN,
                vx: 0.0,
                vy: 0.0,
                fx: None,
                fy: None,
            }
        })
        .collect()
}

pub(crate) fn annotate_edges(edges: &[EdgeRecord], default_stroke_width: f64) -> Vec<EdgeState> {
    edges
        .iter()
        .map(|record| EdgeState {
            record: record.clone(),
            stroke_width: default_stroke_width,
            path: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{radius_scale, AnnotateOptions, ConnectivityPolicy, annotate_nodes};
    use crate::record::{DEFAULT_PALETTE, NodeRecord};
    use physalia_graph::Graph;

    #[test]
    fn radius_scale_clamps_both_ends() {
        let range = (4.5, 22.0);
        assert_eq!(radius_scale(0, 10, range), 4.5);
        assert_eq!(radius_scale(10, 10, range), 22.0);
        assert_eq!(radius_scale(0, 0, range), 4.5);
        let mid = radius_scale(5, 10, range);
        assert!(mid > 4.5 && mid < 22.0);
    }

    #[test]
    fn same_category_nodes_share_a_color() {
        let nodes = vec![
            NodeRecord::with_category("a", "energy"),
            NodeRecord::with_category("b", "energy"),
            NodeRecord::with_category("c", "policy"),
        ];
        let graph = Graph::build(["a", "b", "c"], Vec::new());
        let opts = AnnotateOptions {
            policy: ConnectivityPolicy::Adjacency,
            radius_range: (4.5, 22.0),
            palette: &DEFAULT_PALETTE,
            label_wrap: 30,
        };
        let states = annotate_nodes(&nodes, &graph, &opts);
        assert_eq!(states[0].color, states[1].color);
        assert_ne!(states[0].color, states[2].color);
    }
}
