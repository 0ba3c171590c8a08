//! The consolidated graph engine.
//!
//! One engine, parameterized by [`EngineConfig`], replaces the production
//! deployment's several near-identical copies (which differed only in force
//! toggles, edge geometry, and connectivity policy). The host drives it with
//! `update` on data changes, `tick` once per frame, and the query/drag/click
//! methods in response to user events.

use crate::annotate::{
    AnnotateOptions, ConnectivityPolicy, EdgeState, NodeState, annotate_edges, annotate_nodes,
};
use crate::error::Result;
use crate::interaction::{ClickOutcome, Interaction};
use crate::reconcile::{UpdateMode, reconcile};
use crate::record::{DEFAULT_PALETTE, EdgeRecord, NodeRecord, Rgb};
use physalia_graph::{Direction, Graph, alg};
use physalia_sim::geometry::{EdgeEnds, Point, arc_path, line_path};
use physalia_sim::{ForceConfig, LayoutPhase, LinkSpec, SimNode, Simulation};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use tracing::debug;

/// How edge paths are derived from endpoint positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeGeometry {
    /// Straight two-segment polyline; `exclude_radius` clips the endpoints to
    /// the node boundaries.
    Line { exclude_radius: bool },
    /// Circular arc clipped to the node boundaries.
    Arc,
}

impl Default for EdgeGeometry {
    fn default() -> Self {
        Self::Line {
            exclude_radius: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub forces: ForceConfig,
    pub edge_geometry: EdgeGeometry,
    pub connectivity: ConnectivityPolicy,
    /// Direction of neighbor expansion on click.
    pub neighbor_mode: Direction,
    pub neighbor_depth: usize,
    pub radius_range: (f64, f64),
    pub label_wrap: usize,
    pub default_stroke_width: f64,
    pub palette: Vec<Rgb>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            forces: ForceConfig::default(),
            edge_geometry: EdgeGeometry::default(),
            connectivity: ConnectivityPolicy::default(),
            // Neighbor browsing follows outbound relations two hops, like the
            // production defaults.
            neighbor_mode: Direction::Outbound,
            neighbor_depth: 2,
            radius_range: (4.5, 22.0),
            label_wrap: 30,
            default_stroke_width: 1.5,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

#[derive(Default)]
pub struct Engine {
    config: EngineConfig,
    nodes: Vec<NodeState>,
    edges: Vec<EdgeState>,
    index: Graph,
    sim: Option<Simulation>,
    interaction: Interaction,
}

impl Engine {
    /// Alpha target after a data update; the layout keeps simmering while the
    /// view is interactive.
    const UPDATE_REHEAT: f64 = 0.5;
    /// Faster cooling than the d3 default, so updates settle quickly.
    const UPDATE_ALPHA_DECAY: f64 = 0.3;
    /// Alpha target while a drag or highlight interaction is in progress.
    const INTERACTION_REHEAT: f64 = 0.3;

    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[NodeState] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeState] {
        &self.edges
    }

    pub fn index(&self) -> &Graph {
        &self.index
    }

    pub fn node(&self, id: &str) -> Option<&NodeState> {
        self.nodes.iter().find(|s| s.id() == id)
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Reconciles `nodes`/`edges` into the working set, rebuilds the index
    /// and annotations, and restarts the simulation hot. Never call from
    /// within a tick; an update must complete before ticking resumes.
    pub fn update(
        &mut self,
        nodes: &[NodeRecord],
        edges: &[EdgeRecord],
        mode: UpdateMode,
    ) -> Result<()> {
        let snapshot = match mode {
            UpdateMode::Replace => reconcile(nodes, edges),
            UpdateMode::Append => {
                let mut all_nodes: Vec<NodeRecord> =
                    self.nodes.iter().map(|s| s.record.clone()).collect();
                all_nodes.extend_from_slice(nodes);
                let mut all_edges: Vec<EdgeRecord> =
                    self.edges.iter().map(|s| s.record.clone()).collect();
                all_edges.extend_from_slice(edges);
                reconcile(&all_nodes, &all_edges)
            }
        };

        self.index = Graph::build(
            snapshot.nodes.iter().map(|n| n.id.as_str()),
            snapshot
                .edges
                .iter()
                .map(|e| (e.source.as_str(), e.target.as_str())),
        );

        let opts = AnnotateOptions {
            policy: self.config.connectivity,
            radius_range: self.config.radius_range,
            palette: &self.config.palette,
            label_wrap: self.config.label_wrap,
        };
        let mut states = annotate_nodes(&snapshot.nodes, &self.index, &opts);

        // Surviving nodes keep their live position/velocity/pin so the layout
        // stays near its previous arrangement; new nodes enter unplaced.
        {
            let previous: FxHashMap<&str, &NodeState> =
                self.nodes.iter().map(|s| (s.id(), s)).collect();
            for s in &mut states {
                if let Some(old) = previous.get(s.id()) {
                    s.x = old.x;
                    s.y = old.y;
                    s.vx = old.vx;
                    s.vy = old.vy;
                    s.fx = old.fx;
                    s.fy = old.fy;
                    s.hidden = old.hidden;
                }
            }
        }
        self.nodes = states;
        self.edges = annotate_edges(&snapshot.edges, self.config.default_stroke_width);

        let sim_nodes: Vec<SimNode> = self
            .nodes
            .iter()
            .map(|s| {
                let mut n = SimNode::at(s.record.id.clone(), s.x, s.y);
                n.vx = s.vx;
                n.vy = s.vy;
                n.fx = s.fx;
                n.fy = s.fy;
                n.radius = s.radius;
                let (hw, hh) = s.half_extents();
                n.half_width = hw;
                n.half_height = hh;
                n.group = s.record.category.clone();
                n
            })
            .collect();
        // Only edges whose endpoints made it into the index participate in
        // the spring force; dangling records stay in the working set with no
        // path.
        let links: Vec<LinkSpec> = self
            .edges
            .iter()
            .filter(|e| self.index.has_edge(&e.record.source, &e.record.target))
            .map(|e| LinkSpec::new(e.record.source.clone(), e.record.target.clone()))
            .collect();

        let mut sim = Simulation::new(sim_nodes, &links, self.config.forces.clone())?;
        sim.set_alpha_decay(Self::UPDATE_ALPHA_DECAY);
        sim.reheat(Self::UPDATE_REHEAT);
        self.sim = Some(sim);

        self.sync_from_sim();
        self.refresh_edge_paths();

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            ?mode,
            "snapshot updated"
        );
        Ok(())
    }

    /// Advances the layout one step and re-derives the per-edge geometry.
    /// This is the only point where simulation output becomes visible to the
    /// rendering collaborator.
    pub fn tick(&mut self) {
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        sim.tick();
        self.sync_from_sim();
        self.refresh_edge_paths();
    }

    fn sync_from_sim(&mut self) {
        let Some(sim) = self.sim.as_ref() else {
            return;
        };
        for (state, body) in self.nodes.iter_mut().zip(sim.nodes()) {
            state.x = body.x;
            state.y = body.y;
            state.vx = body.vx;
            state.vy = body.vy;
            state.fx = body.fx;
            state.fy = body.fy;
        }
    }

    fn refresh_edge_paths(&mut self) {
        let positions: FxHashMap<&str, (f64, f64, f64)> = self
            .nodes
            .iter()
            .map(|s| (s.id(), (s.x, s.y, s.radius)))
            .collect();
        for e in &mut self.edges {
            let (Some(&(sx, sy, sr)), Some(&(tx, ty, tr))) = (
                positions.get(e.record.source.as_str()),
                positions.get(e.record.target.as_str()),
            ) else {
                e.path = None;
                continue;
            };
            let ends = EdgeEnds {
                source: Point::new(sx, sy),
                target: Point::new(tx, ty),
                source_radius: sr,
                target_radius: tr,
                stroke_width: e.stroke_width,
            };
            e.path = Some(match self.config.edge_geometry {
                EdgeGeometry::Line { exclude_radius } => line_path(&ends, exclude_radius),
                EdgeGeometry::Arc => arc_path(&ends),
            });
        }
    }

    pub fn phase(&self) -> LayoutPhase {
        self.sim
            .as_ref()
            .map(|s| s.phase())
            .unwrap_or(LayoutPhase::Settled)
    }

    pub fn alpha(&self) -> f64 {
        self.sim.as_ref().map(|s| s.alpha()).unwrap_or(0.0)
    }

    /// Shortest directed path between two ids; `None` doubles as the
    /// user-facing "no shortest path found" signal.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        alg::shortest_path(&self.index, from, to)
    }

    /// Neighborhood of `root` under the configured depth and direction.
    pub fn neighbors(&self, root: &str) -> BTreeSet<String> {
        alg::neighborhood(
            &self.index,
            root,
            self.config.neighbor_depth,
            self.config.neighbor_mode,
        )
    }

    pub fn singletons(&self) -> BTreeSet<String> {
        alg::singletons(&self.index)
    }

    /// Case-insensitive substring search over display labels; hits come back
    /// sorted by label, as the suggestion dropdown expects.
    pub fn search(&self, query: &str) -> Vec<String> {
        let q = query.to_lowercase();
        let mut hits: Vec<&NodeState> = self
            .nodes
            .iter()
            .filter(|s| s.record.display_label().to_lowercase().contains(&q))
            .collect();
        hits.sort_by_key(|s| s.record.display_label().to_lowercase());
        hits.iter().map(|s| s.id().to_string()).collect()
    }

    pub fn find_by_label(&self, label: &str) -> Option<&NodeState> {
        self.nodes.iter().find(|s| s.record.display_label() == label)
    }

    /// Marks/unmarks every singleton as hidden and reheats so the remaining
    /// nodes re-settle around the gap.
    pub fn set_singletons_hidden(&mut self, hidden: bool) {
        let singles = alg::singletons(&self.index);
        for s in &mut self.nodes {
            if singles.contains(s.id()) {
                s.hidden = hidden;
            }
        }
        if let Some(sim) = self.sim.as_mut() {
            sim.reheat(Self::INTERACTION_REHEAT);
        }
    }

    /// Pins the node at its current position and reheats; physics stop moving
    /// it until [`drag_end`](Self::drag_end).
    pub fn drag_start(&mut self, id: &str) -> bool {
        let Some(sim) = self.sim.as_mut() else {
            return false;
        };
        let Some(idx) = sim.find(id) else {
            return false;
        };
        let (x, y) = {
            let n = &sim.nodes()[idx];
            (n.x, n.y)
        };
        sim.pin(idx, x, y);
        sim.reheat(Self::INTERACTION_REHEAT);
        self.sync_from_sim();
        true
    }

    pub fn drag_move(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(sim) = self.sim.as_mut() else {
            return false;
        };
        let Some(idx) = sim.find(id) else {
            return false;
        };
        sim.pin(idx, x, y);
        self.sync_from_sim();
        true
    }

    /// Releases the pin; the node rejoins the physics and the layout cools
    /// back down.
    pub fn drag_end(&mut self, id: &str) -> bool {
        let Some(sim) = self.sim.as_mut() else {
            return false;
        };
        let Some(idx) = sim.find(id) else {
            return false;
        };
        sim.unpin(idx);
        sim.set_alpha_target(0.0);
        self.sync_from_sim();
        true
    }

    pub fn begin_neighbor_browse(&mut self) {
        self.interaction.begin_neighbor_browse();
    }

    pub fn begin_path_pick(&mut self) {
        self.interaction.begin_path_pick();
    }

    /// Enters search mode and returns the matching ids for the suggestion
    /// list.
    pub fn begin_search(&mut self, query: &str) -> Vec<String> {
        let hits = self.search(query);
        self.interaction.begin_search(query);
        hits
    }

    pub fn reset(&mut self) {
        self.interaction.reset();
    }

    /// Routes a node click through the interaction state machine. Highlight
    /// outcomes reheat the layout, mirroring the neighbor-click behavior of
    /// the production view.
    pub fn click(&mut self, id: &str) -> ClickOutcome {
        let outcome = self.interaction.click(
            &self.index,
            self.config.neighbor_depth,
            self.config.neighbor_mode,
            id,
        );
        if matches!(outcome, ClickOutcome::Highlight(_)) {
            if let Some(sim) = self.sim.as_mut() {
                sim.reheat(Self::INTERACTION_REHEAT);
            }
        }
        debug!(id, ?outcome, "node clicked");
        outcome
    }
}
