//! The incremental force simulation.
//!
//! Semantics follow the d3-force protocol the rendering layer was written
//! against: alpha relaxes toward `alpha_target` each tick, every active force
//! accumulates into velocities, velocities decay and integrate into
//! positions, and a pinned node (`fx`/`fy`) snaps to its pin with zeroed
//! velocity until released.

use crate::error::{Error, Result};
use crate::forces;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// One simulated body. Position/velocity are the only fields the simulation
/// mutates; everything else is caller-supplied input.
#[derive(Debug, Clone)]
pub struct SimNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Pinned position during drag; overrides integration while set.
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    pub radius: f64,
    /// Collision half extents (label box plus radius).
    pub half_width: f64,
    pub half_height: f64,
    /// Pull target of the axis anchor force.
    pub anchor_x: f64,
    pub anchor_y: f64,
    /// Category label for the cluster force.
    pub group: Option<String>,
}

impl SimNode {
    /// A node without an initial position; the simulation places it on the
    /// deterministic phyllotaxis spiral.
    pub fn new(id: impl Into<String>) -> Self {
        Self::at(id, f64::NAN, f64::NAN)
    }

    pub fn at(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            radius: 4.5,
            half_width: 4.5,
            half_height: 4.5,
            anchor_x: x,
            anchor_y: y,
            group: None,
        }
    }
}

/// A link between two node ids, resolved to indices when the simulation is
/// built.
#[derive(Debug, Clone)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
    /// Per-link target distance; falls back to [`ForceConfig::link_distance`].
    pub distance: Option<f64>,
}

impl LinkSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            distance: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SimEdge {
    pub(crate) source: usize,
    pub(crate) target: usize,
    pub(crate) distance: f64,
    pub(crate) strength: f64,
    /// Degree share of the source endpoint; the target absorbs this fraction
    /// of the spring displacement, the source the remainder.
    pub(crate) bias: f64,
}

/// Which forces run each tick, and their tuning. Defaults mirror the
/// production layout: 100px springs, weak axis anchors, -250 charge,
/// three collision passes, 0.15 cluster pull.
#[derive(Debug, Clone)]
pub struct ForceConfig {
    pub link: bool,
    pub anchor: bool,
    pub many_body: bool,
    pub collide: bool,
    pub cluster: bool,

    pub link_distance: f64,
    /// Per-link spring strength; `None` derives `1 / min(degree)` per link.
    pub link_strength: Option<f64>,
    pub anchor_strength: f64,
    pub charge_strength: f64,
    /// Barnes-Hut opening angle.
    pub theta: f64,
    pub collide_strength: f64,
    pub collide_iterations: usize,
    pub cluster_strength: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link: true,
            anchor: true,
            many_body: true,
            collide: true,
            cluster: true,
            link_distance: 100.0,
            link_strength: None,
            anchor_strength: 0.1,
            charge_strength: -250.0,
            theta: 0.9,
            collide_strength: 1.0,
            collide_iterations: 3,
            cluster_strength: 0.15,
        }
    }
}

/// Where the simulation sits on its energy curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    /// Alpha is held up by a nonzero target (interaction in progress).
    Running,
    /// Alpha is decaying toward rest.
    Cooling,
    /// Alpha fell below the floor; ticks are no-ops until a reheat.
    Settled,
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    id_index: FxHashMap<String, usize>,
    groups: IndexMap<String, Vec<usize>>,

    config: ForceConfig,

    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,

    rng: XorShift64Star,
}

impl Simulation {
    const ALPHA_MIN: f64 = 0.001;
    /// Velocity retained per tick (d3's default 0.4 decay).
    const VELOCITY_DECAY: f64 = 0.6;
    const INITIAL_RADIUS: f64 = 10.0;

    /// Builds a simulation over `nodes`. Every link must name two known node
    /// ids; the engine filters its links through the graph index first, so
    /// [`Error::MissingEndpoint`] only surfaces on direct misuse.
    pub fn new(nodes: Vec<SimNode>, links: &[LinkSpec], config: ForceConfig) -> Result<Self> {
        let mut id_index: FxHashMap<String, usize> = FxHashMap::default();
        for (i, n) in nodes.iter().enumerate() {
            id_index.entry(n.id.clone()).or_insert(i);
        }

        let mut degree = vec![0usize; nodes.len()];
        let mut resolved: Vec<(usize, usize, Option<f64>)> = Vec::with_capacity(links.len());
        for l in links {
            let (Some(&s), Some(&t)) = (id_index.get(&l.source), id_index.get(&l.target)) else {
                return Err(Error::MissingEndpoint {
                    source: l.source.clone(),
                    target: l.target.clone(),
                });
            };
            degree[s] += 1;
            degree[t] += 1;
            resolved.push((s, t, l.distance));
        }

        let edges: Vec<SimEdge> = resolved
            .into_iter()
            .map(|(s, t, dist)| {
                let ds = degree[s].max(1) as f64;
                let dt = degree[t].max(1) as f64;
                SimEdge {
                    source: s,
                    target: t,
                    distance: dist.unwrap_or(config.link_distance),
                    strength: config.link_strength.unwrap_or(1.0 / ds.min(dt)),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, n) in nodes.iter().enumerate() {
            if let Some(g) = n.group.as_ref() {
                groups.entry(g.clone()).or_default().push(i);
            }
        }

        let mut sim = Self {
            nodes,
            edges,
            id_index,
            groups,
            config,
            alpha: 1.0,
            alpha_min: Self::ALPHA_MIN,
            alpha_decay: 1.0 - Self::ALPHA_MIN.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: Self::VELOCITY_DECAY,
            rng: XorShift64Star::new(1),
        };
        sim.place_unset_nodes();
        Ok(sim)
    }

    // Deterministic phyllotaxis spiral for nodes that arrive without a
    // position, so initial frames don't stack everything at the origin.
    fn place_unset_nodes(&mut self) {
        let initial_angle = std::f64::consts::PI * (3.0 - 5.0f64.sqrt());
        for (i, n) in self.nodes.iter_mut().enumerate() {
            if n.x.is_finite() && n.y.is_finite() {
                continue;
            }
            let radius = Self::INITIAL_RADIUS * (0.5 + i as f64).sqrt();
            let angle = i as f64 * initial_angle;
            n.x = radius * angle.cos();
            n.y = radius * angle.sin();
            n.anchor_x = n.x;
            n.anchor_y = n.y;
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn set_alpha_decay(&mut self, decay: f64) {
        self.alpha_decay = decay.clamp(0.0, 1.0);
    }

    /// Raises the energy target and bumps alpha up to it immediately, the
    /// response to every external event (update, drag, filter, click).
    pub fn reheat(&mut self, target: f64) {
        let target = target.clamp(0.0, 1.0);
        self.alpha_target = target;
        self.alpha = self.alpha.max(target);
    }

    pub fn phase(&self) -> LayoutPhase {
        if self.alpha_target > self.alpha_min {
            LayoutPhase::Running
        } else if self.alpha >= self.alpha_min {
            LayoutPhase::Cooling
        } else {
            LayoutPhase::Settled
        }
    }

    /// Pins a node at `(x, y)`; physics stop moving it until [`unpin`](Self::unpin).
    pub fn pin(&mut self, index: usize, x: f64, y: f64) {
        if let Some(n) = self.nodes.get_mut(index) {
            n.fx = Some(x);
            n.fy = Some(y);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(n) = self.nodes.get_mut(index) {
            n.fx = None;
            n.fy = None;
        }
    }

    /// Advances the simulation one step: relax alpha toward its target,
    /// accumulate every active force into velocities, then integrate.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        if self.config.link {
            forces::apply_link(&mut self.nodes, &self.edges, self.alpha, &mut self.rng);
        }
        if self.config.anchor {
            forces::apply_anchor(&mut self.nodes, self.config.anchor_strength, self.alpha);
        }
        if self.config.many_body {
            forces::apply_many_body(
                &mut self.nodes,
                self.config.charge_strength,
                self.config.theta,
                self.alpha,
                &mut self.rng,
            );
        }
        if self.config.collide {
            forces::apply_collide(
                &mut self.nodes,
                self.config.collide_strength,
                self.config.collide_iterations,
                &mut self.rng,
            );
        }
        if self.config.cluster {
            forces::apply_cluster(
                &mut self.nodes,
                &self.groups,
                self.config.cluster_strength,
                self.alpha,
            );
        }

        for n in &mut self.nodes {
            match n.fx {
                Some(fx) => {
                    n.x = fx;
                    n.vx = 0.0;
                }
                None => {
                    n.vx *= self.velocity_decay;
                    n.x += n.vx;
                }
            }
            match n.fy {
                Some(fy) => {
                    n.y = fy;
                    n.vy = 0.0;
                }
                None => {
                    n.vy *= self.velocity_decay;
                    n.y += n.vy;
                }
            }
        }
    }
}

// xorshift64* keeps jiggle deterministic across runs; seeded layouts must be
// reproducible for the snapshot tests.
#[derive(Debug, Clone)]
pub(crate) struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    /// Maps to `[0, 1)` with 53 bits of precision.
    pub(crate) fn next_f64_unit(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }
}
