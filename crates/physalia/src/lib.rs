#![forbid(unsafe_code)]

//! Headless engine for interactive force-directed node-link graphs.
//!
//! The pipeline: raw [`NodeRecord`]/[`EdgeRecord`] sequences are
//! [reconciled](reconcile::reconcile) into a deduplicated snapshot, annotated
//! with connectivity/radius/color/label geometry, indexed into a
//! [`Graph`](physalia_graph::Graph), and laid out by the incremental force
//! simulation. The rendering collaborator reads [`NodeState`]/[`EdgeState`]
//! after each [`Engine::tick`] and calls the query operations (neighbors,
//! shortest path, search, singleton filtering) on user events.
//!
//! Everything DOM/SVG-shaped — element construction, attribute binding,
//! tooltips, fetch — lives outside this workspace.

pub mod annotate;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod reconcile;
pub mod record;
pub mod text;

pub use annotate::{ConnectivityPolicy, EdgeState, NodeState, radius_scale};
pub use engine::{EdgeGeometry, Engine, EngineConfig};
pub use error::{Error, Result};
pub use interaction::{ClickOutcome, Interaction, Mode};
pub use reconcile::{Snapshot, UpdateMode, reconcile};
pub use record::{DEFAULT_PALETTE, EdgeRecord, NodeRecord, Rgb};

pub use physalia_graph::{Direction, Graph, alg};
pub use physalia_sim::{ForceConfig, LayoutPhase, PathGeometry};
