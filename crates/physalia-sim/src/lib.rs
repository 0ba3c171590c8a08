#![forbid(unsafe_code)]

//! Headless incremental force simulation for node-link layouts.
//!
//! `physalia-sim` is runtime-agnostic: the host scheduler (an animation-frame
//! loop in practice) calls [`Simulation::tick`] once per frame and reads node
//! positions back. Edge path geometry lives in [`geometry`] as pure functions
//! over the resolved endpoint positions.

pub mod error;
pub mod geometry;

mod forces;
mod quadtree;
mod sim;

pub use error::{Error, Result};
pub use geometry::{EdgeEnds, PathGeometry, Point};
pub use sim::{ForceConfig, LayoutPhase, LinkSpec, SimNode, Simulation};
