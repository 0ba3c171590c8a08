#![forbid(unsafe_code)]

//! Directed graph index and traversal queries used by `physalia`.
//!
//! The [`Graph`] container is the topology substrate behind connectivity
//! annotation, neighborhood expansion, and shortest-path queries. It is
//! rebuilt from scratch on every snapshot update and never mutated by the
//! query side.

pub mod alg;
mod graph;

pub use alg::Direction;
pub use graph::{EdgeKey, Graph};
