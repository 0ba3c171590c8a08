//! Interaction modes as an explicit state machine.
//!
//! The production UI tracked its modes in a pile of ambient booleans
//! (`clickedSP`, `clickedNN`, `searched`, a click counter). Here every mode
//! is a state with defined entry/exit transitions, and a click is a pure
//! function of (state, graph, clicked id) returning what the renderer should
//! do next.

use physalia_graph::{Direction, Graph, alg};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Clicking a node highlights its bounded neighborhood.
    NeighborBrowse,
    /// Two clicks pick shortest-path endpoints; the first click is the path
    /// source.
    PathPick,
    /// A search drives the view; node clicks are inert until reset.
    Search,
}

/// What a node click means to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing to do (idle/search mode, unknown id, or a pick was cleared).
    Ignored,
    /// Highlight this membership set.
    Highlight(BTreeSet<String>),
    /// First path endpoint chosen; waiting for the second.
    AwaitSecond { first: String },
    /// Shortest path found, in order from the first-clicked node.
    Path(Vec<String>),
    /// No directed path between the picks; the view shows a retry message.
    NoPath { from: String, to: String },
}

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    mode: Mode,
    first_pick: Option<String>,
    query: String,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// First shortest-path endpoint, if one is picked.
    pub fn first_pick(&self) -> Option<&str> {
        self.first_pick.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The browse/path buttons are mutually exclusive: entering either mode
    /// leaves the other and abandons a half-finished pick.
    pub fn begin_neighbor_browse(&mut self) {
        self.mode = Mode::NeighborBrowse;
        self.first_pick = None;
        self.query.clear();
    }

    pub fn begin_path_pick(&mut self) {
        self.mode = Mode::PathPick;
        self.first_pick = None;
        self.query.clear();
    }

    pub fn begin_search(&mut self, query: impl Into<String>) {
        self.mode = Mode::Search;
        self.first_pick = None;
        self.query = query.into();
    }

    /// Back to idle, clearing picks and the search query.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn click(
        &mut self,
        graph: &Graph,
        depth: usize,
        dir: Direction,
        id: &str,
    ) -> ClickOutcome {
        if !graph.has_node(id) {
            return ClickOutcome::Ignored;
        }
        match self.mode {
            Mode::Idle | Mode::Search => ClickOutcome::Ignored,
            Mode::NeighborBrowse => {
                ClickOutcome::Highlight(alg::neighborhood(graph, id, depth, dir))
            }
            Mode::PathPick => match self.first_pick.take() {
                None => {
                    self.first_pick = Some(id.to_string());
                    ClickOutcome::AwaitSecond {
                        first: id.to_string(),
                    }
                }
                // Clicking the picked node again unpicks it.
                Some(first) if first == id => ClickOutcome::Ignored,
                Some(first) => match alg::shortest_path(graph, &first, id) {
                    Some(path) => ClickOutcome::Path(path),
                    None => ClickOutcome::NoPath {
                        from: first,
                        to: id.to_string(),
                    },
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClickOutcome, Interaction, Mode};
    use physalia_graph::{Direction, Graph};

    fn triangle() -> Graph {
        Graph::build(
            ["a", "b", "c"],
            [("a", "b"), ("b", "c"), ("a", "c")],
        )
    }

    #[test]
    fn idle_clicks_are_inert() {
        let g = triangle();
        let mut ix = Interaction::new();
        assert_eq!(
            ix.click(&g, 2, Direction::Outbound, "a"),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn first_click_is_the_path_source() {
        let g = triangle();
        let mut ix = Interaction::new();
        ix.begin_path_pick();
        assert_eq!(
            ix.click(&g, 2, Direction::Outbound, "a"),
            ClickOutcome::AwaitSecond {
                first: "a".to_string()
            }
        );
        let outcome = ix.click(&g, 2, Direction::Outbound, "c");
        assert_eq!(
            outcome,
            ClickOutcome::Path(vec!["a".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn unreachable_pick_reports_no_path_and_allows_retry() {
        let g = triangle();
        let mut ix = Interaction::new();
        ix.begin_path_pick();
        ix.click(&g, 2, Direction::Outbound, "c");
        let outcome = ix.click(&g, 2, Direction::Outbound, "a");
        assert_eq!(
            outcome,
            ClickOutcome::NoPath {
                from: "c".to_string(),
                to: "a".to_string()
            }
        );
        // The pick was consumed; the next click starts a fresh pair.
        assert_eq!(ix.first_pick(), None);
    }

    #[test]
    fn clicking_the_same_node_unpicks_it() {
        let g = triangle();
        let mut ix = Interaction::new();
        ix.begin_path_pick();
        ix.click(&g, 2, Direction::Outbound, "b");
        assert_eq!(
            ix.click(&g, 2, Direction::Outbound, "b"),
            ClickOutcome::Ignored
        );
        assert_eq!(ix.first_pick(), None);
    }

    #[test]
    fn neighbor_browse_highlights_the_neighborhood() {
        let g = triangle();
        let mut ix = Interaction::new();
        ix.begin_neighbor_browse();
        let ClickOutcome::Highlight(set) = ix.click(&g, 1, Direction::Outbound, "a") else {
            panic!("expected a highlight");
        };
        assert!(set.contains("a") && set.contains("b") && set.contains("c"));
    }

    #[test]
    fn mode_switches_abandon_half_finished_picks() {
        let g = triangle();
        let mut ix = Interaction::new();
        ix.begin_path_pick();
        ix.click(&g, 2, Direction::Outbound, "a");
        ix.begin_neighbor_browse();
        assert_eq!(ix.first_pick(), None);
        assert_eq!(ix.mode(), Mode::NeighborBrowse);
    }

    #[test]
    fn search_mode_disables_clicks_until_reset() {
        let g = triangle();
        let mut ix = Interaction::new();
        ix.begin_search("sol");
        assert_eq!(
            ix.click(&g, 2, Direction::Outbound, "a"),
            ClickOutcome::Ignored
        );
        ix.reset();
        assert_eq!(ix.mode(), Mode::Idle);
        assert_eq!(ix.query(), "");
    }
}
