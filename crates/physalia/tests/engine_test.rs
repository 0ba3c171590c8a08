use physalia::{
    ClickOutcome, EdgeGeometry, EdgeRecord, Engine, EngineConfig, LayoutPhase, NodeRecord,
    PathGeometry, UpdateMode,
};

fn node(id: &str, category: &str) -> NodeRecord {
    NodeRecord::with_category(id, category)
}

fn energy_fixture() -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
    let nodes = vec![
        node("solar", "generation"),
        node("wind", "generation"),
        node("grid", "transmission"),
        node("storage", "transmission"),
        node("policy", "governance"),
        // Singleton: present in the entity list, no relations.
        node("methane", "emissions"),
    ];
    let edges = vec![
        EdgeRecord::new("solar", "grid"),
        EdgeRecord::new("wind", "grid"),
        EdgeRecord::new("grid", "storage"),
        EdgeRecord::new("policy", "solar"),
        EdgeRecord::new("policy", "wind"),
    ];
    (nodes, edges)
}

#[test]
fn update_annotates_and_places_every_node() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    assert_eq!(engine.nodes().len(), 6);
    assert_eq!(engine.edges().len(), 5);
    for s in engine.nodes() {
        assert!(s.x.is_finite() && s.y.is_finite(), "{} unplaced", s.id());
        assert!(s.radius >= 4.5 && s.radius <= 22.0);
    }
    let grid = engine.node("grid").expect("grid state");
    // grid has two inbound and one outbound relation.
    assert_eq!(grid.link_cnt, 3);
    let methane = engine.node("methane").expect("methane state");
    assert_eq!(methane.link_cnt, 0);
    assert!(methane.radius < grid.radius);
}

#[test]
fn tick_derives_edge_paths() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");
    engine.tick();
    for e in engine.edges() {
        let path = e.path.as_ref().expect("path after tick");
        assert!(!path.to_svg_path().contains("NaN"));
    }
}

#[test]
fn arc_geometry_config_produces_arcs() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig {
        edge_geometry: EdgeGeometry::Arc,
        ..EngineConfig::default()
    });
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");
    engine.tick();
    let has_arc = engine
        .edges()
        .iter()
        .filter_map(|e| e.path.as_ref())
        .any(|p| matches!(p, PathGeometry::Arc { .. }));
    assert!(has_arc, "expected at least one arc path");
}

#[test]
fn append_update_rededuplicates_against_the_working_set() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    // Re-send an existing node (different category) plus a new one and a
    // duplicate edge: the originals must win, the new records must land.
    let more_nodes = vec![node("grid", "changed"), node("hydrogen", "generation")];
    let more_edges = vec![
        EdgeRecord::new("solar", "grid"),
        EdgeRecord::new("hydrogen", "grid"),
    ];
    engine
        .update(&more_nodes, &more_edges, UpdateMode::Append)
        .expect("append");

    assert_eq!(engine.nodes().len(), 7);
    assert_eq!(engine.edges().len(), 6);
    let grid = engine.node("grid").expect("grid");
    assert_eq!(grid.record.category.as_deref(), Some("transmission"));
}

#[test]
fn surviving_nodes_keep_their_positions_across_updates() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");
    for _ in 0..10 {
        engine.tick();
    }
    let before = {
        let s = engine.node("solar").expect("solar");
        (s.x, s.y)
    };
    engine
        .update(&[node("hydrogen", "generation")], &[], UpdateMode::Append)
        .expect("append");
    let after = engine.node("solar").expect("solar");
    assert_eq!((after.x, after.y), before);
}

#[test]
fn queries_degrade_to_not_found_on_unknown_ids() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    assert_eq!(engine.shortest_path("solar", "ghost"), None);
    assert!(engine.neighbors("ghost").is_empty());
    assert_eq!(engine.click("ghost"), ClickOutcome::Ignored);
}

#[test]
fn shortest_path_flows_through_the_engine() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    assert_eq!(
        engine.shortest_path("policy", "storage"),
        Some(vec![
            "policy".to_string(),
            "solar".to_string(),
            "grid".to_string(),
            "storage".to_string()
        ])
    );
    // Relations all point away from storage.
    assert_eq!(engine.shortest_path("storage", "policy"), None);
}

#[test]
fn singleton_filtering_marks_only_disconnected_nodes() {
    let (mut nodes, mut edges) = energy_fixture();
    nodes.push(node("flare", "emissions"));
    edges.push(EdgeRecord::new("flare", "flare"));
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    let singles = engine.singletons();
    assert!(singles.contains("methane"));
    // A self-loop-only node is still a singleton.
    assert!(singles.contains("flare"));
    assert!(!singles.contains("grid"));

    engine.set_singletons_hidden(true);
    assert!(engine.node("methane").expect("methane").hidden);
    assert!(!engine.node("grid").expect("grid").hidden);
    engine.set_singletons_hidden(false);
    assert!(!engine.node("methane").expect("methane").hidden);
}

#[test]
fn search_is_case_insensitive_and_sorted() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    assert_eq!(engine.search("SOL"), vec!["solar".to_string()]);
    let all = engine.search("");
    assert_eq!(all.len(), 6);
    let mut sorted = all.clone();
    sorted.sort();
    assert_eq!(all, sorted);
}

#[test]
fn drag_pins_then_releases_a_node() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    assert!(engine.drag_start("wind"));
    assert!(engine.drag_move("wind", 40.0, -25.0));
    for _ in 0..5 {
        engine.tick();
    }
    let wind = engine.node("wind").expect("wind");
    assert_eq!((wind.x, wind.y), (40.0, -25.0));
    assert_eq!(engine.phase(), LayoutPhase::Running);

    assert!(engine.drag_end("wind"));
    let wind = engine.node("wind").expect("wind");
    assert_eq!(wind.fx, None);
    assert!(!engine.drag_start("ghost"));
}

#[test]
fn click_flow_follows_the_interaction_mode() {
    let (nodes, edges) = energy_fixture();
    let mut engine = Engine::new(EngineConfig::default());
    engine.update(&nodes, &edges, UpdateMode::Replace).expect("update");

    engine.begin_neighbor_browse();
    let ClickOutcome::Highlight(set) = engine.click("policy") else {
        panic!("expected highlight");
    };
    // Outbound, depth 2: policy -> {solar, wind} -> grid.
    assert!(set.contains("policy") && set.contains("solar") && set.contains("grid"));
    assert!(!set.contains("storage"));

    engine.begin_path_pick();
    assert_eq!(
        engine.click("policy"),
        ClickOutcome::AwaitSecond {
            first: "policy".to_string()
        }
    );
    let ClickOutcome::Path(path) = engine.click("grid") else {
        panic!("expected a path");
    };
    assert_eq!(path.first().map(String::as_str), Some("policy"));
    assert_eq!(path.last().map(String::as_str), Some("grid"));

    engine.reset();
    assert_eq!(engine.click("policy"), ClickOutcome::Ignored);
}
