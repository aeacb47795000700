use plot_graph::error::{GraphError, GraphWarning};
use plot_graph::model::{NodeId, build_graph, parse_graph};
use serde_json::json;

const HAMLET: &str = r#"{
    "summary": "A prince avenges his father.",
    "characters": [
        {
            "id": 1, "common_name": "Hamlet", "main_character": true,
            "names": ["Prince Hamlet"], "traits": ["melancholic"],
            "description": "Prince of Denmark"
        },
        { "id": 2, "common_name": "Horatio", "description": "Hamlet's friend" },
        { "id": "3", "common_name": "Ophelia" }
    ],
    "relations": [
        { "id1": 1, "id2": 2, "weight": 8, "id1_to_id2_role": "friend", "id2_to_id1_role": "friend",
          "key_dialogs": ["Good night, sweet prince"] },
        { "id1": 1, "id2": 3, "weight": 5 },
        { "id1": 2, "id2": 42, "weight": 1 }
    ],
    "validation": { "known_story": true, "issues": [], "notes": "Matches the play.", "score": 9 }
}"#;

#[test]
fn every_link_resolves_to_a_node() {
    let report = parse_graph(HAMLET).unwrap();
    let graph = &report.graph;

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.link_count(), 2);
    for link in graph.links() {
        assert_eq!(graph.node(link.source_index()).map(|node| &node.id), Some(&link.source_id));
        assert_eq!(graph.node(link.target_index()).map(|node| &node.id), Some(&link.target_id));
    }

    assert_eq!(
        report.warnings,
        vec![GraphWarning::DanglingReference {
            relation: 2,
            source_id: "2".to_owned(),
            target_id: "42".to_owned(),
            missing: "42".to_owned(),
        }]
    );
}

#[test]
fn building_twice_gives_equal_graphs() {
    let first = parse_graph(HAMLET).unwrap().graph;
    let second = parse_graph(HAMLET).unwrap().graph;
    assert_eq!(first, second);
}

#[test]
fn numeric_and_string_ids_share_one_namespace() {
    let graph = parse_graph(HAMLET).unwrap().graph;
    let ophelia = graph.node_by_id(&NodeId::new("3")).unwrap();
    assert_eq!(ophelia.label, "Ophelia");
    assert_eq!(graph.neighbours(graph.index_of(&NodeId::new("3")).unwrap()).count(), 1);
}

#[test]
fn document_extras_are_kept() {
    let graph = parse_graph(HAMLET).unwrap().graph;
    assert_eq!(graph.summary(), "A prince avenges his father.");
    let validation = graph.validation().unwrap();
    assert!(validation.known_story);
    assert_eq!(validation.score, Some(9));
    assert_eq!(validation.notes, "Matches the play.");
}

#[test]
fn missing_collections_are_invalid_input() {
    for document in [
        json!({ "relations": [] }),
        json!({ "characters": [] }),
        json!({ "characters": {}, "relations": [] }),
        json!([]),
    ] {
        assert!(matches!(build_graph(&document), Err(GraphError::InvalidInput { .. })));
    }
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(parse_graph("{ characters: "), Err(GraphError::Json(_))));
}

#[test]
fn empty_document_builds_an_empty_graph() {
    let report = build_graph(&json!({ "characters": [], "relations": [] })).unwrap();
    assert!(report.graph.is_empty());
    assert!(report.warnings.is_empty());
}
