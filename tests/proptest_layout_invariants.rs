//! Property-based invariants for converged layouts over random small graphs:
//!
//! 1. Every node rests inside the canvas minus its own margins.
//! 2. No two nodes overlap by more than a small tolerance.
//! 3. The residual force at rest is small.

use std::sync::Arc;

use plot_graph::config::LayoutConfig;
use plot_graph::geometry::NodeFootprint;
use plot_graph::model::{Graph, build_graph};
use plot_graph::physics::{Simulation, clamp_point};
use proptest::prelude::*;
use serde_json::json;

const OVERLAP_TOLERANCE: f32 = 2.0;

fn graph_strategy() -> impl Strategy<Value = Arc<Graph>> {
    (1usize..=8)
        .prop_flat_map(|nodes| {
            (
                Just(nodes),
                prop::collection::vec((0..nodes, 0..nodes, 1u8..=10), 0..=nodes * 2),
                prop::collection::vec("[A-Z][a-z]{0,9}", nodes),
            )
        })
        .prop_map(|(nodes, relations, names)| {
            let characters = (0..nodes)
                .map(|id| json!({ "id": id, "common_name": names[id] }))
                .collect::<Vec<_>>();
            let relations = relations
                .iter()
                .map(|(a, b, weight)| json!({ "id1": a, "id2": b, "weight": weight }))
                .collect::<Vec<_>>();
            let report =
                build_graph(&json!({ "characters": characters, "relations": relations }))
                    .expect("generated documents are well formed");
            Arc::new(report.graph)
        })
}

fn settle(graph: &Arc<Graph>) -> Simulation {
    let mut simulation = Simulation::new(Arc::clone(graph), LayoutConfig::default());
    simulation.run_to_convergence();
    simulation
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn nodes_rest_inside_their_margins(graph in graph_strategy()) {
        let simulation = settle(&graph);
        let config = simulation.config();

        for (index, node) in graph.nodes().iter().enumerate() {
            let margins = NodeFootprint::for_label(&node.label).margins(config.collision_radius);
            let position = simulation.position(index).unwrap();
            prop_assert_eq!(
                clamp_point(position, margins, config.canvas),
                position,
                "{} escaped its margins", node.label
            );
        }
    }

    #[test]
    fn nodes_do_not_overlap(graph in graph_strategy()) {
        let simulation = settle(&graph);
        let minimum = simulation.config().collision_radius * 2.0 - OVERLAP_TOLERANCE;
        let positions = simulation.snapshot().positions;

        for (first, a) in positions.iter().enumerate() {
            for b in &positions[first + 1..] {
                prop_assert!(a.distance(*b) >= minimum, "{:?} and {:?} overlap", a, b);
            }
        }
    }

    #[test]
    fn residual_force_is_small_at_rest(graph in graph_strategy()) {
        let simulation = settle(&graph);
        prop_assert!(simulation.status().is_finished());
        prop_assert!(simulation.max_net_force() < 1.0);
    }
}
