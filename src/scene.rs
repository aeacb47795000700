//! One live layout per displayed graph.
//!
//! Replacing the graph stops the running simulation before the next one is
//! created, so ticks scheduled against the old graph can never move the new
//! one. Callers hold a [`SimulationToken`] and present it on every drive; a
//! token from an earlier generation is rejected.

use std::sync::Arc;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::StaleSimulation;
use crate::interaction::{InteractionState, PointerEvent};
use crate::model::Graph;
use crate::physics::{LayoutSnapshot, Simulation, SimulationStatus, TickDriver};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SimulationToken {
    generation: u64,
}

impl SimulationToken {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

pub struct Scene {
    config: LayoutConfig,
    generation: u64,
    simulation: Simulation,
    interaction: InteractionState,
}

impl Scene {
    pub fn new(graph: impl Into<Arc<Graph>>, config: LayoutConfig) -> Self {
        Self {
            simulation: Simulation::new(graph.into(), config),
            config,
            generation: 0,
            interaction: InteractionState::default(),
        }
    }

    pub fn graph(&self) -> &Arc<Graph> {
        self.simulation.graph()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn token(&self) -> SimulationToken {
        SimulationToken {
            generation: self.generation,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.simulation.snapshot()
    }

    /// Swaps in a new graph. Nodes whose id survives keep their position;
    /// hover state is dropped because it may point at removed elements.
    pub fn replace_graph(&mut self, graph: impl Into<Arc<Graph>>) -> SimulationToken {
        self.simulation.stop();
        let carried = self.simulation.positions_by_id();
        let graph = graph.into();

        let reused = graph
            .nodes()
            .iter()
            .filter(|node| carried.contains_key(&node.id))
            .count();

        self.simulation =
            Simulation::with_seed_positions(Arc::clone(&graph), self.config, &carried);
        self.interaction.reset();
        self.generation += 1;

        debug!(
            generation = self.generation,
            nodes = graph.node_count(),
            links = graph.link_count(),
            reused,
            "graph replaced"
        );
        self.token()
    }

    /// Restarts the current graph under a new layout config. Positions carry
    /// over; outstanding tokens become stale.
    pub fn reconfigure(&mut self, config: LayoutConfig) -> SimulationToken {
        self.config = config;
        let graph = Arc::clone(self.simulation.graph());
        self.replace_graph(graph)
    }

    /// Reheats the current layout. Outstanding tokens stay valid.
    pub fn restart_layout(&mut self) {
        self.simulation.reheat();
    }

    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    pub fn tick(&mut self, token: SimulationToken) -> Result<SimulationStatus, StaleSimulation> {
        self.check(token)?;
        Ok(self.simulation.tick())
    }

    pub fn drive<D: TickDriver + ?Sized>(
        &mut self,
        token: SimulationToken,
        driver: &mut D,
    ) -> Result<SimulationStatus, StaleSimulation> {
        self.check(token)?;
        Ok(self.simulation.drive(driver))
    }

    /// Routes a pointer event to the hover machine. Returns `true` when the
    /// hovered element changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let graph = Arc::clone(self.simulation.graph());
        self.interaction.apply(&graph, event)
    }

    fn check(&self, token: SimulationToken) -> Result<(), StaleSimulation> {
        if token.generation == self.generation {
            Ok(())
        } else {
            Err(StaleSimulation {
                token: token.generation,
                current: self.generation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;
    use serde_json::json;

    use super::*;
    use crate::interaction::{Hover, HoverTarget};
    use crate::model::{NodeId, build_graph};
    use crate::physics::ManualSteps;

    fn graph(ids: &[u32]) -> Graph {
        let characters = ids
            .iter()
            .map(|id| json!({ "id": id, "common_name": format!("N{id}") }))
            .collect::<Vec<_>>();
        build_graph(&json!({ "characters": characters, "relations": [] }))
            .unwrap()
            .graph
    }

    #[test]
    fn stale_token_is_rejected_after_replacement() {
        let mut scene = Scene::new(graph(&[1, 2]), LayoutConfig::default());
        let old = scene.token();
        scene.tick(old).unwrap();

        let new = scene.replace_graph(graph(&[3]));
        assert_eq!(
            scene.drive(old, &mut ManualSteps::new(5)),
            Err(StaleSimulation {
                token: 0,
                current: 1,
            })
        );
        assert_eq!(scene.simulation().ticks(), 0);

        scene.drive(new, &mut ManualSteps::new(5)).unwrap();
        assert_eq!(scene.simulation().ticks(), 5);
    }

    #[test]
    fn surviving_nodes_keep_their_positions() {
        let mut scene = Scene::new(graph(&[1, 2]), LayoutConfig::default());
        let token = scene.token();
        scene.drive(token, &mut ManualSteps::new(40)).unwrap();
        let before = scene.simulation().positions_by_id();

        scene.replace_graph(graph(&[2, 9]));
        let index = scene.graph().index_of(&NodeId::new("2")).unwrap();
        assert_eq!(
            scene.simulation().position(index),
            before.get(&NodeId::new("2")).copied()
        );
    }

    #[test]
    fn replacement_resets_hover() {
        let mut scene = Scene::new(graph(&[1]), LayoutConfig::default());
        scene.handle_pointer(PointerEvent::Enter {
            target: HoverTarget::Node(NodeId::new("1")),
            at: pos2(0.0, 0.0),
        });
        assert_eq!(scene.interaction().hover(), &Hover::Node(NodeId::new("1")));

        scene.replace_graph(graph(&[1]));
        assert!(scene.interaction().is_idle());
        assert!(scene.interaction().tooltip().is_none());
    }

    #[test]
    fn reconfigure_restarts_with_new_config() {
        let mut scene = Scene::new(graph(&[1, 2]), LayoutConfig::default());
        let old = scene.token();
        let config = LayoutConfig {
            collision_radius: 18.0,
            ..LayoutConfig::default()
        };

        let new = scene.reconfigure(config);
        assert_ne!(old, new);
        assert_eq!(scene.config().collision_radius, 18.0);
        assert_eq!(scene.simulation().config().collision_radius, 18.0);
        assert!(scene.tick(old).is_err());
        assert_eq!(scene.graph().node_count(), 2);
    }

    #[test]
    fn restart_layout_keeps_token_valid() {
        let mut scene = Scene::new(graph(&[1, 2]), LayoutConfig::default());
        let token = scene.token();
        scene.stop();
        assert_eq!(scene.tick(token), Ok(SimulationStatus::Stopped));

        scene.restart_layout();
        assert_eq!(scene.tick(token), Ok(SimulationStatus::Running));
    }
}
