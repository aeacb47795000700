//! Force-directed layout.
//!
//! Each tick decays `alpha`, accumulates velocity changes from the link,
//! many-body, centering and collision forces, integrates, and clamps every node
//! back into the canvas. Link, many-body and centering forces scale with
//! `alpha`; collision does not, so overlaps keep being corrected while the
//! layout cools.

mod clamp;
mod driver;
mod forces;
mod quadtree;

use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui::{Pos2, Vec2, vec2};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::geometry::NodeFootprint;
use crate::model::{Graph, NodeId};
use crate::util::stable_pair;

pub use clamp::clamp_point;
pub use driver::{FrameClock, ManualSteps, TickDriver};
use forces::{ChargeParams, Spring, apply_centering, apply_springs, charge_impulse, collide_body};
use quadtree::{Bodies, QuadTree};

const DISTANCE_MIN_SQ: f32 = 1.0;
const GOLDEN_ANGLE: f32 = 2.399_963_2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationStatus {
    Running,
    Converged,
    TickCapReached,
    Stopped,
}

impl SimulationStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Read-only copy of the layout between ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSnapshot {
    pub positions: Vec<Pos2>,
    pub alpha: f32,
    pub ticks: usize,
    pub status: SimulationStatus,
}

#[derive(Default)]
struct PhysicsScratch {
    impulses: Vec<Vec2>,
    predicted: Vec<Vec2>,
    pending: Vec<usize>,
}

/// Owns the position and velocity buffers for one graph for one run.
pub struct Simulation {
    graph: Arc<Graph>,
    config: LayoutConfig,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    margins: Vec<Vec2>,
    radii: Vec<f32>,
    charges: Vec<f32>,
    springs: Vec<Spring>,
    alpha: f32,
    ticks: usize,
    status: SimulationStatus,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub fn new(graph: Arc<Graph>, config: LayoutConfig) -> Self {
        Self::with_seed_positions(graph, config, &HashMap::new())
    }

    /// Nodes found in `seeds` start where they were; the rest start near the
    /// canvas centre on a jittered spiral.
    pub fn with_seed_positions(
        graph: Arc<Graph>,
        config: LayoutConfig,
        seeds: &HashMap<NodeId, Pos2>,
    ) -> Self {
        let node_count = graph.node_count();
        let center = config.canvas.center().to_vec2();

        let margins = graph
            .nodes()
            .iter()
            .map(|node| NodeFootprint::for_label(&node.label).margins(config.collision_radius))
            .collect::<Vec<_>>();

        let mut positions = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| match seeds.get(&node.id) {
                Some(seed) if seed.x.is_finite() && seed.y.is_finite() => seed.to_vec2(),
                _ => center + seed_offset(index, node.id.as_str(), config.seed_jitter),
            })
            .collect::<Vec<_>>();
        let mut velocities = vec![Vec2::ZERO; node_count];
        clamp::clamp_to_canvas(&mut positions, &mut velocities, &margins, config.canvas);

        let springs = build_springs(&graph);
        let status = if node_count == 0 {
            SimulationStatus::Converged
        } else {
            SimulationStatus::Running
        };

        Self {
            radii: vec![config.collision_radius; node_count],
            charges: vec![config.charge_strength; node_count],
            graph,
            config,
            positions,
            velocities,
            margins,
            springs,
            alpha: 1.0,
            ticks: 0,
            status,
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn position(&self, index: usize) -> Option<Pos2> {
        self.positions.get(index).map(|position| position.to_pos2())
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            positions: self.positions.iter().map(|position| position.to_pos2()).collect(),
            alpha: self.alpha,
            ticks: self.ticks,
            status: self.status,
        }
    }

    pub fn positions_by_id(&self) -> HashMap<NodeId, Pos2> {
        self.graph
            .nodes()
            .iter()
            .zip(&self.positions)
            .map(|(node, position)| (node.id.clone(), position.to_pos2()))
            .collect()
    }

    /// Halts the run; later ticks are no-ops until [`Simulation::reheat`].
    pub fn stop(&mut self) {
        if !self.status.is_finished() {
            debug!(ticks = self.ticks, "simulation stopped");
        }
        self.status = SimulationStatus::Stopped;
    }

    /// Restarts a cooled or stopped layout from the current positions.
    pub fn reheat(&mut self) {
        if self.positions.is_empty() {
            return;
        }
        self.alpha = 1.0;
        self.ticks = 0;
        self.status = SimulationStatus::Running;
    }

    pub fn tick(&mut self) -> SimulationStatus {
        if self.status.is_finished() {
            return self.status;
        }

        self.alpha *= 1.0 - self.config.alpha_decay;

        let forces = ForceContext {
            springs: &self.springs,
            positions: &self.positions,
            radii: &self.radii,
            charges: &self.charges,
            config: &self.config,
            alpha: self.alpha,
        };
        forces.apply(&mut self.velocities, &mut self.scratch);

        let retain = 1.0 - self.config.velocity_decay;
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *velocity *= retain;
            *position += *velocity * self.config.time_step;
        }
        clamp::clamp_to_canvas(
            &mut self.positions,
            &mut self.velocities,
            &self.margins,
            self.config.canvas,
        );

        self.ticks += 1;
        if self.alpha < self.config.alpha_min {
            self.status = SimulationStatus::Converged;
            debug!(ticks = self.ticks, alpha = self.alpha, "simulation converged");
        } else if self.ticks >= self.config.max_ticks {
            self.status = SimulationStatus::TickCapReached;
            debug!(ticks = self.ticks, alpha = self.alpha, "simulation hit the tick cap");
        }
        self.status
    }

    /// Runs as many ticks as the driver releases, stopping early once finished.
    pub fn drive<D: TickDriver + ?Sized>(&mut self, driver: &mut D) -> SimulationStatus {
        let due = driver.ticks_due();
        for _ in 0..due {
            if self.tick().is_finished() {
                break;
            }
        }
        self.status
    }

    pub fn run_to_convergence(&mut self) -> SimulationStatus {
        while !self.tick().is_finished() {}
        self.status
    }

    /// Largest per-node velocity change the forces would apply at the current
    /// alpha. Near zero once the layout is at rest.
    pub fn max_net_force(&self) -> f32 {
        let mut velocities = self.velocities.clone();
        self.forces().apply(&mut velocities, &mut PhysicsScratch::default());

        velocities
            .iter()
            .zip(&self.velocities)
            .map(|(after, before)| (*after - *before).length())
            .fold(0.0, f32::max)
    }

    fn forces(&self) -> ForceContext<'_> {
        ForceContext {
            springs: &self.springs,
            positions: &self.positions,
            radii: &self.radii,
            charges: &self.charges,
            config: &self.config,
            alpha: self.alpha,
        }
    }
}

struct ForceContext<'a> {
    springs: &'a [Spring],
    positions: &'a [Vec2],
    radii: &'a [f32],
    charges: &'a [f32],
    config: &'a LayoutConfig,
    alpha: f32,
}

impl ForceContext<'_> {
    fn apply(&self, velocities: &mut [Vec2], scratch: &mut PhysicsScratch) {
        let node_count = self.positions.len();
        if node_count == 0 {
            return;
        }

        apply_springs(
            self.springs,
            self.positions,
            velocities,
            self.config.link_distance,
            self.alpha,
        );

        if node_count > 1 {
            self.apply_charges(velocities, scratch);
        }

        apply_centering(
            self.positions,
            velocities,
            self.config.canvas.center().to_vec2(),
            self.config.center_strength,
            self.alpha,
        );

        if node_count > 1 {
            self.apply_collisions(velocities, scratch);
        }
    }

    fn apply_charges(&self, velocities: &mut [Vec2], scratch: &mut PhysicsScratch) {
        let bodies = Bodies {
            points: self.positions,
            charges: self.charges,
            radii: self.radii,
        };
        if self.charges.iter().all(|charge| *charge == 0.0) {
            return;
        }
        let Some(tree) = QuadTree::build(bodies) else {
            return;
        };

        let params = ChargeParams {
            alpha: self.alpha,
            theta_sq: self.config.theta * self.config.theta,
            distance_min_sq: DISTANCE_MIN_SQ,
        };
        for (index, velocity) in velocities.iter_mut().enumerate() {
            *velocity += charge_impulse(&tree, index, bodies, params, &mut scratch.pending);
        }
    }

    fn apply_collisions(&self, velocities: &mut [Vec2], scratch: &mut PhysicsScratch) {
        if self.config.collision_strength <= 0.0
            || self.radii.iter().all(|radius| *radius <= 0.0)
        {
            return;
        }

        for _ in 0..self.config.collision_iterations {
            scratch.predicted.clear();
            scratch.predicted.extend(
                self.positions
                    .iter()
                    .zip(velocities.iter())
                    .map(|(position, velocity)| *position + *velocity),
            );
            scratch.impulses.clear();
            scratch.impulses.resize(velocities.len(), Vec2::ZERO);

            let bodies = Bodies {
                points: &scratch.predicted,
                charges: self.charges,
                radii: self.radii,
            };
            let Some(tree) = QuadTree::build(bodies) else {
                return;
            };
            for index in 0..velocities.len() {
                collide_body(
                    &tree,
                    index,
                    bodies,
                    self.config.collision_strength,
                    &mut scratch.impulses,
                    &mut scratch.pending,
                );
            }

            for (velocity, impulse) in velocities.iter_mut().zip(&scratch.impulses) {
                *velocity += *impulse;
            }
        }
    }
}

fn seed_offset(index: usize, key: &str, jitter: f32) -> Vec2 {
    let radius = jitter * (0.5 + index as f32).sqrt();
    let angle = index as f32 * GOLDEN_ANGLE;
    let (jx, jy) = stable_pair(key);
    vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy) * (jitter * 0.25)
}

fn build_springs(graph: &Graph) -> Vec<Spring> {
    let mut degree = vec![0usize; graph.node_count()];
    for link in graph.links() {
        if link.is_self_loop() {
            continue;
        }
        degree[link.source_index()] += 1;
        degree[link.target_index()] += 1;
    }

    graph
        .links()
        .iter()
        .filter(|link| !link.is_self_loop())
        .map(|link| {
            let source_degree = degree[link.source_index()] as f32;
            let target_degree = degree[link.target_index()] as f32;
            Spring {
                source: link.source_index(),
                target: link.target_index(),
                strength: 1.0 / source_degree.min(target_degree),
                bias: source_degree / (source_degree + target_degree),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::build_graph;

    fn graph(characters: usize, relations: &[(usize, usize)]) -> Arc<Graph> {
        let characters = (0..characters)
            .map(|id| json!({ "id": id, "common_name": format!("C{id}") }))
            .collect::<Vec<_>>();
        let relations = relations
            .iter()
            .map(|(a, b)| json!({ "id1": a, "id2": b, "weight": 3 }))
            .collect::<Vec<_>>();
        let report =
            build_graph(&json!({ "characters": characters, "relations": relations })).unwrap();
        Arc::new(report.graph)
    }

    #[test]
    fn empty_graph_converges_immediately() {
        let mut simulation = Simulation::new(graph(0, &[]), LayoutConfig::default());
        assert_eq!(simulation.status(), SimulationStatus::Converged);
        assert_eq!(simulation.tick(), SimulationStatus::Converged);
        assert_eq!(simulation.ticks(), 0);
        assert!(simulation.snapshot().positions.is_empty());
    }

    #[test]
    fn seeds_start_near_centre() {
        let simulation = Simulation::new(graph(5, &[]), LayoutConfig::default());
        let center = LayoutConfig::default().canvas.center();
        for position in simulation.snapshot().positions {
            assert!(position.distance(center) < 40.0);
        }
    }

    #[test]
    fn seed_positions_are_reused() {
        let graph = graph(2, &[(0, 1)]);
        let mut seeds = HashMap::new();
        seeds.insert(NodeId::new("1"), Pos2::new(200.0, 150.0));
        let simulation = Simulation::with_seed_positions(graph, LayoutConfig::default(), &seeds);
        assert_eq!(simulation.position(1), Some(Pos2::new(200.0, 150.0)));
    }

    #[test]
    fn converges_before_tick_cap() {
        let graph = graph(6, &[(0, 1), (1, 2), (2, 0), (3, 4)]);
        let mut simulation = Simulation::new(graph, LayoutConfig::default());
        assert_eq!(simulation.run_to_convergence(), SimulationStatus::Converged);
        assert!(simulation.ticks() < LayoutConfig::default().max_ticks);
        assert!(simulation.alpha() < LayoutConfig::default().alpha_min);
    }

    #[test]
    fn tick_cap_bounds_slow_cooling() {
        let config = LayoutConfig {
            alpha_decay: 0.001,
            max_ticks: 25,
            ..LayoutConfig::default()
        };
        let mut simulation = Simulation::new(graph(3, &[(0, 1)]), config);
        assert_eq!(simulation.run_to_convergence(), SimulationStatus::TickCapReached);
        assert_eq!(simulation.ticks(), 25);
    }

    #[test]
    fn self_loop_contributes_no_spring() {
        let graph = graph(1, &[(0, 0)]);
        assert!(build_springs(&graph).is_empty());

        let mut simulation = Simulation::new(graph, LayoutConfig::default());
        simulation.run_to_convergence();
        let center = LayoutConfig::default().canvas.center();
        assert!(simulation.position(0).unwrap().distance(center) < 15.0);
    }

    #[test]
    fn spring_strength_follows_lower_degree() {
        let graph = graph(4, &[(0, 1), (0, 2), (0, 3)]);
        let springs = build_springs(&graph);
        assert_eq!(springs.len(), 3);
        for spring in springs {
            assert_eq!(spring.strength, 1.0);
            assert_eq!(spring.bias, 0.75);
        }
    }

    #[test]
    fn stop_and_reheat() {
        let mut simulation = Simulation::new(graph(3, &[(0, 1)]), LayoutConfig::default());
        simulation.tick();
        simulation.stop();
        let frozen = simulation.snapshot();
        assert_eq!(simulation.tick(), SimulationStatus::Stopped);
        assert_eq!(simulation.snapshot().positions, frozen.positions);

        simulation.reheat();
        assert_eq!(simulation.status(), SimulationStatus::Running);
        assert_eq!(simulation.alpha(), 1.0);
        simulation.tick();
        assert_ne!(simulation.snapshot().positions, frozen.positions);
    }

    #[test]
    fn drive_respects_driver_budget() {
        let mut simulation = Simulation::new(graph(3, &[(0, 1)]), LayoutConfig::default());
        let mut steps = ManualSteps::new(7);
        simulation.drive(&mut steps);
        assert_eq!(simulation.ticks(), 7);
        simulation.drive(&mut steps);
        assert_eq!(simulation.ticks(), 7);
    }

    #[test]
    fn snapshot_is_detached_from_live_buffers() {
        let graph = graph(3, &[(0, 1), (1, 2)]);
        let mut simulation = Simulation::new(graph, LayoutConfig::default());
        let before = simulation.snapshot();
        simulation.tick();
        assert_eq!(before.ticks, 0);
        assert_ne!(before.positions, simulation.snapshot().positions);
    }
}
