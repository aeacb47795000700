use std::path::Path;

use eframe::egui::{self, Align, Context, Layout};
use tracing::info;

use plot_graph::config::LayoutConfig;
use plot_graph::geometry::{NodeFootprint, NodeShape};
use plot_graph::model::{BuildReport, Graph};
use plot_graph::physics::{FrameClock, SimulationStatus};
use plot_graph::scene::Scene;

use super::super::ViewModel;

fn footprints(graph: &Graph) -> Vec<NodeFootprint> {
    graph
        .nodes()
        .iter()
        .map(|node| NodeFootprint::for_label(&node.label))
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn new(report: BuildReport, config: LayoutConfig) -> Self {
        let BuildReport { graph, warnings } = report;
        let footprints = footprints(&graph);
        let scene = Scene::new(graph, config);

        Self {
            token: scene.token(),
            scene,
            clock: FrameClock::default(),
            footprints,
            warnings,
            shape: NodeShape::Label,
            live_layout: true,
            search: String::new(),
            search_match_cache: None,
            reload_error: None,
        }
    }

    pub(in crate::app) fn replace_graph(&mut self, report: BuildReport) {
        let BuildReport { graph, warnings } = report;
        info!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            warnings = warnings.len(),
            "reloaded analysis document"
        );
        self.footprints = footprints(&graph);
        self.warnings = warnings;
        self.token = self.scene.replace_graph(graph);
        self.clock = FrameClock::default();
        self.search_match_cache = None;
        self.reload_error = None;
    }

    /// Restarts the layout with the separation radius of `shape`, keeping the
    /// current positions as seeds.
    pub(in crate::app) fn set_shape(&mut self, shape: NodeShape) {
        if self.shape == shape {
            return;
        }
        self.shape = shape;

        let config = LayoutConfig {
            collision_radius: shape.collision_radius(),
            ..*self.scene.config()
        };
        self.token = self.scene.reconfigure(config);
    }

    fn status_text(&self) -> String {
        let simulation = self.scene.simulation();
        let status = match simulation.status() {
            SimulationStatus::Running => "running",
            SimulationStatus::Converged => "converged",
            SimulationStatus::TickCapReached => "tick cap reached",
            SimulationStatus::Stopped => "stopped",
        };
        format!(
            "layout {status}  |  tick {}  |  alpha {:.3}",
            simulation.ticks(),
            simulation.alpha()
        )
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        document: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("plot-graph");
                    ui.separator();
                    ui.label(format!("document: {}", document.display()));
                    ui.label(format!("characters: {}", self.scene.graph().node_count()));
                    ui.label(format!("relations: {}", self.scene.graph().link_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload document"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Re-run layout").clicked() {
                        self.scene.restart_layout();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.status_text());
                    });
                });
                if let Some(error) = &self.reload_error {
                    ui.colored_label(
                        egui::Color32::from_rgb(235, 110, 96),
                        format!("Reload failed: {error}"),
                    );
                }
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });

        self.draw_tooltip(ctx);
    }
}
