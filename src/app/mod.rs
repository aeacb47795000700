use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context};
use tracing::{info, warn};

use plot_graph::config::LayoutConfig;
use plot_graph::error::GraphWarning;
use plot_graph::geometry::{NodeFootprint, NodeShape};
use plot_graph::model::{BuildReport, parse_graph};
use plot_graph::physics::FrameClock;
use plot_graph::scene::{Scene, SimulationToken};

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<BuildReport, String>;

const WORKER_GONE: &str = "Background load worker disconnected";

pub struct PlotGraphApp {
    document: PathBuf,
    config: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    scene: Scene,
    token: SimulationToken,
    clock: FrameClock,
    footprints: Vec<NodeFootprint>,
    warnings: Vec<GraphWarning>,
    shape: NodeShape,
    live_layout: bool,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    reload_error: Option<String>,
}

struct SearchMatchCache {
    query: String,
    generation: u64,
    matches: Arc<HashSet<usize>>,
}

fn load_document(path: &Path) -> anyhow::Result<BuildReport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read analysis document {}", path.display()))?;
    let report = parse_graph(&raw)
        .with_context(|| format!("failed to build a graph from {}", path.display()))?;
    Ok(report)
}

impl PlotGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, document: PathBuf, config: LayoutConfig) -> Self {
        let state = Self::start_load(document.clone());
        Self {
            document,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(document: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_document(&document).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(document: PathBuf) -> AppState {
        info!(document = %document.display(), "loading analysis document");
        AppState::Loading {
            rx: Self::spawn_load(document),
        }
    }
}

impl eframe::App for PlotGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(report)) => {
                        let model = ViewModel::new(report, self.config);
                        transition = Some(AppState::Ready(Box::new(model)));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(WORKER_GONE.to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading character graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the analysis document");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.document.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.document, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.document.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        // Keep the live scene so surviving characters stay put.
                        Ok(Ok(report)) => model.replace_graph(report),
                        Ok(Err(error)) => {
                            warn!(%error, "reload failed; keeping the current graph");
                            model.reload_error = Some(error);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(WORKER_GONE.to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
