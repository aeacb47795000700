mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use plot_graph::config::LayoutConfig;
use plot_graph::logging;

/// Interactive force-directed view of a character relationship analysis.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Analysis document (JSON with `characters` and `relations`).
    document: PathBuf,

    /// Layout parameters as JSON; omitted fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<f32>,

    #[arg(long)]
    height: Option<f32>,

    /// Used when neither PLOT_GRAPH_LOG nor RUST_LOG is set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let config = match &args.config {
        Some(path) => LayoutConfig::from_path(path)
            .with_context(|| format!("failed to load layout config {}", path.display()))?,
        None => LayoutConfig::default(),
    }
    .with_canvas(args.width, args.height);
    config.validate().context("invalid canvas size")?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let document = args.document;
    eframe::run_native(
        "plot-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::PlotGraphApp::new(cc, document, config)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
