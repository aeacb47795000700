use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PLOT_GRAPH_LOG";

/// Installs the global fmt subscriber. `PLOT_GRAPH_LOG` wins over `RUST_LOG`,
/// which wins over `default_level`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded in another binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
