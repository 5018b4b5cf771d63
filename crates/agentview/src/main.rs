use agentview_core::{run_viewer, ViewerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    info!("=== Agent View Startup ===");

    let config = ViewerConfig::from_env();
    if let Err(err) = run_viewer(config) {
        error!(error = %err, "viewer_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
