//! Observatory control plane server binary

use obsv_infrastructure::config::ConfigLoader;
use obsv_infrastructure::logging::init_logging;
use obsv_server::{AppState, build_rocket};
use tracing::info;

/// Default configuration file, read when present
const DEFAULT_CONFIG_PATH: &str = "observatory.toml";

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("OBSV_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = ConfigLoader::new().with_config_path(&config_path).load()?;

    init_logging(&config.logging)?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "starting observatory control plane"
    );

    let state = AppState::from_config(&config)?;
    let sweepers = state.spawn_sweepers();

    let figment = rocket::Config::figment()
        .merge(("address", config.server.host.clone()))
        .merge(("port", config.server.port));

    let result = build_rocket(state).configure(figment).launch().await;

    // Stop background sweepers before reporting the launch outcome.
    for handle in &sweepers {
        handle.shutdown();
    }

    let _ = result?;
    info!("observatory control plane stopped");
    Ok(())
}
