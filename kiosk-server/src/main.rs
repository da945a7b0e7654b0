use anyhow::Context;
use kiosk_server::{init_logger_with_file, Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    std::fs::create_dir_all(&config.work_dir)
        .with_context(|| format!("failed to create work dir {}", config.work_dir.display()))?;
    let _log_guard = init_logger_with_file(&config.work_dir).context("failed to set up logging")?;

    tracing::info!("Playmate kiosk server starting...");

    let state = ServerState::initialize(&config)
        .await
        .context("failed to initialize server state")?;

    Server::with_state(config, state).run().await
}
