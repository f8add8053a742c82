use anyhow::Context;
use itemhub::{cli::config_path_from_args, config::Config, logging::init_tracing, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = config_path_from_args()?;
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let logging_guard = init_tracing(&config.logging)?;

    tracing::info!(
        target: "itemhub",
        run_id = logging_guard.run_id(),
        config = %config_path.display(),
        "itemhub_starting"
    );
    server::run(config).await
}
