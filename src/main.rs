//! Cat Detector - Main Entry Point

use clap::Parser;
use cat_detector::cli::{cmd_predict, cmd_serve, Cli, Commands};
use cat_detector::server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cat_detector=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port, model, camera_url }) => {
            cmd_serve(&host, port, &model, camera_url.as_deref()).await?;
        }
        Some(Commands::Predict { model, image }) => {
            cmd_predict(&model, &image)?;
        }
        None => {
            let config = ServerConfig::default();
            cmd_serve(&config.host, config.port, &config.model_path, None).await?;
        }
    }

    Ok(())
}
