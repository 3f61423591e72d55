mod api;
mod config;
mod llm_clients;
mod mock_llm;
mod shutdown;
mod telemetry;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// Flashcard daemon: researches a topic and turns it into study cards over HTTP.
#[derive(Parser, Debug)]
#[command(name = "flashcardd", version, about)]
struct Cli {
    /// Config file path.
    #[arg(short, long, default_value = "flashcards.toml")]
    config: PathBuf,

    /// Increase log verbosity (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit.
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 1. Load and validate config
    // -----------------------------------------------------------------------
    let config = config::load_config(&cli.config)?;
    config::validate_config(&config)?;

    if cli.validate {
        println!("config is valid");
        return Ok(());
    }

    // -----------------------------------------------------------------------
    // 2. Initialize tracing / OTEL
    // -----------------------------------------------------------------------
    let telemetry_guard =
        telemetry::init_telemetry(&config.otel, &config.global.instance_id, cli.verbose)?;

    info!(
        instance_id = %config.global.instance_id,
        "flashcardd starting"
    );

    // -----------------------------------------------------------------------
    // 3. Build clients and the shared pipeline
    // -----------------------------------------------------------------------
    let pipeline = llm_clients::build_pipeline(&config)
        .map_err(|err| anyhow!("failed to initialize pipeline: {err}"))?;

    // -----------------------------------------------------------------------
    // 4. Serve HTTP until a shutdown signal arrives
    // -----------------------------------------------------------------------
    let router = api::api_router(api::AppState::new(pipeline));
    let bind_addr = config.server.bind_addr.clone();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!(bind = %bind_addr, "HTTP API listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(shutdown::signal_listener(shutdown_tx));

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_rx.changed().await.ok();
        })
        .await
        .context("HTTP server error")?;

    info!("graceful shutdown: flushing OTEL spans");
    telemetry_guard.flush();

    info!("flashcardd stopped");
    Ok(())
}
