use anyhow::Context as _;
use clap::Parser as _;

use hellonet::app::{AppState, router};
use hellonet::cli::ServerArgs;
use hellonet::config::allowed_origins_from_env;
use hellonet::pipeline::Pipeline;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    hellonet::logging::init("info,tower_http=debug")?;

    let mut args = ServerArgs::parse();
    if let Some(origins) = allowed_origins_from_env() {
        args.allowed_origins = origins;
    }
    tracing::info!(?args, "starting hellonet-server");

    let pipeline = Pipeline::with_defaults().context("build pipeline")?;
    let state = AppState::new(pipeline, args.service_name.clone());
    let app = router(state, &args.allowed_origins).context("build router")?;

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(?err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
