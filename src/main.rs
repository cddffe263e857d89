use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_call::{
    create_router, AppState, CallController, Config, HttpTokenService, NatsBridge, TracingObserver,
};

/// Live voice call controller service
#[derive(Debug, Parser)]
#[command(name = "voice-call", version)]
struct Args {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/voice-call")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("Voice Call v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Token service: {}", cfg.token_service.base_url);

    let bridge_id = cfg.bridge_id();
    let bridge = NatsBridge::connect(&cfg.bridge.nats_url, &bridge_id).await?;

    let tokens = HttpTokenService::new(cfg.token_service.base_url.clone(), cfg.token_timeout())
        .context("Failed to create token service client")?;

    let controller = Arc::new(CallController::new(
        cfg.controller_config(),
        Box::new(bridge.call_sdk().await?),
        Arc::new(bridge.microphone()),
        Arc::new(tokens),
        Arc::new(TracingObserver::new(cfg.service.name.clone())),
    ));

    let app = create_router(AppState::new(Arc::clone(&controller)));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {} (bridge '{}')", addr, bridge_id);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    controller.stop().await;
    controller.dispose();

    Ok(())
}
