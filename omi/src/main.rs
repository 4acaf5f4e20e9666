use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use omi::api::{create_router, AppState};
use omi::config::Config;

#[derive(Parser)]
#[command(name = "omi")]
#[command(about = "OMI Universal Gateway: mode-based prompt rewriting and LLM routing")]
struct Args {
    /// Address to bind (overrides OMI_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides OMI_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omi=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.server.admin_key.is_none() {
        tracing::warn!("OMI_ADMIN_KEY is not set, every /generate call will be rejected");
    }
    for provider in omi::routing::ProviderId::ALL {
        if config.providers.get(provider).api_key.is_none() {
            tracing::warn!(
                "No house key for {}; requests routed there need a caller-supplied key",
                provider
            );
        }
    }

    let state = AppState::from_config(config.clone())?;
    let notifier = state.notifier.clone();
    if notifier.is_enabled() {
        tracing::info!("Audit delivery enabled");
    } else {
        tracing::info!("N8N_WEBHOOK_URL not set, audit delivery disabled");
    }
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("OMI Gateway starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Waiting for in-flight audit deliveries...");
    notifier.drain().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
