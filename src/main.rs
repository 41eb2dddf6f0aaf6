use std::sync::Arc;

use anyhow::Context;
use bangla_restaurant_api::{
    app::{app, AppState},
    auth::JwtSessions,
    config::AppConfig,
    database::{DocumentStore, MemoryStore, MongoStore},
};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bangla-restaurant-api")]
#[command(about = "Restaurant listing backend: foods, carts and cookie sessions")]
#[command(version)]
struct Args {
    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Serve from an in-memory store instead of MongoDB
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DB_USER, DB_PASS, ACCESS_TOKEN_SECRET etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = if args.memory {
        AppConfig::for_memory_store()
    } else {
        AppConfig::from_env()
    };
    let mut config = config.context("invalid configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    info!("Starting Bangla Restaurant API in {:?} mode", config.environment);

    let store: Arc<dyn DocumentStore> = if args.memory {
        info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let uri = config.database_uri()?;
        Arc::new(
            MongoStore::connect(&uri, &config.database.name)
                .await
                .context("failed to connect to MongoDB")?,
        )
    };

    let tokens = Arc::new(JwtSessions::from_config(&config)?);
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(store.clone(), tokens, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Bangla Restaurant Server is running on {}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.shutdown().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
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
}
