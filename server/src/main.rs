use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use taskdeck_server::{create_router, AppState, ServerConfig, StoreKind};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taskdeck-server")]
#[command(about = "HTTP backend for taskdeck", long_about = None)]
struct Cli {
    /// Interface to bind (overrides TASKDECK_HOST)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides TASKDECK_PORT)
    #[arg(long, short)]
    port: Option<u16>,
    /// Directory holding tasks.json (overrides TASKDECK_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Storage backend (overrides TASKDECK_STORE)
    #[arg(long, value_enum)]
    store: Option<StoreKind>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = Some(dir);
        }
        if let Some(store) = self.store {
            config.store = store;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,taskdeck_server=debug,taskdeck_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    cli.apply(&mut config);

    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let addresses = config.bind_addresses()?;
    let listener = TcpListener::bind(addresses.as_slice()).await?;
    let address = listener.local_addr()?;
    tracing::info!(
        "taskdeck-server v{} listening on http://{address}",
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("taskdeck-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
