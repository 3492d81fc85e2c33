use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use search_relay::api::create_router;
use search_relay::config::Config;
use search_relay::relay::ResultRelay;
use search_relay::search::GoogleSearchClient;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Relays web search results to clients as server-sent events")]
struct Cli {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Delay between streamed results in milliseconds (overrides RELAY_PACING_MS)
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Number of results requested from the search service (overrides SEARCH_RESULT_LIMIT)
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(pacing_ms) = cli.pacing_ms {
        config.pacing = Duration::from_millis(pacing_ms);
    }
    if let Some(limit) = cli.limit {
        config.result_limit = limit;
    }

    let client =
        GoogleSearchClient::from_config(&config).context("Failed to build search client")?;
    let relay = Arc::new(ResultRelay::new(
        Arc::new(client),
        config.result_limit,
        config.pacing,
    ));
    let app = create_router(relay);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {:#}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
