use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use framegate::{api, config, fetch, search, AppState};

#[derive(Parser)]
#[command(name = "framegate", version, about = "Embedding-aware web proxy gateway")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "FRAMEGATE_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = Arc::new(config::Config::from_env());
    let fetcher = fetch::Fetcher::new(config.fetch_timeout);
    let pool = search::SearchPool::from_env().map(Arc::new);
    let search_status = pool
        .as_ref()
        .map_or("disabled".to_string(), |p| format!("{} keys", p.len()));

    let state = AppState {
        config: config.clone(),
        fetcher,
        search: pool,
        started_at: std::time::Instant::now(),
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        blocked_hosts = config.blocked_hosts.len(),
        max_resource_bytes = config.max_resource_bytes,
        fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
        search = %search_status,
        "framegate starting"
    );

    let app = api::router(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
    info!("shutting down");
}
