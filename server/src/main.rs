use log::info;
use pool_server::config::ServerConfig;
use pool_server::store::{JsonlStore, MemoryStore, PoolStore};
use pool_server::{AppState, build_router};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    if config.admin_token.is_none() {
        log::warn!("POOL_ADMIN_TOKEN is not set; anyone can post results");
    }

    match config.data_dir.clone() {
        Some(dir) => serve(JsonlStore::open(dir).await?, config).await,
        None => {
            info!("POOL_DATA_DIR not set; keeping brackets in memory");
            serve(MemoryStore::new(), config).await
        }
    }
}

async fn serve<S: PoolStore>(store: S, config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    info!("pool server listening on {}", config.bind);

    let app = build_router(AppState::new(store, config.admin_token));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("pool server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
    }
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("pool-server {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "pool-server - playoff bracket pool backend

Usage:
  pool-server
  pool-server --help
  pool-server --version

Environment:
  POOL_BIND          Listen address (default 0.0.0.0:8787)
  POOL_DATA_DIR      Directory for predictions.jsonl / results.jsonl (default: in memory)
  POOL_ADMIN_TOKEN   Bearer token required to post results (default: open)
  RUST_LOG           Log filter (default info)"
}
