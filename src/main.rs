//! dispatchd — a request dispatch server that never blocks its dispatch path.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                  DISPATCHD                     │
//!                    │                                                │
//!   GET /fast ───────┼─▶ dispatcher ─▶ answered on the dispatch path  │
//!                    │       │                                        │
//!   GET /cpu/derive ─┼─▶ classify ──▶ worker pool (N slots, bounded   │
//!                    │       │         FIFO queue, Overloaded beyond) │
//!   GET /io/fetch ───┼─▶     └─────▶ non-blocking transport call      │
//!   GET /io/file     │                + completion registry           │
//!                    │                + optional timeout race         │
//!                    │                                                │
//!                    │  every admitted request: exactly one terminal  │
//!                    │  delivery (result, typed error, or inert after │
//!                    │  cancellation)                                 │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dispatchd::config::{load_config, DispatchConfig};
use dispatchd::{Dispatcher, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "dispatchd")]
#[command(about = "Bounded-concurrency request dispatch server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the worker slot count (default: detected CPU cores).
    #[arg(long)]
    workers: Option<usize>,

    /// Override the CPU task queue bound.
    #[arg(long)]
    queue_depth: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dispatchd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dispatchd starting");

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(workers) = cli.workers {
        config.pool.workers = Some(workers);
    }
    if let Some(queue_depth) = cli.queue_depth {
        config.pool.queue_depth = queue_depth;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        workers = config.pool.worker_count(),
        queue_depth = config.pool.queue_depth,
        io_timeout_ms = ?config.timeouts.io_op_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => dispatchd::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let dispatcher = Arc::new(Dispatcher::new(&config));
    let server = HttpServer::new(config, Arc::clone(&dispatcher));

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown.listen_for_ctrl_c().await;
    });

    server.run(listener, server_shutdown).await?;

    // Last reference: dropping the dispatcher joins the worker pool.
    drop(dispatcher);
    tracing::info!("Shutdown complete");
    Ok(())
}
