//! ScopeKV Server Binary
//!
//! Starts the TCP server for ScopeKV.

use std::sync::Arc;

use clap::Parser;
use scopekv::network::Server;
use scopekv::{Config, Engine, KvStore, StoreEvent};
use tracing_subscriber::{fmt, EnvFilter};

/// ScopeKV Server
#[derive(Parser, Debug)]
#[command(name = "scopekv-server")]
#[command(about = "Namespaced key-value store with public reads and owner-restricted writes")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7171")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Connection read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Connection write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,

    /// Log committed mutations as they happen
    #[arg(long)]
    log_events: bool,
}

fn main() {
    // RUST_LOG wins over the baked-in default
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scopekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("ScopeKV Server v{}", scopekv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let store = Arc::new(KvStore::new());

    // Stream committed mutations to the log for external observers
    if args.log_events {
        let events = store.subscribe();
        std::thread::spawn(move || {
            for event in events.iter() {
                match &event {
                    StoreEvent::ValueStored { owner, key, .. } => {
                        tracing::info!(%owner, key, "value stored");
                    }
                    StoreEvent::ValueUpdated { owner, key, .. } => {
                        tracing::info!(%owner, key, "value updated");
                    }
                    StoreEvent::ValueDeleted { owner, key, .. } => {
                        tracing::info!(%owner, key, "value deleted");
                    }
                }
            }
        });
    }

    let engine = Arc::new(Engine::new(store));

    // Bind and serve
    let mut server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
