//! TCP Server
//!
//! Accepts connections and dispatches to handler threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::protocol::{write_response, Response};
use super::Connection;

/// Poll interval of the accept loop while idle
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for ScopeKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,

    /// Set to stop the accept loop
    shutdown: Arc<AtomicBool>,

    /// Number of connections currently being served
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen socket for the given config
    ///
    /// The listener is non-blocking so the accept loop can observe the
    /// shutdown flag between connection attempts.
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            StoreError::Network(format!("Failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The address the server actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle that stops the accept loop when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shut down gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Accept connections until shut down (blocking)
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(
            "Listening on {} (max {} connections)",
            self.config.listen_addr,
            self.config.max_connections
        );

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::info!("Shutdown requested, stopping accept loop");
                return Ok(());
            }

            match self.listener.accept() {
                Ok((stream, addr)) => self.dispatch(stream, addr),
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }
    }

    /// Hand an accepted connection to its own handler thread
    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!("Rejecting {}: connection limit reached", addr);
            let mut stream = stream;
            let _ = write_response(&mut stream, &Response::error("server at capacity"));
            return;
        }

        let engine = Arc::clone(&self.engine);
        let active = Arc::clone(&self.active);
        let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

        active.fetch_add(1, Ordering::SeqCst);
        thread::spawn(move || {
            if let Err(e) = serve_client(stream, engine, read_ms, write_ms) {
                tracing::warn!("Connection from {} failed: {}", addr, e);
            }
            active.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Run one client connection to completion
fn serve_client(
    stream: TcpStream,
    engine: Arc<Engine>,
    read_ms: u64,
    write_ms: u64,
) -> Result<()> {
    // The accepted socket inherits non-blocking mode on some platforms
    stream.set_nonblocking(false)?;

    let mut connection = Connection::new(stream, engine)?;
    connection.set_timeouts(read_ms, write_ms)?;
    connection.handle()
}
