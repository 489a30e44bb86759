//! Connection Handler
//!
//! One handler per client: reads framed commands, routes them through
//! the engine with the identity the client bound via HELLO, writes the
//! response back.

use std::io::{self, BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::protocol::{read_command, write_response, Command, Reply, Response};
use crate::store::OwnerId;

/// Serves a single client connection
pub struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,

    /// Command router with ownership enforcement
    engine: Arc<Engine>,

    /// Identity bound by HELLO; anonymous until then
    identity: Option<OwnerId>,

    /// Peer address for logging
    peer: String,
}

impl Connection {
    /// Wrap an accepted stream in buffered reader/writer halves
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Request/response traffic, so no Nagle batching
        stream.set_nodelay(true)?;
        let write_half = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(stream),
            writer: BufWriter::new(write_half),
            engine,
            identity: None,
            peer,
        })
    }

    /// Apply read/write timeouts to the underlying socket (0 = none)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Command/response loop, blocking until the client goes away
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(command) => command,
                Err(e) => {
                    if let StoreError::Io(ref io_err) = e {
                        if let Some(why) = hangup_reason(io_err) {
                            tracing::debug!("Client {} gone: {}", self.peer, why);
                            return Ok(());
                        }
                    }
                    tracing::warn!("Error reading from {}: {}", self.peer, e);
                    // Best effort; the stream may already be dead
                    let _ = self.send(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Command from {}: {:?}", self.peer, command);
            let response = self.execute(command);

            if let Err(e) = self.send(response) {
                // A peer that hangs up mid-response is not a server error
                if let StoreError::Io(ref io_err) = e {
                    if let Some(why) = hangup_reason(io_err) {
                        tracing::debug!("Client {} gone before response: {}", self.peer, why);
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer, e);
                return Err(e);
            }
        }
    }

    /// Run one command and shape its outcome into a wire response
    ///
    /// HELLO is absorbed here (identity is connection state); everything
    /// else goes through the engine with whatever identity is bound.
    fn execute(&mut self, command: Command) -> Response {
        if let Command::Hello { owner } = command {
            tracing::debug!("Client {} identified as {}", self.peer, owner);
            self.identity = Some(owner);
            return Response::Ok(Reply::None);
        }

        match self.engine.execute(self.identity.as_ref(), command) {
            Ok(reply) => Response::Ok(reply),
            Err(StoreError::KeyNotFound) => Response::NotFound,
            Err(StoreError::Unauthorized) => Response::Unauthorized,
            Err(e) => Response::error(&e.to_string()),
        }
    }

    fn send(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)?;
        Ok(())
    }

    /// The peer address this connection serves
    pub fn peer_addr(&self) -> &str {
        &self.peer
    }
}

/// Classify I/O errors that mean "the client went away, stop serving it"
///
/// Timeouts surface as WouldBlock on Unix and TimedOut on Windows.
fn hangup_reason(e: &io::Error) -> Option<&'static str> {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Some("disconnected"),
        io::ErrorKind::ConnectionReset => Some("connection reset"),
        io::ErrorKind::ConnectionAborted => Some("connection aborted"),
        io::ErrorKind::BrokenPipe => Some("broken pipe"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Some("read timeout"),
        _ => None,
    }
}
