//! Connection Handler
//!
//! Drives one client connection through a single request/response cycle.
//!
//! ## States
//! ```text
//! AwaitingPreamble → Authenticating → AwaitingBody → Executing → RespondingDone
//!        │                 │               │
//!        └─────────────────┴───────────────┴──────→ Rejected
//! ```
//!
//! Framing and authentication failures end in `Rejected`: the connection is
//! closed without a single byte sent back. Everything after a successful
//! admission gets a response envelope, even if it only carries `status = -1`.

use std::io::{self, BufReader, BufWriter, Read};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher::Dispatcher;
use crate::error::{Result, SmallError};
use crate::protocol::{read_body, read_preamble, write_response, MessageType, Response};

/// Upper bound on client input discarded after an early response
const DRAIN_LIMIT: u64 = 64 * 1024;

/// Position of a connection in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingPreamble,
    Authenticating,
    AwaitingBody,
    Executing,
    RespondingDone,
    Rejected,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared admission check, store and command adapters
    dispatcher: Arc<Dispatcher>,

    /// Peer address for logging
    peer_addr: String,

    state: ConnectionState,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            peer_addr,
            state: ConnectionState::AwaitingPreamble,
        })
    }

    /// Configure connection timeouts (0 leaves the call blocking forever)
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

    /// Serve exactly one request, then close
    ///
    /// Returns the terminal state. `Err` means the response could not be
    /// written.
    pub fn handle(&mut self) -> Result<ConnectionState> {
        self.state = ConnectionState::AwaitingPreamble;
        let preamble = match read_preamble(&mut self.reader) {
            Ok(preamble) => preamble,
            Err(e) => return Ok(self.reject(None, &e)),
        };

        self.state = ConnectionState::Authenticating;
        if let Err(e) = self.dispatcher.authenticate(&preamble) {
            tracing::warn!(
                peer = %self.peer_addr,
                secret_key = preamble.secret_key,
                request_type = %preamble.msg_type,
                reason = %e,
                "Access denied"
            );
            return Ok(self.reject(Some(preamble.msg_type), &e));
        }

        self.state = ConnectionState::AwaitingBody;
        let (response, detail, payload_unread) = match read_body(&mut self.reader, preamble.msg_type) {
            Ok(request) => {
                self.state = ConnectionState::Executing;
                let detail = request.detail();
                (self.dispatcher.execute(request), detail, false)
            }
            Err(e) if e.is_validation() => {
                let unread = leaves_payload_unread(&e);
                (Response::failure(), e.to_string(), unread)
            }
            Err(e) => return Ok(self.reject(Some(preamble.msg_type), &e)),
        };

        let completion = if response.is_success() { "success" } else { "failure" };
        tracing::info!(
            peer = %self.peer_addr,
            secret_key = preamble.secret_key,
            request_type = %preamble.msg_type,
            detail = %detail,
            completion,
            "Handled request"
        );

        if let Err(e) = write_response(&mut self.writer, &response) {
            if is_disconnect(&e) {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr,
                    e
                );
            }
            return Err(e);
        }

        self.close(payload_unread);
        self.state = ConnectionState::RespondingDone;
        Ok(self.state)
    }

    /// Drop the connection without answering
    fn reject(&mut self, msg_type: Option<MessageType>, error: &SmallError) -> ConnectionState {
        match error {
            SmallError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::debug!("Client {} sent a short request", self.peer_addr);
            }
            SmallError::AuthenticationFailed => {}
            _ => {
                tracing::warn!(
                    peer = %self.peer_addr,
                    request_type = msg_type.map(MessageType::name).unwrap_or("unknown"),
                    reason = %error,
                    "Dropping malformed request"
                );
            }
        }

        let _ = self.reader.get_ref().shutdown(Shutdown::Both);
        self.state = ConnectionState::Rejected;
        self.state
    }

    /// Half-close after the response; if the body was left unread, discard a
    /// bounded amount of it so the close does not reset the connection under
    /// the client before it reads the response.
    fn close(&mut self, drain: bool) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Write);
        if drain {
            let _ = io::copy(&mut (&mut self.reader).take(DRAIN_LIMIT), &mut io::sink());
        }
    }

    /// Current state of the connection
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// A rejected length prefix is the only body error raised before the bytes
/// it describes were read. Fixed-size fields are always consumed whole.
fn leaves_payload_unread(error: &SmallError) -> bool {
    matches!(error, SmallError::FieldTooLong { field, .. } if *field != "name")
}

/// Whether an error just means the peer went away
pub fn is_disconnect(error: &SmallError) -> bool {
    match error {
        SmallError::ConnectionClosed => true,
        SmallError::Io(e) => matches!(
            e.kind(),
            io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof
        ),
        _ => false,
    }
}
