//! Client Request Library
//!
//! One function per command. Every call opens a fresh connection, sends one
//! request, reads the full response envelope and closes.

use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{Result, SmallError};
use crate::protocol::{encode_request, read_response, Request, Response, Selector};

use super::connection::is_disconnect;

/// Talks to a smallkv server at `(host, port)` with a fixed secret key
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    port: u16,
    secret_key: u32,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl Client {
    /// Create a client; nothing is connected until a request is made
    pub fn new(host: impl Into<String>, port: u16, secret_key: u32) -> Self {
        Self {
            host: host.into(),
            port,
            secret_key,
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// Bound how long a request may block (0 = no deadline)
    pub fn with_timeouts(mut self, read_ms: u64, write_ms: u64) -> Self {
        self.read_timeout = (read_ms > 0).then(|| Duration::from_millis(read_ms));
        self.write_timeout = (write_ms > 0).then(|| Duration::from_millis(write_ms));
        self
    }

    /// Store `value` under `name`
    pub fn set(&self, name: &str, value: &[u8]) -> Result<Response> {
        self.send(&Request::Set {
            name: name.to_string(),
            value: value.to_vec(),
        })
    }

    /// Fetch the value stored under `name`
    pub fn get(&self, name: &str) -> Result<Response> {
        self.send(&Request::Get {
            name: name.to_string(),
        })
    }

    /// Checksum `data` on the server
    pub fn digest(&self, data: &[u8]) -> Result<Response> {
        self.send(&Request::Digest {
            data: data.to_vec(),
        })
    }

    /// Run the diagnostic command named by `selector`
    pub fn run(&self, selector: &str) -> Result<Response> {
        let selector: Selector = selector.parse()?;
        self.send(&Request::Run { selector })
    }

    /// Send any request and wait for its response
    ///
    /// Out-of-bounds requests fail here and never reach the network.
    pub fn send(&self, request: &Request) -> Result<Response> {
        request.validate()?;
        let message = encode_request(self.secret_key, request)?;

        let mut stream = TcpStream::connect((self.host.as_str(), self.port))?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.write_timeout)?;

        tracing::trace!("Sending {} request to {}:{}", request.message_type(), self.host, self.port);
        stream.write_all(&message)?;
        stream.flush()?;

        read_response(&mut stream).map_err(|e| {
            if is_disconnect(&e) {
                SmallError::ConnectionClosed
            } else {
                e
            }
        })
    }
}
