//! Network Module
//!
//! TCP server, per-connection handling and the client library.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - One request/response cycle per connection
//! - Requests routed through the Dispatcher

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::{is_disconnect, Connection, ConnectionState};
pub use server::{Server, ShutdownHandle};
