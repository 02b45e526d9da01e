//! # smallkv
//!
//! A tiny authenticated network service with:
//! - An in-memory variable store (SET / GET)
//! - Checksums computed by an external utility (DIGEST)
//! - A closed set of diagnostic commands (RUN)
//! - A fixed-layout binary protocol, one request per TCP connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐  encode   ┌─────────────────────────────────────────┐
//! │    Client    │──────────▶│               TCP Server                 │
//! │   Library    │◀──────────│        (acceptor + worker pool)          │
//! └──────────────┘  decode   └────────────────────┬────────────────────┘
//!                                                 │
//!                            ┌────────────────────▼────────────────────┐
//!                            │   Connection: preamble → auth → body     │
//!                            └────────────────────┬────────────────────┘
//!                                                 │
//!                            ┌────────────────────▼────────────────────┐
//!                            │               Dispatcher                 │
//!                            └──────────┬──────────────────┬───────────┘
//!                                       │                  │
//!                                       ▼                  ▼
//!                              ┌──────────────┐   ┌─────────────────┐
//!                              │ VariableStore│   │ External Command │
//!                              │   (RwLock)   │   │     Adapter      │
//!                              └──────────────┘   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod dispatcher;
pub mod exec;
pub mod network;
pub mod protocol;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{Result, SmallError};
pub use network::{Client, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of smallkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
