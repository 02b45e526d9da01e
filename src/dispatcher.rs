//! Dispatcher Module
//!
//! Admission check and command routing shared by all connections.
//!
//! ## Responsibilities
//! - Compare the preamble's secret key against the configured one
//! - Route each decoded request to exactly one of the four handlers
//! - Turn handler failures into `status = -1` responses
//!
//! The message type set is closed, so routing is a plain `match`: there is no
//! "unregistered handler" path.

use crate::config::Config;
use crate::error::{Result, SmallError};
use crate::exec::{run_selector, Digester};
use crate::protocol::{validate_name, Preamble, Request, Response, Selector};
use crate::store::VariableStore;

/// Owns the server state every request handler needs
///
/// ## Concurrency
/// - `store`: internal RwLock, held only for a single lookup or upsert
/// - `digester` and the run table are immutable; subprocesses run without
///   any lock held
#[derive(Debug)]
pub struct Dispatcher {
    /// Shared key every request must present
    secret_key: u32,

    /// Variables written by SET and read by GET
    store: VariableStore,

    /// Checksumming utility for DIGEST
    digester: Digester,
}

impl Dispatcher {
    /// Create a dispatcher with an empty store
    pub fn new(secret_key: u32, digester: Digester) -> Self {
        Self {
            secret_key,
            store: VariableStore::new(),
            digester,
        }
    }

    /// Create a dispatcher from server configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.secret_key, Digester::new(config.digest_command.clone()))
    }

    /// Admit a request by plain key equality
    pub fn authenticate(&self, preamble: &Preamble) -> Result<()> {
        if preamble.secret_key != self.secret_key {
            return Err(SmallError::AuthenticationFailed);
        }
        Ok(())
    }

    /// Execute a request and return the response to send
    pub fn execute(&self, request: Request) -> Response {
        let result = match request {
            Request::Set { name, value } => handle_set(&self.store, &name, &value),
            Request::Get { name } => handle_get(&self.store, &name),
            Request::Digest { data } => handle_digest(&self.digester, &data),
            Request::Run { selector } => handle_run(selector),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!("Request failed: {}", e);
            Response::failure()
        })
    }

    /// Get the variable store
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Get the configured checksumming utility
    pub fn digester(&self) -> &Digester {
        &self.digester
    }
}

fn handle_set(store: &VariableStore, name: &str, value: &[u8]) -> Result<Response> {
    store.set(name, value)?;
    Ok(Response::ok_empty())
}

/// A miss is reported exactly like a malformed name
fn handle_get(store: &VariableStore, name: &str) -> Result<Response> {
    validate_name(name)?;
    store
        .get(name)
        .map(Response::ok)
        .ok_or_else(|| SmallError::NotFound(name.to_string()))
}

fn handle_digest(digester: &Digester, data: &[u8]) -> Result<Response> {
    digester.digest(data).map(Response::ok)
}

fn handle_run(selector: Selector) -> Result<Response> {
    run_selector(selector).map(Response::ok)
}
