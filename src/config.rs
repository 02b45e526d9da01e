//! Configuration for smallkv
//!
//! Centralized configuration with sensible defaults.

use std::net::ToSocketAddrs;

use crate::error::{Result, SmallError};

/// Main configuration for a smallkv server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of connection worker threads.
    /// 1 reproduces the strict one-connection-at-a-time model.
    pub workers: usize,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------
    /// Shared plaintext key every request preamble must carry
    pub secret_key: u32,

    // -------------------------------------------------------------------------
    // External Commands
    // -------------------------------------------------------------------------
    /// Argument vector of the checksumming utility. Request data goes to its stdin.
    pub digest_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7777".to_string(),
            workers: 4,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            secret_key: 0,
            digest_command: vec!["sha256sum".to_string()],
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings that would otherwise fail late, at bind or spawn time
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SmallError::Config("workers must be at least 1".to_string()));
        }
        if self.digest_command.is_empty() {
            return Err(SmallError::Config("digest command must not be empty".to_string()));
        }
        let mut resolved = self.listen_addr.as_str().to_socket_addrs().map_err(|e| {
            SmallError::Config(format!("invalid listen address {:?}: {}", self.listen_addr, e))
        })?;
        if resolved.next().is_none() {
            return Err(SmallError::Config(format!(
                "listen address {:?} resolved to nothing",
                self.listen_addr
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the shared secret key
    pub fn secret_key(mut self, key: u32) -> Self {
        self.config.secret_key = key;
        self
    }

    /// Set the checksumming utility's argument vector
    pub fn digest_command<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.digest_command = argv.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
