//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;

use super::connection::{is_disconnect, Connection, ConnectionState};

/// TCP server for smallkv
///
/// One acceptor (the thread calling [`Server::run`]) feeds accepted streams
/// through a bounded channel to `config.workers` worker threads. Each worker
/// serves one connection at a time, start to finish. With a single worker
/// the server handles connections strictly in accept order.
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listener described by `config`
    pub fn bind(config: Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.listen_addr)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            dispatcher,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle that can stop [`Server::run`] from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let mut addr = self.local_addr()?;
        if addr.ip().is_unspecified() {
            addr.set_ip(match addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            });
        }
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr,
        })
    }

    /// Start the server (blocking)
    ///
    /// Returns after shutdown once every in-flight connection has finished.
    pub fn run(self) -> Result<()> {
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.workers);

        let workers = (0..self.config.workers)
            .map(|id| self.spawn_worker(id, rx.clone()))
            .collect::<io::Result<Vec<_>>>()?;
        drop(rx);

        tracing::info!("Accepting connections with {} worker(s)", workers.len());

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            match stream {
                Ok(stream) => {
                    if tx.send(stream).is_err() {
                        tracing::error!("All workers exited; stopping accept loop");
                        break;
                    }
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            }
        }

        drop(tx);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> io::Result<JoinHandle<()>> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("smallkv-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    serve(stream, &dispatcher, read_ms, write_ms);
                }
            })
    }
}

/// Run one connection to completion, logging instead of propagating failures
fn serve(stream: TcpStream, dispatcher: &Arc<Dispatcher>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, Arc::clone(dispatcher)) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }

    match connection.handle() {
        Ok(ConnectionState::Rejected) => {
            tracing::debug!("Closed connection from {} without response", connection.peer_addr());
        }
        Ok(_) => {}
        Err(e) if is_disconnect(&e) => {}
        Err(e) => tracing::warn!("Error serving {}: {}", connection.peer_addr(), e),
    }
}

/// Stops a running [`Server`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting and wake its accept loop
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
        // The accept loop only checks the flag after the next connection.
        if let Err(e) = TcpStream::connect(self.addr) {
            tracing::debug!("Shutdown wake-up connection failed: {}", e);
        }
    }
}
