use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use socket2::SockRef;
use tracing::info;

use crate::config::ServerConfig;
use crate::server::pool::{ConnectionHandler, PoolStats, WorkerPool};

/// A bound listening socket plus the worker pool serving it.
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
    pool: WorkerPool,
    read_timeout: Duration,
    stopping: Arc<AtomicBool>,
}

impl Server {
    pub fn bind(cfg: &ServerConfig, handler: Arc<dyn ConnectionHandler>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.listen_addr)
            .with_context(|| format!("binding {}", cfg.listen_addr))?;
        let addr = listener.local_addr()?;
        let pool = WorkerPool::start(cfg.max_workers, handler)?;
        info!("Listening on {}", addr);

        Ok(Self {
            listener,
            addr,
            pool,
            read_timeout: Duration::from_secs(cfg.read_timeout_secs),
            stopping: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Runs the accept loop on a thread of its own.
    pub fn spawn(self) -> anyhow::Result<ServerHandle> {
        let addr = self.addr;
        let pool = self.pool.clone();
        let stopping = Arc::clone(&self.stopping);
        let accept = thread::Builder::new()
            .name("webdesk-accept".to_string())
            .spawn(move || self.run())
            .context("spawning accept thread")?;

        Ok(ServerHandle {
            addr,
            pool,
            stopping,
            accept: Some(accept),
        })
    }

    /// Accepts connections until shutdown is requested.
    pub fn run(&self) {
        for conn in self.listener.incoming() {
            if self.stopping.load(Ordering::SeqCst) {
                break;
            }
            let stream = match conn {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            };
            let peer = match stream.peer_addr() {
                Ok(peer) => peer,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping connection without peer address");
                    continue;
                }
            };
            if let Err(e) = configure_socket(&stream, self.read_timeout) {
                tracing::warn!(%peer, error = %e, "failed to configure socket");
                continue;
            }

            info!("Accepted connection from {}", peer);
            self.pool.dispatch(stream, peer);
        }
        info!("Listener on {} closed", self.addr);
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        // never spawned, or the accept loop died: nobody else will stop the workers
        if !self.stopping.load(Ordering::SeqCst) {
            self.pool.shutdown();
        }
    }
}

fn configure_socket(stream: &TcpStream, read_timeout: Duration) -> io::Result<()> {
    stream.set_nodelay(true)?;
    SockRef::from(stream).set_keepalive(true)?;
    if !read_timeout.is_zero() {
        stream.set_read_timeout(Some(read_timeout))?;
        stream.set_write_timeout(Some(read_timeout))?;
    }
    Ok(())
}

/// Controls a server started with [`Server::spawn`].
pub struct ServerHandle {
    addr: SocketAddr,
    pool: WorkerPool,
    stopping: Arc<AtomicBool>,
    accept: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Stops accepting, lets every worker finish its current connection and
    /// waits for the threads to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(accept) = self.accept.take() else {
            return;
        };
        self.stopping.store(true, Ordering::SeqCst);

        // wake the accept loop so it sees the flag
        let _ = TcpStream::connect_timeout(&wake_addr(self.addr), Duration::from_secs(1));
        if accept.join().is_err() {
            tracing::error!("accept thread panicked");
        }

        self.pool.shutdown();
        info!("Server stopped");
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn wake_addr(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port()),
        _ => addr,
    }
}
