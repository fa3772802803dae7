//! Worker threads that serve accepted connections.
//!
//! The pool keeps up to `max_workers` threads. Each is either idle, waiting
//! on its channel for a connection, or active, serving one. When no idle
//! worker is left the listener spawns an overflow worker for the
//! connection; it exits once done unless the pool has room for it.
//!
//! ```text
//!   idle ──dispatch──▶ active ──done──▶ idle       (idle + active < max)
//!                                  └──▶ exit       (otherwise, or shutting down)
//! ```
//!
//! The idle queue and the active set are only touched with the state lock
//! held, so a worker is never in both.

use std::collections::{HashMap, VecDeque};
use std::net::{SocketAddr, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::Context;

/// Serves one connection from start to close.
pub trait ConnectionHandler: Send + Sync + 'static {
    fn serve(&self, stream: TcpStream, peer: SocketAddr) -> anyhow::Result<()>;
}

enum Assignment {
    Serve(TcpStream, SocketAddr),
    Stop,
}

struct Worker {
    id: usize,
    tx: Sender<Assignment>,
}

#[derive(Default)]
struct PoolState {
    idle: VecDeque<Worker>,
    active: HashMap<usize, Worker>,
}

/// Snapshot of the pool's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub idle: usize,
    pub active: usize,
    /// Overflow workers currently serving a connection.
    pub overflow: usize,
}

struct Inner {
    max_workers: usize,
    handler: Arc<dyn ConnectionHandler>,
    state: Mutex<PoolState>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    next_id: AtomicUsize,
    overflow: AtomicUsize,
    stopping: AtomicBool,
}

#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<Inner>,
}

impl WorkerPool {
    /// Starts `max_workers` idle workers.
    pub fn start(max_workers: usize, handler: Arc<dyn ConnectionHandler>) -> anyhow::Result<Self> {
        let pool = Self {
            inner: Arc::new(Inner {
                max_workers,
                handler,
                state: Mutex::new(PoolState::default()),
                threads: Mutex::new(Vec::new()),
                next_id: AtomicUsize::new(0),
                overflow: AtomicUsize::new(0),
                stopping: AtomicBool::new(false),
            }),
        };

        for _ in 0..max_workers {
            let (id, tx, rx) = pool.inner.new_worker();
            pool.inner.spawn(id, tx.clone(), rx, false)?;
            pool.inner.lock_state().idle.push_back(Worker { id, tx });
        }
        tracing::debug!(workers = max_workers, "worker pool started");

        Ok(pool)
    }

    pub fn max_workers(&self) -> usize {
        self.inner.max_workers
    }

    /// Hands a connection to an idle worker, or to a new overflow worker
    /// when none is idle.
    pub fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let mut state = self.inner.lock_state();
        let (stream, peer) = match state.idle.pop_front() {
            Some(worker) => match worker.tx.send(Assignment::Serve(stream, peer)) {
                Ok(()) => {
                    tracing::trace!(worker = worker.id, %peer, "connection assigned");
                    state.active.insert(worker.id, worker);
                    return;
                }
                // the worker thread is gone; its connection goes to overflow
                Err(SendError(Assignment::Serve(stream, peer))) => (stream, peer),
                Err(SendError(Assignment::Stop)) => return,
            },
            None => (stream, peer),
        };
        drop(state);

        if let Err(e) = self.inner.spawn_overflow(stream, peer) {
            tracing::error!(%peer, error = %e, "failed to spawn overflow worker");
        }
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.inner.lock_state();
        PoolStats {
            idle: state.idle.len(),
            active: state.active.len(),
            overflow: self.inner.overflow.load(Ordering::SeqCst),
        }
    }

    /// Tells every worker to stop once its current connection is done and
    /// waits for them to exit.
    pub fn shutdown(&self) {
        self.inner.stopping.store(true, Ordering::SeqCst);
        {
            let mut state = self.inner.lock_state();
            for worker in state.idle.drain(..) {
                let _ = worker.tx.send(Assignment::Stop);
            }
            for (_, worker) in state.active.drain() {
                let _ = worker.tx.send(Assignment::Stop);
            }
        }

        let threads = std::mem::take(&mut *self.inner.threads.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in threads {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
        tracing::debug!("worker pool stopped");
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn new_worker(&self) -> (usize, Sender<Assignment>, Receiver<Assignment>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();
        (id, tx, rx)
    }

    fn spawn_overflow(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr) -> anyhow::Result<()> {
        let (id, tx, rx) = self.new_worker();
        tx.send(Assignment::Serve(stream, peer))
            .map_err(|_| anyhow::anyhow!("overflow worker channel closed"))?;
        self.overflow.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(worker = id, %peer, "spawning overflow worker");
        if let Err(e) = self.spawn(id, tx, rx, true) {
            self.overflow.fetch_sub(1, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    fn spawn(
        self: &Arc<Self>,
        id: usize,
        tx: Sender<Assignment>,
        rx: Receiver<Assignment>,
        overflow: bool,
    ) -> anyhow::Result<()> {
        let inner = Arc::clone(self);
        let name = if overflow {
            format!("webdesk-overflow-{id}")
        } else {
            format!("webdesk-worker-{id}")
        };
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || inner.run_worker(id, tx, rx, overflow))
            .context("spawning worker thread")?;

        let mut threads = self.threads.lock().unwrap_or_else(PoisonError::into_inner);
        threads.retain(|h| !h.is_finished());
        threads.push(handle);
        Ok(())
    }

    fn run_worker(&self, id: usize, tx: Sender<Assignment>, rx: Receiver<Assignment>, mut overflow: bool) {
        while let Ok(assignment) = rx.recv() {
            let (stream, peer) = match assignment {
                Assignment::Serve(stream, peer) => (stream, peer),
                Assignment::Stop => break,
            };

            self.serve(id, stream, peer);

            if !self.release(id, &tx) {
                break;
            }
            if overflow {
                self.overflow.fetch_sub(1, Ordering::SeqCst);
                overflow = false;
            }
        }

        if overflow {
            self.overflow.fetch_sub(1, Ordering::SeqCst);
        }
        tracing::trace!(worker = id, "worker exiting");
    }

    fn serve(&self, id: usize, stream: TcpStream, peer: SocketAddr) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.handler.serve(stream, peer))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(worker = id, %peer, error = %e, "connection failed"),
            Err(_) => tracing::error!(worker = id, %peer, "worker panicked while serving connection"),
        }
    }

    /// Moves a finished worker from the active set back to the idle queue.
    /// Returns false if the worker should exit instead.
    fn release(&self, id: usize, tx: &Sender<Assignment>) -> bool {
        let mut state = self.lock_state();
        state.active.remove(&id);
        if self.stopping.load(Ordering::SeqCst) {
            return false;
        }
        if state.idle.len() + state.active.len() >= self.max_workers {
            return false;
        }
        state.idle.push_back(Worker { id, tx: tx.clone() });
        true
    }
}
