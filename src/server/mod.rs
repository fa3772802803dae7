//! Connection acceptance and the worker pool behind it.

pub mod listener;
pub mod pool;

pub use listener::{Server, ServerHandle};
pub use pool::{ConnectionHandler, PoolStats, WorkerPool};
