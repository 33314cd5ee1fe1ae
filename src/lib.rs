//! In-process task execution engine: a fixed pool of worker threads draining
//! one FIFO of type-erased tasks.
//!
//! # Features
//! - Dispatch of closures, function pointers and methods bound to an instance
//! - Results delivered through a one-shot [`JoinHandle`], blockable or awaitable
//! - Callback dispatch: the result is handed to a second callable on the worker
//! - Strict FIFO execution across the whole pool
//! - Panics are caught per task and never take a worker down
//! - Explicit start/stop lifecycle with restart support

mod dispatch;
pub mod errors;
pub mod handle;
pub mod invoke;
pub mod model;
pub mod pool;
mod queue;
pub mod result;
mod task;

pub use errors::{PoolError, SpawnError};
pub use handle::{join_handles, JoinHandle};
pub use invoke::{bind, invoke, Bound, Callable};
pub use model::PoolMetrics;
pub use pool::{Config, TaskPool};
pub use result::{PoolResult, SpawnResult};
pub use task::TaskId;
