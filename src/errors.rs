use std::{any::Any, io};

/// Failure delivered through a task's [`JoinHandle`](crate::handle::JoinHandle).
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum SpawnError {
    #[error("task panicked: {0}")]
    Panic(String),
    #[error("callback panicked: {0}")]
    CallbackPanic(String),
    #[error("task was dropped before a worker executed it")]
    Abandoned,
    #[error("handle is invalid: nothing was dispatched")]
    InvalidHandle,
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to spawn worker {id}: {source}")]
    WorkerSpawn {
        id: usize,
        #[source]
        source: io::Error,
    },
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
