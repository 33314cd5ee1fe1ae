use super::{
    errors::SpawnError,
    result::SpawnResult,
    task::TaskId,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::oneshot::{self, error::TryRecvError};


/// Consumer side of a task's one-shot result channel.
///
/// A handle is either valid (something was dispatched and will, or already
/// did, deliver exactly one result) or invalid (the dispatch was rejected and
/// nothing will ever arrive). Reading the result consumes the handle's
/// validity.
pub struct JoinHandle<T> {
    task_id: Option<TaskId>,
    receiver: Option<oneshot::Receiver<SpawnResult<T>>>,
}

impl<T> JoinHandle<T> {

    pub(crate) fn new
    (
        task_id: TaskId,
        receiver: oneshot::Receiver<SpawnResult<T>>,
    ) -> Self {
        Self {
            task_id: Some(task_id),
            receiver: Some(receiver),
        }
    }

    /// Handle returned when a dispatch was rejected up front.
    pub fn invalid() -> Self {
        Self {
            task_id: None,
            receiver: None,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.receiver.is_some()
    }

    #[inline]
    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Blocks the current thread until the result arrives.
    ///
    /// Must not be called from inside an async runtime; `.await` the handle
    /// there instead.
    pub fn wait(self) -> SpawnResult<T> {
        match self.receiver {
            Some(receiver) => receiver.blocking_recv().unwrap_or(Err(SpawnError::Abandoned)),
            None => Err(SpawnError::InvalidHandle),
        }
    }

    /// Takes the result if it is already there.
    ///
    /// Returns `None` while the task is still pending. Once a result has been
    /// returned the handle becomes invalid.
    pub fn try_result(&mut self) -> Option<SpawnResult<T>> {
        let receiver = match self.receiver.as_mut() {
            Some(receiver) => receiver,
            None => return Some(Err(SpawnError::InvalidHandle)),
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(SpawnError::Abandoned),
        };
        self.receiver = None;
        Some(result)
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = SpawnResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let receiver = match this.receiver.as_mut() {
            Some(receiver) => receiver,
            None => return Poll::Ready(Err(SpawnError::InvalidHandle)),
        };
        match Pin::new(receiver).poll(cx) {
            Poll::Ready(res) => {
                this.receiver = None;
                Poll::Ready(res.unwrap_or(Err(SpawnError::Abandoned)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> std::fmt::Debug for JoinHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinHandle")
            .field("task_id", &self.task_id)
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Awaits every handle, keeping the order they were passed in.
pub async fn join_handles<T>(handles: Vec<JoinHandle<T>>) -> Vec<SpawnResult<T>> {
    futures::future::join_all(handles).await
}
