//! Turning calls into queued tasks.
//!
//! Every entry point has an `_opt` twin taking `Option`s: `None` plays the
//! part of a null callable and yields [`JoinHandle::invalid`] without
//! creating or queueing anything.

use super::{
    errors::{panic_message, SpawnError},
    handle::JoinHandle,
    invoke::{bind, invoke, Bound, Callable},
    pool::TaskPool,
    result::SpawnResult,
    task::Task,
};
use std::{
    ops::Deref,
    panic::{self, AssertUnwindSafe},
    sync::atomic::Ordering,
};
use tokio::sync::oneshot;
use tracing::{debug, warn};


#[inline]
fn catch<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

impl TaskPool {
    /// Queues `callable(args)` and returns a handle to its result.
    pub fn dispatch<C, Args>(&self, callable: C, args: Args) -> JoinHandle<C::Output>
    where
        C: Callable<Args>,
        Args: Send + 'static,
    {
        self.dispatch_opt(Some(callable), args)
    }

    pub fn dispatch_opt<C, Args>(&self, callable: Option<C>, args: Args) -> JoinHandle<C::Output>
    where
        C: Callable<Args>,
        Args: Send + 'static,
    {
        let Some(callable) = callable else {
            debug!("rejected dispatch without a callable");
            return JoinHandle::invalid();
        };

        let (task, handle) = self.package(move || {
            catch(|| invoke(callable, args)).map_err(|msg| {
                warn!(panic = %msg, "task panicked");
                SpawnError::Panic(msg)
            })
        });
        self.push_task(task);
        handle
    }

    /// Queues `task(args)` and hands its value to `callback` on the same
    /// worker.
    ///
    /// The returned handle resolves once both calls are done. If the task
    /// panics the callback never runs and the handle carries
    /// [`SpawnError::Panic`]; a panicking callback yields
    /// [`SpawnError::CallbackPanic`].
    pub fn dispatch_callback<T, CB, Args>(
        &self,
        task: T,
        callback: CB,
        args: Args,
    ) -> JoinHandle<()>
    where
        T: Callable<Args>,
        CB: Callable<(T::Output,)>,
        Args: Send + 'static,
    {
        self.dispatch_callback_opt(Some(task), Some(callback), args)
    }

    pub fn dispatch_callback_opt<T, CB, Args>(
        &self,
        task: Option<T>,
        callback: Option<CB>,
        args: Args,
    ) -> JoinHandle<()>
    where
        T: Callable<Args>,
        CB: Callable<(T::Output,)>,
        Args: Send + 'static,
    {
        let (Some(task), Some(callback)) = (task, callback) else {
            debug!("rejected callback dispatch without a task or callback");
            return JoinHandle::invalid();
        };

        let (task, handle) = self.package(move || {
            let value = catch(|| invoke(task, args)).map_err(|msg| {
                warn!(panic = %msg, "task panicked, callback skipped");
                SpawnError::Panic(msg)
            })?;
            catch(|| {
                invoke(callback, (value,));
            })
            .map_err(|msg| {
                warn!(panic = %msg, "callback panicked");
                SpawnError::CallbackPanic(msg)
            })
        });
        self.push_task(task);
        handle
    }

    /// Calls `task` and then `callback`, both as methods on `instance`.
    pub fn dispatch_bound_callback<I, TF, CF, Args>(
        &self,
        instance: I,
        task: TF,
        callback: CF,
        args: Args,
    ) -> JoinHandle<()>
    where
        I: Deref + Clone,
        Bound<I, TF>: Callable<Args>,
        Bound<I, CF>: Callable<(<Bound<I, TF> as Callable<Args>>::Output,)>,
        Args: Send + 'static,
    {
        self.dispatch_callback(bind(instance.clone(), task), bind(instance, callback), args)
    }

    /// Wraps `work` so that its outcome lands in a fresh result channel.
    fn package<R, F>(&self, work: F) -> (Task, JoinHandle<R>)
    where
        R: Send + 'static,
        F: FnOnce() -> SpawnResult<R> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel::<SpawnResult<R>>();
        let stats = self.stats.clone();

        let task = Task::new(move || {
            let result = work();
            let counter = if result.is_ok() {
                &stats.completed_tasks
            } else {
                &stats.failed_tasks
            };
            counter.fetch_add(1, Ordering::Relaxed);
            // receiver already gone: the value comes back and is dropped here,
            // where a panicking Drop can't unwind through the worker loop
            if let Err(unsent) = tx.send(result) {
                if let Err(msg) = catch(move || drop(unsent)) {
                    warn!(panic = %msg, "dropping an unclaimed result panicked");
                }
            }
        });

        let handle = JoinHandle::new(task.id(), rx);
        (task, handle)
    }
}
