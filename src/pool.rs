use super::{
    errors::PoolError,
    model::PoolMetrics,
    queue::TaskQueue,
    result::PoolResult,
    task::Task,
};
use std::{
    cell::Cell,
    mem,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle as ThreadHandle},
};
use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

thread_local! {
    static IN_WORKER: Cell<bool> = const { Cell::new(false) };
}


/// Worker pool settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of workers; `0` means one per hardware thread.
    pub num_threads: usize,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            thread_name_prefix: "task-worker".to_string(),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn cpu_bound() -> Self {
        Self::default()
    }

    pub fn io_bound() -> Self {
        Self {
            num_threads: num_cpus::get() * 2, // workers mostly sit in blocking calls
            ..Default::default()
        }
    }

    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    fn resolved_threads(&self) -> usize {
        if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        }
    }
}


#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    pub live_workers: AtomicUsize,
    pub active_tasks: AtomicUsize,
    pub total_dispatched: AtomicUsize,
    pub completed_tasks: AtomicUsize,
    pub failed_tasks: AtomicUsize,
    pub abandoned_tasks: AtomicUsize,
}

struct WorkerHandle {
    id: usize,
    thread: ThreadHandle<()>,
}

#[derive(Default)]
struct WorkerSet {
    current: Vec<WorkerHandle>,
    // workers that stopped their own pool from inside a task; joined by the next stop
    detached: Vec<WorkerHandle>,
}

impl WorkerSet {
    fn take_all(&mut self) -> Vec<WorkerHandle> {
        let mut handles = mem::take(&mut self.current);
        handles.append(&mut self.detached);
        handles
    }
}


/// Fixed-size pool of OS threads draining one shared FIFO.
///
/// The pool is created stopped. Work can be dispatched at any time; it is
/// executed once [`start`](TaskPool::start) has brought the workers up.
pub struct TaskPool {
    config: Config,
    queue: Arc<TaskQueue>,
    pub(crate) stats: Arc<PoolStats>,
    workers: Mutex<WorkerSet>,
}

impl TaskPool {
    pub fn new(num_threads: usize) -> Self {
        Self::with_config(Config::default().num_threads(num_threads))
    }

    pub fn with_config(mut config: Config) -> Self {
        config.num_threads = config.resolved_threads();
        Self {
            config,
            queue: Arc::new(TaskQueue::new()),
            stats: Arc::new(PoolStats::default()),
            workers: Mutex::new(WorkerSet::default()),
        }
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.config.num_threads
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    /// Spawns every worker and returns once all of them are inside their loop.
    ///
    /// Does nothing if the pool is already running. If a worker fails to
    /// spawn, the ones already started are stopped again and the error is
    /// returned.
    pub fn start(&self) -> PoolResult<()> {
        let mut workers = self.workers.lock();
        if self.queue.is_running() {
            debug!("start called on a running pool");
            return Ok(());
        }

        let epoch = self.queue.open();
        let ready = WaitGroup::new();

        for id in 0..self.config.num_threads {
            let worker = Worker {
                id,
                epoch,
                queue: self.queue.clone(),
                stats: self.stats.clone(),
            };
            let ready = ready.clone();

            let mut builder = thread::Builder::new()
                .name(format!("{}-{}", self.config.thread_name_prefix, id));
            if let Some(stack_size) = self.config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            match builder.spawn(move || worker.run(ready)) {
                Ok(thread) => workers.current.push(WorkerHandle { id, thread }),
                Err(source) => {
                    error!(worker = id, %source, "failed to spawn worker");
                    self.close_queue();
                    let handles = workers.take_all();
                    drop(workers);
                    self.join_workers(handles);
                    return Err(PoolError::WorkerSpawn { id, source });
                }
            }
        }

        ready.wait();
        info!(workers = workers.current.len(), epoch, "task pool started");
        Ok(())
    }

    /// Signals shutdown, wakes every worker and joins them.
    ///
    /// Tasks still queued are dropped without running; their handles resolve
    /// to [`SpawnError::Abandoned`](crate::errors::SpawnError::Abandoned).
    /// Stopping a stopped pool is a no-op, and a stopped pool can be started
    /// again with a fresh set of workers.
    ///
    /// May be called from inside a task. The calling worker is not joined;
    /// it finishes its task, exits, and is joined by the next `stop` or drop.
    pub fn stop(&self) {
        // a worker never joins detached threads: one of them may be joining it
        let on_worker = IN_WORKER.with(Cell::get);
        let handles = {
            let mut workers = self.workers.lock();
            let running = self.queue.is_running();
            if !running && workers.current.is_empty() && (on_worker || workers.detached.is_empty()) {
                return;
            }
            if running {
                self.close_queue();
            }
            if on_worker {
                mem::take(&mut workers.current)
            } else {
                workers.take_all()
            }
        };
        // joined without the lock so a task calling stop() concurrently can't deadlock us
        self.join_workers(handles);
        info!("task pool stopped");
    }

    fn close_queue(&self) {
        let abandoned = self.queue.close();
        if !abandoned.is_empty() {
            warn!(count = abandoned.len(), "dropping tasks that never ran");
            self.stats
                .abandoned_tasks
                .fetch_add(abandoned.len(), Ordering::Relaxed);
        }
    }

    fn join_workers(&self, handles: Vec<WorkerHandle>) {
        let current = thread::current().id();
        for worker in handles {
            if worker.thread.thread().id() == current {
                self.workers.lock().detached.push(worker);
                continue;
            }
            if worker.thread.join().is_err() {
                warn!(worker = worker.id, "worker thread panicked");
            }
        }
    }

    pub(crate) fn push_task(&self, task: Task) {
        self.stats.total_dispatched.fetch_add(1, Ordering::Relaxed);
        trace!(task = %task.id(), "task queued");
        self.queue.push(task);
    }

    pub fn metrics(&self) -> PoolMetrics {
        let workers = self.stats.live_workers.load(Ordering::Relaxed);
        let active_tasks = self.stats.active_tasks.load(Ordering::Relaxed);
        PoolMetrics {
            workers,
            active_tasks,
            idle_workers: workers.saturating_sub(active_tasks),
            queued_tasks: self.queue.len(),
            total_dispatched: self.stats.total_dispatched.load(Ordering::Relaxed),
            completed_tasks: self.stats.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.stats.failed_tasks.load(Ordering::Relaxed),
            abandoned_tasks: self.stats.abandoned_tasks.load(Ordering::Relaxed),
        }
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.stop();
    }
}


struct Worker {
    id: usize,
    epoch: u64,
    queue: Arc<TaskQueue>,
    stats: Arc<PoolStats>,
}

impl Worker {
    fn run(self, ready: WaitGroup) {
        IN_WORKER.with(|flag| flag.set(true));
        self.stats.live_workers.fetch_add(1, Ordering::Relaxed);
        drop(ready);
        debug!(worker = self.id, "worker started");

        while let Some(task) = self.queue.pop_or_wait(self.epoch) {
            let id = task.id();
            let waited = task.enqueued_at().elapsed();

            self.stats.active_tasks.fetch_add(1, Ordering::Relaxed);
            task.execute();
            self.stats.active_tasks.fetch_sub(1, Ordering::Relaxed);

            trace!(worker = self.id, task = %id, ?waited, "task executed");
        }

        self.stats.live_workers.fetch_sub(1, Ordering::Relaxed);
        debug!(worker = self.id, "worker exiting");
    }
}
