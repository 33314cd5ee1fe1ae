use super::task::Task;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

struct QueueState {
    tasks: VecDeque<Task>,
    running: bool,
    epoch: u64,
}

/// FIFO shared by every worker of a pool.
///
/// The `running` flag lives under the same lock as the tasks, and every
/// notification is issued while that lock is held, so a worker can never
/// miss a wakeup between checking its predicate and going to sleep.
pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                running: false,
                epoch: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends a task and wakes exactly one waiting worker.
    pub fn push(&self, task: Task) {
        let mut state = self.state.lock();
        state.tasks.push_back(task);
        self.available.notify_one();
    }

    /// Blocks until a task is available or the queue is closed.
    ///
    /// `epoch` is the value `open` returned to the caller's generation of
    /// workers. Returns `None` once the queue has been closed or reopened for
    /// a newer generation; `close` drains the tasks in the same critical
    /// section, so a closed queue is always empty.
    pub fn pop_or_wait(&self, epoch: u64) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if !state.running || state.epoch != epoch {
                return None;
            }
            if let Some(task) = state.tasks.pop_front() {
                return Some(task);
            }
            self.available.wait(&mut state);
        }
    }

    /// Marks the queue running for a new generation of workers.
    pub fn open(&self) -> u64 {
        let mut state = self.state.lock();
        state.running = true;
        state.epoch += 1;
        state.epoch
    }

    /// Clears the running flag, wakes every worker and hands back whatever
    /// was still waiting to be popped.
    pub fn close(&self) -> Vec<Task> {
        let mut state = self.state.lock();
        state.running = false;
        let drained = state.tasks.drain(..).collect();
        self.available.notify_all();
        drained
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }
}
