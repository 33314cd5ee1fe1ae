/// Point-in-time snapshot of a [`TaskPool`](crate::pool::TaskPool).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    pub workers: usize,
    pub active_tasks: usize,
    pub idle_workers: usize,
    pub queued_tasks: usize,
    pub total_dispatched: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub abandoned_tasks: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        if self.workers == 0 {
            return 0.0;
        }
        self.active_tasks as f64 / self.workers as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.completed_tasks + self.failed_tasks;
        if total == 0 {
            return 1.0;
        }
        self.completed_tasks as f64 / total as f64
    }

    /// Tasks that reached a final state, whichever it was.
    pub fn finished(&self) -> usize {
        self.completed_tasks + self.failed_tasks + self.abandoned_tasks
    }
}
