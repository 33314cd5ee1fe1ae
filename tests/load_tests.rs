#[cfg(test)]
mod tests {
    use task_dispatch::pool::{
        Config,
        TaskPool,
    };
    use parking_lot::Mutex;
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::{Duration, Instant},
    };

    fn measure<F, T>(name: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        println!("✓ {}: {:?}", name, elapsed);
        result
    }

    #[test]
    fn load_test_1_small_fast_tasks() {
        println!("\n=== LOAD TEST 1: 10k small tasks ===");
        let pool = TaskPool::with_config(Config::cpu_bound());
        pool.start().unwrap();

        let sum: u64 = measure("10k tasks", || {
            let handles: Vec<_> = (0..10_000u64)
                .map(|x| pool.dispatch(|x: u64| x * 2, (x,)))
                .collect();
            handles.into_iter().map(|h| h.wait().unwrap()).sum()
        });

        assert_eq!(sum, (0..10_000u64).map(|x| x * 2).sum());
        let metrics = pool.metrics();
        assert_eq!(metrics.completed_tasks, 10_000);
        assert_eq!(metrics.failed_tasks, 0);
        println!("  Success rate: {:.1}%", metrics.success_rate() * 100.0);
    }

    #[test]
    fn load_test_2_each_task_runs_exactly_once() {
        println!("\n=== LOAD TEST 2: exactly-once execution ===");
        let pool = TaskPool::new(8);
        pool.start().unwrap();
        let seen = Arc::new(Mutex::new(Vec::with_capacity(5_000)));

        let handles: Vec<_> = (0..5_000usize)
            .map(|i| {
                let seen = seen.clone();
                pool.dispatch(
                    move || {
                        thread::sleep(Duration::from_micros(10));
                        seen.lock().push(i);
                    },
                    (),
                )
            })
            .collect();
        for handle in handles {
            handle.wait().unwrap();
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 5_000);
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), 5_000);
    }

    #[test]
    fn load_test_3_concurrent_producers() {
        println!("\n=== LOAD TEST 3: 8 producer threads ===");
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 1_000;

        let pool = TaskPool::with_config(Config::io_bound());
        pool.start().unwrap();
        let executed = Arc::new(AtomicUsize::new(0));

        measure("8 x 1k dispatches", || {
            thread::scope(|s| {
                for p in 0..PRODUCERS {
                    let pool = &pool;
                    let executed = executed.clone();
                    s.spawn(move || {
                        let handles: Vec<_> = (0..PER_PRODUCER)
                            .map(|i| {
                                let executed = executed.clone();
                                pool.dispatch(
                                    move |id: usize| {
                                        executed.fetch_add(1, Ordering::SeqCst);
                                        id
                                    },
                                    (p * PER_PRODUCER + i,),
                                )
                            })
                            .collect();
                        for (i, handle) in handles.into_iter().enumerate() {
                            assert_eq!(handle.wait(), Ok(p * PER_PRODUCER + i));
                        }
                    });
                }
            });
        });

        assert_eq!(executed.load(Ordering::SeqCst), PRODUCERS * PER_PRODUCER);
        let metrics = pool.metrics();
        assert_eq!(metrics.total_dispatched, PRODUCERS * PER_PRODUCER);
        assert_eq!(metrics.queued_tasks, 0);
        assert_eq!(metrics.finished(), PRODUCERS * PER_PRODUCER);
    }

    #[test]
    fn load_test_4_blocking_tasks_use_all_workers() {
        println!("\n=== LOAD TEST 4: blocking tasks ===");
        let pool = TaskPool::new(4);
        pool.start().unwrap();

        let elapsed = measure("8 x 50ms on 4 workers", || {
            let start = Instant::now();
            let handles: Vec<_> = (0..8)
                .map(|_| pool.dispatch(|| thread::sleep(Duration::from_millis(50)), ()))
                .collect();
            thread::sleep(Duration::from_millis(20));
            let busy = pool.metrics();
            println!("  Utilization: {:.1}%", busy.utilization() * 100.0);
            assert!(busy.utilization() > 0.0, "workers should be busy");
            for handle in handles {
                handle.wait().unwrap();
            }
            start.elapsed()
        });

        // two waves on four workers, far from the 400ms a single worker needs
        assert!(elapsed < Duration::from_millis(350), "took {:?}", elapsed);
    }

    #[test]
    fn load_test_5_repeated_restart() {
        println!("\n=== LOAD TEST 5: start/stop cycles ===");
        let pool = TaskPool::new(4);

        for round in 0..20 {
            pool.start().unwrap();
            let handles: Vec<_> = (0..50).map(|i| pool.dispatch(move || i + round, ())).collect();
            for (i, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.wait(), Ok(i as i32 + round));
            }
            pool.stop();
            assert_eq!(pool.metrics().workers, 0);
        }
    }
}
