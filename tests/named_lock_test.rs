//! Concurrency tests for the named lock registry

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use task_pool_engine::prelude::*;

#[test]
fn test_first_lookup_race_yields_one_lock() {
    let locks: Arc<NamedLock<String>> = Arc::new(NamedLock::new());
    let start = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let locks = Arc::clone(&locks);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                locks.lookup(&"shared".to_string())
            })
        })
        .collect();

    let items: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("lookup thread panicked"))
        .collect();
    assert!(items.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(locks.len(), 1);
}

#[test]
fn test_same_name_serializes_jobs() {
    let locks: Arc<NamedLock<&'static str>> = Arc::new(NamedLock::new());
    let inside = Arc::new(AtomicUsize::new(0));
    let overlap = Arc::new(AtomicUsize::new(0));

    let pool = TaskPool::with_workers(4).expect("Failed to create pool");
    pool.startup().expect("Failed to start pool");
    for _ in 0..20 {
        let locks = Arc::clone(&locks);
        let inside = Arc::clone(&inside);
        let overlap = Arc::clone(&overlap);
        pool.submit(move || {
            let item = locks.lookup(&"resource");
            let _guard = item.lock();
            if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                overlap.fetch_add(1, Ordering::SeqCst);
            }
            thread::yield_now();
            inside.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, BoxError>(())
        })
        .expect("Failed to submit job");
    }
    pool.shutdown().expect("Failed to shutdown pool");

    assert_eq!(overlap.load(Ordering::SeqCst), 0);
    assert_eq!(pool.status_counter().success, 20);
    assert_eq!(locks.names(), vec!["resource"]);
}

#[test]
fn test_distinct_names_do_not_block() {
    let locks: NamedLock<u32> = NamedLock::new();
    let a = locks.lookup(&1);
    let b = locks.lookup(&2);
    let _held = a.lock();
    assert!(a.is_locked());
    assert!(b.try_lock().is_some());
    assert_eq!(locks.len(), 2);
}
