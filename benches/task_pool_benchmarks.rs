use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use task_pool_engine::prelude::*;

fn benchmark_task_pool_creation(c: &mut Criterion) {
    c.bench_function("task_pool_creation", |b| {
        b.iter(|| {
            let pool = TaskPool::with_workers(4).expect("Failed to create pool");
            pool.startup().expect("Failed to start pool");
            pool.shutdown().expect("Failed to shutdown pool");
        });
    });
}

fn benchmark_job_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("job_submission");

    // Lightweight jobs
    group.bench_function("lightweight_jobs_100", |b| {
        b.iter_batched(
            || {
                let pool = TaskPool::with_workers(4).expect("Failed to create pool");
                pool.startup().expect("Failed to start pool");
                pool
            },
            |pool| {
                for _ in 0..100 {
                    pool.submit(|| Ok::<_, BoxError>(black_box(1 + 1)))
                        .expect("Failed to submit job");
                }
                pool.shutdown().expect("Failed to shutdown pool");
            },
            BatchSize::SmallInput,
        );
    });

    // Medium workload
    group.bench_function("medium_jobs_100", |b| {
        b.iter_batched(
            || {
                let pool = TaskPool::with_workers(4).expect("Failed to create pool");
                pool.startup().expect("Failed to start pool");
                pool
            },
            |pool| {
                for _ in 0..100 {
                    pool.submit(|| {
                        let mut sum = 0u64;
                        for i in 0..1000 {
                            sum = sum.wrapping_add(i);
                        }
                        Ok::<_, BoxError>(black_box(sum))
                    })
                    .expect("Failed to submit job");
                }
                pool.shutdown().expect("Failed to shutdown pool");
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn benchmark_concurrent_submission(c: &mut Criterion) {
    c.bench_function("concurrent_submission_4_threads", |b| {
        b.iter_batched(
            || {
                let pool = TaskPool::with_workers(4).expect("Failed to create pool");
                pool.startup().expect("Failed to start pool");
                Arc::new(pool)
            },
            |pool| {
                let handles: Vec<_> = (0..4)
                    .map(|_| {
                        let pool = Arc::clone(&pool);
                        thread::spawn(move || {
                            for _ in 0..25 {
                                pool.submit(|| Ok::<_, BoxError>(()))
                                    .expect("Failed to submit job");
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().expect("Submitter panicked");
                }
                pool.shutdown().expect("Failed to shutdown pool");
            },
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_barrier(c: &mut Criterion) {
    let pool = TaskPool::with_workers(4).expect("Failed to create pool");
    pool.startup().expect("Failed to start pool");

    c.bench_function("barrier_after_50_jobs", |b| {
        b.iter(|| {
            for _ in 0..50 {
                pool.submit(|| Ok::<_, BoxError>(())).expect("Failed to submit job");
            }
            pool.barrier().expect("Failed to wait for jobs");
        });
    });

    pool.shutdown().expect("Failed to shutdown pool");
}

fn benchmark_bounded_queue(c: &mut Criterion) {
    c.bench_function("bounded_queue_pressure", |b| {
        b.iter_batched(
            || {
                let config = TaskPoolConfig::new(4).with_jobs(100);
                let pool = TaskPool::with_config(config).expect("Failed to create pool");
                pool.startup().expect("Failed to start pool");
                pool
            },
            |pool| {
                // Submit more than the queue holds
                for _ in 0..150 {
                    pool.submit(|| {
                        thread::sleep(Duration::from_micros(100));
                        Ok::<_, BoxError>(())
                    })
                    .expect("Failed to submit job");
                }
                pool.shutdown().expect("Failed to shutdown pool");
            },
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_named_lock_lookup(c: &mut Criterion) {
    let locks: NamedLock<u64> = NamedLock::new();
    for key in 0..64 {
        locks.lookup(&key);
    }

    c.bench_function("named_lock_lookup_hit", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let key = rng.gen_range(0..64u64);
            let item = locks.lookup(black_box(&key));
            drop(item.lock());
        });
    });
}

criterion_group!(
    benches,
    benchmark_task_pool_creation,
    benchmark_job_submission,
    benchmark_concurrent_submission,
    benchmark_barrier,
    benchmark_bounded_queue,
    benchmark_named_lock_lookup
);
criterion_main!(benches);
