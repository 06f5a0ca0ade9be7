//! Delayed jobs example
//!
//! Submits two delayed jobs to a single worker and renews the first one
//! while the worker is already waiting on it, pushing both back.
//!
//! Run with: `RUST_LOG=debug cargo run --example delayed_jobs`

use std::time::Instant;
use task_pool_engine::prelude::*;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Task Pool Engine - Delayed Jobs Example ===\n");

    let origin = Instant::now();
    let pool = TaskPool::with_workers(1)?;
    pool.startup()?;

    let first = pool.submit_delayed(1.0, move || {
        Ok::<_, BoxError>(origin.elapsed().as_secs_f64())
    })?;
    let second = pool.submit_delayed(1.5, move || {
        Ok::<_, BoxError>(origin.elapsed().as_secs_f64())
    })?;
    // push the first job back behind the second one's deadline
    first.renew(Some(2.0));

    println!("1. Submitted {} and {}", first, second);
    pool.shutdown()?;

    println!("\n2. Start offsets:");
    for job in [&first, &second] {
        println!(
            "   Job{} waited {:.2}s (delay {}s)",
            job.id(),
            job.result()?,
            job.delay_time()
        );
    }

    // NamedLock guards per-key sections across jobs
    let locks: NamedLock<&str> = NamedLock::new();
    let report = locks.lookup(&"report");
    let _guard = report.lock();
    println!("\n3. Holding lock {:?}: {}", report.name(), report.is_locked());

    println!("\n=== Example completed successfully ===");
    Ok(())
}
