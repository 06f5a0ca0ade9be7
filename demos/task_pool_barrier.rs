//! Barrier example
//!
//! Four workers run nine jobs of uneven length; the barrier returns once all
//! of them are done and the pool keeps going with fresh workers.
//!
//! Run with: `RUST_LOG=debug cargo run --example task_pool_barrier`

use std::thread;
use std::time::Duration;
use task_pool_engine::prelude::*;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Task Pool Engine - Barrier Example ===\n");

    let pool = TaskPool::with_config(TaskPoolConfig::new(4).with_thread_name_prefix("demo"))?;
    println!("1. Starting task pool with {} workers", pool.workers());
    pool.startup()?;

    println!("\n2. Submitting 9 jobs:");
    let mut jobs = Vec::new();
    for i in 0..9u64 {
        let job = pool.submit(move || {
            thread::sleep(Duration::from_millis(20 * (i % 4)));
            if i == 7 {
                return Err(format!("job input {} rejected", i));
            }
            Ok(i * 10)
        })?;
        jobs.push(job);
    }
    println!("   Submitted {} jobs, {} queued", jobs.len(), pool.queue_len());

    println!("\n3. Waiting at the barrier");
    pool.barrier()?;

    for job in &jobs {
        match job.result() {
            Ok(value) => println!(
                "   Job{} -> {} in {:.3}s",
                job.id(),
                value,
                job.running_timer().runtime()
            ),
            Err(e) => println!("   {}", e),
        }
    }

    let status = pool.status_counter();
    println!(
        "\n4. {} jobs: {} success and {} failure ({:.0}% success)",
        status.total,
        status.success,
        status.failure,
        status.success_rate()
    );

    pool.shutdown()?;
    println!("\n=== Example completed successfully ===");
    Ok(())
}
