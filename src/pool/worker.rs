//! Worker thread implementation

use crate::core::{Result, SharedLogger, TaskError};
use crate::meter::StatusCountMeter;
use crate::queue::{JobQueue, QueueMessage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// State shared by a pool and all of its workers
#[derive(Debug)]
pub(crate) struct PoolShared {
    pub(crate) queue: JobQueue,
    pub(crate) status: StatusCountMeter,
    pub(crate) logger: SharedLogger,
    // first usage error hit by a worker, reported by the next shutdown
    fault: Mutex<Option<TaskError>>,
}

impl PoolShared {
    pub(crate) fn new(queue: JobQueue, logger: SharedLogger) -> Self {
        Self {
            queue,
            status: StatusCountMeter::new(),
            logger,
            fault: Mutex::new(None),
        }
    }

    fn record_fault(&self, error: TaskError) {
        let mut fault = self.fault.lock();
        if fault.is_none() {
            *fault = Some(error);
        }
    }

    pub(crate) fn take_fault(&self) -> Option<TaskError> {
        self.fault.lock().take()
    }
}

// cleared when the worker thread leaves its loop, panicking or not
struct AliveFlag(Arc<AtomicBool>);

impl Drop for AliveFlag {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A worker thread that runs jobs from the pool queue
///
/// Joining only needs a shared reference, so the pool can keep its workers
/// visible to running jobs while it waits for them.
#[derive(Debug)]
pub struct Worker {
    name: String,
    id: thread::ThreadId,
    alive: Arc<AtomicBool>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Worker {
    /// Spawn a worker thread named `name`
    ///
    /// The worker runs until it receives the stop message, which it puts back
    /// on the queue for the next worker before exiting.
    pub(crate) fn spawn(name: String, shared: Arc<PoolShared>) -> Result<Self> {
        let thread_name = name.clone();
        let alive = Arc::new(AtomicBool::new(true));
        let flag = AliveFlag(Arc::clone(&alive));
        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let _flag = flag;
                Self::run(&thread_name, &shared)
            })
            .map_err(|e| TaskError::spawn_with_source(name.clone(), e))?;

        Ok(Self {
            name,
            id: thread.thread().id(),
            alive,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread has left its run loop
    pub fn is_finished(&self) -> bool {
        !self.alive.load(Ordering::Acquire)
    }

    /// Whether this worker is the calling thread
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.id
    }

    /// Join the worker thread
    ///
    /// Joining a second time returns immediately.
    pub fn join(&self) -> Result<()> {
        let thread = self.thread.lock().take();
        if let Some(thread) = thread {
            thread
                .join()
                .map_err(|_| TaskError::join(&self.name, "Worker panicked"))?;
        }
        Ok(())
    }

    /// Main worker loop
    fn run(name: &str, shared: &PoolShared) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("task_worker", name = name).entered();

        let local = StatusCountMeter::new();
        shared
            .logger
            .debug(&format!("Task thread {} is running", name));

        loop {
            let job = match shared.queue.pop() {
                Ok(QueueMessage::Run(job)) => job,
                Ok(QueueMessage::Stop) => {
                    // hand the stop signal on to the next worker
                    if let Err(e) = shared.queue.push(QueueMessage::Stop) {
                        shared
                            .logger
                            .error(&format!("Task thread {} cannot pass on stop: {}", name, e));
                    }
                    break;
                }
                Err(e) => {
                    shared
                        .logger
                        .error(&format!("Task thread {} lost its queue: {}", name, e));
                    break;
                }
            };

            let ok = match job.run() {
                Ok(ok) => ok,
                Err(error) => {
                    shared.logger.error(&format!(
                        "Task thread {} cannot run Job{}: {}",
                        name,
                        job.id(),
                        error
                    ));
                    shared.record_fault(error);
                    false
                }
            };
            shared.status.increment(ok);
            local.increment(ok);
        }

        let summary = local.snapshot();
        shared.logger.debug(&format!(
            "Task thread {} is stopped, {} jobs: {} success and {} failure",
            name, summary.total, summary.success, summary.failure
        ));
    }
}
