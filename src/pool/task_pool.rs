//! Task pool implementation

use crate::core::{
    default_logger, system_clock, BoxError, DelayTaskJob, Job, JobId, Result, SharedClock,
    SharedLogger, TaskError, TaskJob,
};
use crate::meter::{CountMeter, OutcomeSnapshot};
use crate::pool::worker::{PoolShared, Worker};
use crate::queue::{JobQueue, QueueMessage};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const DEFAULT_PREFIX: &str = "task";

/// Configuration for task pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPoolConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Queue size hint (0 = unbounded)
    ///
    /// A bounded queue never holds fewer slots than there are workers.
    pub jobs: usize,
    /// Thread name prefix, workers are named `{prefix}_{index}`
    pub thread_name_prefix: String,
}

impl Default for TaskPoolConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            jobs: 0,
            thread_name_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl TaskPoolConfig {
    /// Create a configuration with `workers` threads, at least one
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            ..Default::default()
        }
    }

    /// Bound the queue, 0 for unbounded
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set thread name prefix
    ///
    /// An empty prefix falls back to `"task"`.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        let prefix = prefix.into();
        self.thread_name_prefix = if prefix.is_empty() {
            DEFAULT_PREFIX.to_string()
        } else {
            prefix
        };
        self
    }

    /// Capacity of the job queue, `None` when unbounded
    pub fn queue_capacity(&self) -> Option<usize> {
        (self.jobs > 0).then(|| self.jobs.max(self.workers))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(TaskError::invalid_config(
                "workers",
                "Number of workers must be greater than 0",
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(TaskError::invalid_config(
                "thread_name_prefix",
                "Thread name prefix must not be empty",
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Configured number of workers
    pub workers: usize,
    /// Worker threads currently tracked by the pool
    pub threads: usize,
    /// Whether the pool is running
    pub running: bool,
    /// Messages waiting in the queue
    pub queued: usize,
    /// Jobs ever accepted by the pool
    pub registered: usize,
    /// Outcome tally of executed jobs
    pub outcome: OutcomeSnapshot,
}

#[derive(Default)]
struct PoolState {
    registry: IndexMap<JobId, Arc<dyn Job>>,
}

/// A fixed-size pool of worker threads fed by a FIFO job queue
///
/// Jobs can be submitted before the pool is started; they wait in the queue
/// until workers exist. [`barrier`](TaskPool::barrier) waits for every job
/// submitted so far and then resumes with fresh workers.
///
/// Every accepted job stays in the pool registry, retrievable by its id.
/// Ids are handed out from 1 upwards in submission order.
///
/// [`enter`](TaskPool::enter) starts the pool for a scope and shuts it down
/// when the returned [`PoolGuard`] drops. The thread views
/// ([`threads`](TaskPool::threads), [`alive_threads`](TaskPool::alive_threads)
/// and their `other_` variants) are safe to call from inside a job, even
/// while the pool shuts down.
///
/// # Blocking
///
/// Submission holds the pool lock while pushing onto a bounded queue. On a
/// stopped pool, submitting more jobs than the queue holds blocks forever.
///
/// # Example
///
/// ```rust
/// use task_pool_engine::prelude::*;
///
/// let pool = TaskPool::with_workers(2).expect("Failed to create pool");
/// pool.startup().expect("Failed to start pool");
///
/// let job = pool.submit(|| Ok::<_, BoxError>(6 * 7)).expect("Failed to submit");
/// pool.barrier().expect("Failed to wait");
/// assert_eq!(job.result().expect("Job failed"), 42);
///
/// pool.shutdown().expect("Failed to shutdown");
/// ```
pub struct TaskPool {
    config: TaskPoolConfig,
    shared: Arc<PoolShared>,
    state: Mutex<PoolState>,
    // written only with `state` held; shutdown reads it while joining
    workers: RwLock<Vec<Worker>>,
    counter: CountMeter,
    running: AtomicBool,
    clock: SharedClock,
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("config", &self.config)
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("submitted", &self.counter.value())
            .field("queue", &self.shared.queue)
            .finish()
    }
}

impl TaskPool {
    /// Create a pool with specified number of workers
    pub fn with_workers(workers: usize) -> Result<Self> {
        Self::with_config(TaskPoolConfig::new(workers))
    }

    /// Create a pool with custom configuration
    pub fn with_config(config: TaskPoolConfig) -> Result<Self> {
        Self::with_collaborators(config, default_logger(), system_clock())
    }

    /// Create a pool that logs through `logger` and times jobs with `clock`
    pub fn with_collaborators(
        config: TaskPoolConfig,
        logger: SharedLogger,
        clock: SharedClock,
    ) -> Result<Self> {
        config.validate()?;

        let queue = JobQueue::with_capacity(config.queue_capacity());
        Ok(Self {
            config,
            shared: Arc::new(PoolShared::new(queue, logger)),
            state: Mutex::new(PoolState::default()),
            workers: RwLock::new(Vec::new()),
            counter: CountMeter::new(),
            running: AtomicBool::new(false),
            clock,
        })
    }

    /// Start the worker threads
    ///
    /// Calling this on a running pool spawns a second set of workers.
    pub fn startup(&self) -> Result<()> {
        let _state = self.state.lock();
        let prefix = &self.config.thread_name_prefix;
        self.shared
            .logger
            .debug(&format!("Startup {} tasks", prefix));

        let mut workers = self.workers.write();
        for index in 0..self.config.workers {
            let worker = Worker::spawn(format!("{}_{}", prefix, index), Arc::clone(&self.shared))?;
            workers.push(worker);
        }

        self.running.store(true, Ordering::Release);
        Ok(())
    }

    /// Stop the workers after they drain the queue
    ///
    /// Waits for every worker to exit. A pool without workers only clears its
    /// running flag and keeps its queued jobs for the next startup.
    ///
    /// # Errors
    ///
    /// - [`TaskError::UnexecutedJob`] if a job was still queued once the
    ///   workers exited
    /// - [`TaskError::JoinError`] if a worker thread panicked
    /// - the first usage error a worker hit while running a job, such as
    ///   [`TaskError::AlreadyStarted`]
    pub fn shutdown(&self) -> Result<()> {
        let _state = self.state.lock();
        self.shared
            .logger
            .debug(&format!("Shutdown {} tasks", self.config.thread_name_prefix));
        self.running.store(false, Ordering::Release);

        if self.workers.read().is_empty() {
            return Ok(());
        }

        // one stop message is handed from worker to worker
        self.shared.queue.push(QueueMessage::Stop)?;

        let mut join_error = None;
        for worker in self.workers.read().iter() {
            if let Err(e) = worker.join() {
                self.shared.logger.error(&e.to_string());
                if join_error.is_none() {
                    join_error = Some(e);
                }
            }
        }
        self.workers.write().clear();

        let mut leftover = None;
        while let Some(message) = self.shared.queue.try_pop() {
            if let (QueueMessage::Run(job), None) = (&message, leftover) {
                leftover = Some(job.id());
            }
        }

        if let Some(job_id) = leftover {
            return Err(TaskError::unexecuted_job(job_id));
        }
        if let Some(e) = join_error {
            return Err(e);
        }
        match self.shared.take_fault() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Wait for every job submitted so far, then start fresh workers
    pub fn barrier(&self) -> Result<()> {
        self.shutdown()?;
        self.startup()
    }

    /// Stop and start the pool
    pub fn restart(&self) -> Result<()> {
        self.barrier()
    }

    /// Submit a closure to the pool
    ///
    /// The closure's `Err` marks the job as failed; so does a panic.
    pub fn submit<T, E, F>(&self, f: F) -> Result<Arc<TaskJob<T>>>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    {
        let mut state = self.state.lock();
        let id = self.next_job_id();
        let job = Arc::new(TaskJob::with_clock(id, Arc::clone(&self.clock), f));
        self.enqueue(&mut state, job)
    }

    /// Submit a closure that runs once `delay` seconds have passed
    ///
    /// The worker that picks the job up waits out the delay, so delayed jobs
    /// occupy a worker while they wait.
    pub fn submit_delayed<T, E, F>(&self, delay: f64, f: F) -> Result<Arc<DelayTaskJob<T>>>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    {
        let mut state = self.state.lock();
        let id = self.next_job_id();
        let job = Arc::new(DelayTaskJob::with_clock(
            delay,
            id,
            Arc::clone(&self.clock),
            f,
        ));
        self.enqueue(&mut state, job)
    }

    /// Submit a prebuilt job
    ///
    /// # Errors
    ///
    /// - [`TaskError::InvalidJobId`] if the job id is not positive
    /// - [`TaskError::DuplicateJob`] if a job with that id was already accepted
    pub fn submit_job<J: Job + 'static>(&self, job: Arc<J>) -> Result<Arc<J>> {
        let mut state = self.state.lock();
        self.enqueue(&mut state, job)
    }

    fn next_job_id(&self) -> JobId {
        self.counter.increment() as JobId
    }

    fn enqueue<J: Job + 'static>(&self, state: &mut PoolState, job: Arc<J>) -> Result<Arc<J>> {
        let id = job.id();
        if id <= 0 {
            return Err(TaskError::invalid_job_id(id));
        }
        if state.registry.contains_key(&id) {
            return Err(TaskError::duplicate_job(id));
        }

        let entry: Arc<dyn Job> = job.clone();
        self.shared.queue.push(QueueMessage::Run(Arc::clone(&entry)))?;
        state.registry.insert(id, entry);
        Ok(job)
    }

    /// Check if the pool is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Configured number of workers
    pub fn workers(&self) -> usize {
        self.config.workers
    }

    /// Worker thread name prefix
    pub fn thread_name_prefix(&self) -> &str {
        &self.config.thread_name_prefix
    }

    /// Pool configuration
    pub fn config(&self) -> &TaskPoolConfig {
        &self.config
    }

    /// Number of worker threads currently tracked
    pub fn thread_count(&self) -> usize {
        self.workers.read().len()
    }

    /// Names of the worker threads currently tracked
    pub fn threads(&self) -> Vec<String> {
        self.thread_names(|_| true)
    }

    /// Tracked workers that are still running their loop
    pub fn alive_threads(&self) -> Vec<String> {
        self.thread_names(|worker| !worker.is_finished())
    }

    /// Tracked workers other than the calling thread
    pub fn other_threads(&self) -> Vec<String> {
        self.thread_names(|worker| !worker.is_current())
    }

    /// Tracked workers other than the calling thread that are still running
    pub fn other_alive_threads(&self) -> Vec<String> {
        self.thread_names(|worker| !worker.is_current() && !worker.is_finished())
    }

    fn thread_names(&self, keep: impl Fn(&Worker) -> bool) -> Vec<String> {
        self.workers
            .read()
            .iter()
            .filter(|worker| keep(worker))
            .map(|worker| worker.name().to_string())
            .collect()
    }

    /// Messages waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Queue capacity, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.shared.queue.capacity()
    }

    /// Outcome tally of every job executed by this pool
    pub fn status_counter(&self) -> OutcomeSnapshot {
        self.shared.status.snapshot()
    }

    /// Current pool statistics
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            workers: self.config.workers,
            threads: self.thread_count(),
            running: self.is_running(),
            queued: self.shared.queue.len(),
            registered: state.registry.len(),
            outcome: self.shared.status.snapshot(),
        }
    }

    /// Look up an accepted job by id
    pub fn job(&self, id: JobId) -> Option<Arc<dyn Job>> {
        self.state.lock().registry.get(&id).cloned()
    }

    /// Check whether a job id was accepted
    pub fn contains_job(&self, id: JobId) -> bool {
        self.state.lock().registry.contains_key(&id)
    }

    /// Every accepted job in submission order
    pub fn jobs(&self) -> Vec<Arc<dyn Job>> {
        self.state.lock().registry.values().cloned().collect()
    }

    /// Number of accepted jobs
    pub fn len(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Whether no job was accepted yet
    pub fn is_empty(&self) -> bool {
        self.state.lock().registry.is_empty()
    }
}

impl TaskPool {
    /// Start the pool for the lifetime of the returned guard
    ///
    /// Dropping the guard shuts the pool down and logs any error;
    /// [`PoolGuard::finish`] shuts it down and returns the error instead.
    pub fn enter(&self) -> Result<PoolGuard<'_>> {
        self.startup()?;
        Ok(PoolGuard {
            pool: self,
            finished: false,
        })
    }
}

/// A started pool that shuts down when dropped
#[must_use = "the pool shuts down as soon as the guard is dropped"]
#[derive(Debug)]
pub struct PoolGuard<'a> {
    pool: &'a TaskPool,
    finished: bool,
}

impl PoolGuard<'_> {
    /// Shut the pool down now
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.pool.shutdown()
    }
}

impl Deref for PoolGuard<'_> {
    type Target = TaskPool;

    fn deref(&self) -> &TaskPool {
        self.pool
    }
}

impl Drop for PoolGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.pool.shutdown() {
            self.pool.shared.logger.error(&format!(
                "Failed to shutdown task pool '{}' on scope exit: {}",
                self.pool.config.thread_name_prefix, e
            ));
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(e) = self.shutdown() {
                self.shared.logger.error(&format!(
                    "Failed to shutdown task pool '{}' during drop: {}",
                    self.config.thread_name_prefix, e
                ));
            }
        }
    }
}
