//! FIFO job queue shared by the pool and its workers
//!
//! The queue carries [`QueueMessage`]s: either a job to run or the stop
//! signal. It is bounded when built with a capacity, in which case
//! [`push`](JobQueue::push) blocks until a worker frees a slot.

use crate::core::{Job, Result, TaskError};
use crossbeam_channel::{self as channel, Receiver, Sender, TryRecvError};
use std::fmt;
use std::sync::Arc;

/// One entry of the job queue
pub enum QueueMessage {
    /// A job to run
    Run(Arc<dyn Job>),
    /// Tells the worker that receives it to exit
    Stop,
}

impl QueueMessage {
    /// The job carried by this message, if any
    pub fn job(&self) -> Option<&Arc<dyn Job>> {
        match self {
            QueueMessage::Run(job) => Some(job),
            QueueMessage::Stop => None,
        }
    }

    /// Whether this is the stop signal
    pub fn is_stop(&self) -> bool {
        matches!(self, QueueMessage::Stop)
    }
}

impl fmt::Debug for QueueMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueMessage::Run(job) => write!(f, "Run({:?})", job),
            QueueMessage::Stop => write!(f, "Stop"),
        }
    }
}

/// Multi-producer multi-consumer FIFO of queue messages
///
/// # Example
///
/// ```rust
/// use task_pool_engine::queue::{JobQueue, QueueMessage};
///
/// let queue = JobQueue::bounded(2);
/// queue.push(QueueMessage::Stop).unwrap();
/// assert_eq!(queue.len(), 1);
/// assert!(queue.pop().unwrap().is_stop());
/// assert!(queue.try_pop().is_none());
/// ```
pub struct JobQueue {
    sender: Sender<QueueMessage>,
    receiver: Receiver<QueueMessage>,
    capacity: Option<usize>,
}

impl JobQueue {
    /// Creates a queue holding at most `capacity` messages.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        let (sender, receiver) = channel::bounded(capacity);
        Self {
            sender,
            receiver,
            capacity: Some(capacity),
        }
    }

    /// Creates a queue without a size limit.
    pub fn unbounded() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            sender,
            receiver,
            capacity: None,
        }
    }

    /// Creates a bounded queue for `Some(capacity)`, unbounded for `None`.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    /// Appends a message, blocking while the queue is full
    pub fn push(&self, message: QueueMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| TaskError::QueueDisconnected)
    }

    /// Removes the oldest message, blocking while the queue is empty
    pub fn pop(&self) -> Result<QueueMessage> {
        self.receiver
            .recv()
            .map_err(|_| TaskError::QueueDisconnected)
    }

    /// Removes the oldest message if there is one
    pub fn try_pop(&self) -> Option<QueueMessage> {
        match self.receiver.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether the queue holds no message
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Whether the queue is at capacity
    pub fn is_full(&self) -> bool {
        self.sender.is_full()
    }

    /// Maximum number of messages, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
