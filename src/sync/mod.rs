//! Synchronization helpers

mod named_lock;

pub use named_lock::{LockItem, NamedLock};
