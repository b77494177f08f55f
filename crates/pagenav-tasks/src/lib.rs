//! # pagenav-tasks
//!
//! Named, serialized task queues for client-side navigation flows.
//!
//! ## Features
//!
//! - FIFO execution, at most one task per queue at a time
//! - Per-task delay, measured from when the task reaches the queue head
//! - Semaphore-style suspend / resume
//! - Cancellation by key or by key prefix

pub mod queue;
pub mod task;

pub use queue::TaskQueues;
pub use task::{Task, TaskFn};
