//! Named task queue registry with serialized, delayed execution.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::task::Task;

/// State for a single named queue.
struct Queue {
    /// Pending tasks, FIFO.
    items: VecDeque<Task>,
    /// Handle for the pending deferred step, if one is scheduled.
    timer: Option<AbortHandle>,
    /// POSIX-semaphore style gate; positive means runnable.
    permits: i32,
}

impl Queue {
    fn new() -> Self {
        Self {
            items: VecDeque::new(),
            timer: None,
            permits: 1,
        }
    }

    /// Abort the pending step, if any. No-op on an already-cleared handle.
    fn clear_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

/// Registry of named task queues.
///
/// Each queue executes its tasks one at a time, in enqueue order. Progress
/// is gated by a semaphore-style permit count (see [`suspend`] and
/// [`resume`]) and driven either synchronously or through one-shot deferred
/// steps on the Tokio timer.
///
/// Handles are cheap to clone and share one registry.
///
/// [`suspend`]: TaskQueues::suspend
/// [`resume`]: TaskQueues::resume
#[derive(Clone, Default)]
pub struct TaskQueues {
    queues: Arc<Mutex<HashMap<String, Queue>>>,
}

impl TaskQueues {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task to the queue identified by `key`.
    ///
    /// Returns the number of tasks in the queue afterwards. An empty key
    /// adds nothing and returns the current length for that key (0 when the
    /// queue does not exist). The queue is created on first use with one
    /// permit. Adding never starts execution; callers drive it with
    /// [`run`](TaskQueues::run).
    pub async fn add(
        &self,
        key: &str,
        action: impl FnOnce() + Send + 'static,
        delay: Duration,
    ) -> usize {
        let mut queues = self.queues.lock().await;
        if key.is_empty() {
            return queues.get(key).map_or(0, |queue| queue.items.len());
        }
        let queue = queues.entry(key.to_string()).or_insert_with(Queue::new);
        queue.items.push_back(Task::new(action, delay));
        debug!("Task added to queue {} (len: {})", key, queue.items.len());
        queue.items.len()
    }

    /// Run queued tasks, if not already running.
    ///
    /// No-op when the queue does not exist, is suspended, or already has a
    /// step pending while `sync` is false. With `sync` set the whole queue
    /// is drained on the caller's stack, clearing any pending step first.
    pub async fn run(&self, key: &str, sync: bool) {
        self.advance(key, sync, false).await;
    }

    /// Suspend execution of a queue.
    ///
    /// Each call decrements the permit count; the queue only progresses
    /// while the count is positive, so suspends must be balanced by an
    /// equal number of [`resume`](TaskQueues::resume) calls. A step already
    /// in flight is not interrupted; only the next step is held back.
    pub async fn suspend(&self, key: &str) {
        let mut queues = self.queues.lock().await;
        if let Some(queue) = queues.get_mut(key) {
            queue.permits -= 1;
            debug!("Queue {} suspended (permits: {})", key, queue.permits);
        }
    }

    /// Resume execution of a suspended queue.
    ///
    /// Increments the permit count, then attempts to restart progress.
    pub async fn resume(&self, key: &str, sync: bool) {
        {
            let mut queues = self.queues.lock().await;
            let Some(queue) = queues.get_mut(key) else {
                return;
            };
            queue.permits += 1;
            debug!("Queue {} resumed (permits: {})", key, queue.permits);
        }
        self.run(key, sync).await;
    }

    /// Cancel a queue, discarding its unexecuted tasks. Idempotent.
    pub async fn cancel(&self, key: &str) {
        let mut queues = self.queues.lock().await;
        if let Some(mut queue) = queues.remove(key) {
            queue.clear_timer();
            debug!(
                "Queue {} cancelled ({} tasks dropped)",
                key,
                queue.items.len()
            );
        }
    }

    /// Cancel every queue whose key starts with `prefix`, except the queue
    /// named by `skip`.
    ///
    /// An empty prefix matches all queues. Cancellation order across keys
    /// is unspecified.
    pub async fn cancel_all_except(&self, prefix: &str, skip: Option<&str>) {
        let mut queues = self.queues.lock().await;
        queues.retain(|key, queue| {
            if Some(key.as_str()) == skip || !key.starts_with(prefix) {
                return true;
            }
            queue.clear_timer();
            debug!("Queue {} cancelled", key);
            false
        });
    }

    /// Execute queue steps.
    ///
    /// Synchronous steps drain the queue as a loop on the caller's stack;
    /// asynchronous steps schedule a one-shot deferred continuation after
    /// the head task's delay. `from_step` marks re-entry from that
    /// continuation, whose own handle is the pending one.
    async fn advance(&self, key: &str, sync: bool, mut from_step: bool) {
        loop {
            let task = {
                let mut queues = self.queues.lock().await;
                // The queue may have been cancelled while this step was
                // pending; a stale continuation must not resurrect it.
                let Some(queue) = queues.get_mut(key) else {
                    return;
                };
                // Suspension gates entry from the outside without touching
                // a step already in flight; only a continuation clears its
                // own handle below.
                if !from_step && queue.permits <= 0 {
                    return;
                }
                // A pending step that is not the one entering here means
                // another chain is already driving the queue.
                if queue.timer.is_some() && !sync && !from_step {
                    return;
                }
                queue.clear_timer();
                if queue.permits <= 0 {
                    return;
                }
                let Some(task) = queue.items.pop_front() else {
                    return;
                };
                if !sync {
                    queue.timer = Some(self.spawn_step(key.to_string(), task));
                    return;
                }
                task
            };
            from_step = false;
            (task.action)();
        }
    }

    /// Spawn the deferred step that runs `task` after its delay and then
    /// advances the queue again.
    fn spawn_step(&self, key: String, task: Task) -> AbortHandle {
        let this = self.clone();
        let Task { action, delay } = task;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
            this.advance(&key, false, true).await;
        });
        handle.abort_handle()
    }
}
