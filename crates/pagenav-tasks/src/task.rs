//! Task definition.

use std::fmt;
use std::time::Duration;

/// A queued action. Opaque to the queue, which never inspects it and
/// invokes it at most once.
pub type TaskFn = Box<dyn FnOnce() + Send + 'static>;

/// One deferred action plus its pre-execution delay.
///
/// The delay is measured from the moment the task becomes the head of its
/// queue, not from when it was added.
pub struct Task {
    pub(crate) action: TaskFn,
    pub(crate) delay: Duration,
}

impl Task {
    /// Create a new task.
    pub fn new(action: impl FnOnce() + Send + 'static, delay: Duration) -> Self {
        Self {
            action: Box::new(action),
            delay,
        }
    }

    /// The pre-execution delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new() {
        let task = Task::new(|| {}, Duration::from_millis(250));
        assert_eq!(task.delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_task_debug_omits_action() {
        let task = Task::new(|| {}, Duration::ZERO);
        let debug = format!("{:?}", task);
        assert!(debug.contains("Task"));
        assert!(debug.contains("delay"));
    }

    #[test]
    fn test_task_action_runs_once() {
        let mut hits = 0;
        {
            let task = Task::new(|| {}, Duration::ZERO);
            let action = task.action;
            // FnOnce: consuming the action is the only way to run it.
            action();
            hits += 1;
        }
        assert_eq!(hits, 1);
    }
}
