use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Handle for a registered cleanup callback, used to remove it again
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId(usize);

type Task<R> = Box<dyn FnOnce() -> R + Send + 'static>;

/// An ordered registry of cleanup callbacks that are run (at most) once.
///
/// Registering the same logic twice yields two entries. [`TaskManager::run`] swaps
/// the registry out before invoking anything, so callbacks registered while
/// running land in the next batch and nothing is invoked twice. A panicking
/// callback propagates to the caller of `run` and the remaining callbacks of
/// that batch are dropped without being called.
pub struct TaskManager<R = ()> {
    tasks: Mutex<Vec<(TaskId, Task<R>)>>,
    next_id: AtomicUsize,
}

impl<R> Default for TaskManager<R> {
    fn default() -> Self { Self { tasks: Mutex::new(Vec::new()), next_id: AtomicUsize::new(0) } }
}

impl<R> std::fmt::Debug for TaskManager<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("TaskManager").field("tasks", &self.len()).finish() }
}

impl<R> TaskManager<R> {
    pub fn new() -> Self { Self::default() }

    pub fn add<F>(&self, task: F) -> TaskId
    where F: FnOnce() -> R + Send + 'static {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Box::new(task)));
        id
    }

    /// Unregister a callback without running it. Returns false if it was not registered.
    pub fn remove(&self, id: TaskId) -> bool {
        let mut tasks = self.lock();
        match tasks.iter().position(|(task_id, _)| *task_id == id) {
            Some(index) => {
                tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Run every registered callback in registration order and return their results
    pub fn run(&self) -> Vec<R> {
        let tasks = std::mem::take(&mut *self.lock());
        tasks.into_iter().map(|(_, task)| task()).collect()
    }

    pub fn len(&self) -> usize { self.lock().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(TaskId, Task<R>)>> { self.tasks.lock().unwrap_or_else(|e| e.into_inner()) }
}
