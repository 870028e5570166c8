use crate::{Observer, Signal};
use std::{cell::RefCell, sync::Arc};

// Stack of observers for nested contexts. Accessors run synchronously,
// so the stack only needs to be visible to the thread evaluating them.
thread_local! {
    static OBSERVER_STACK: RefCell<Vec<Arc<dyn Observer>>> = RefCell::new(Vec::new());
}

/// Manages the current observer stack
/// and subscribes the current observer to signals that are read
pub struct CurrentObserver {}

impl CurrentObserver {
    /// Subscribes the current observer (if any) to a signal
    pub fn track<S>(signal: &S)
    where S: Signal {
        // Clone out of the stack so `observe` can re-enter the context
        let current = OBSERVER_STACK.with(|stack| stack.borrow().last().cloned());
        if let Some(observer) = current {
            observer.observe(signal);
        }
    }

    /// Pushes an observer, making it the current context
    pub fn set<O: Observer + 'static>(observer: O) { OBSERVER_STACK.with(|stack| stack.borrow_mut().push(Arc::new(observer))); }

    /// Removes a specific observer from the stack, restoring the previous one
    pub fn remove(observer: &dyn Observer) {
        let target_id = observer.observer_id();
        OBSERVER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.last().is_some_and(|last| last.observer_id() == target_id) {
                stack.pop();
            } else {
                stack.retain(|o| o.observer_id() != target_id);
            }
        });
    }

    pub fn current() -> Option<Arc<dyn Observer>> { OBSERVER_STACK.with(|stack| stack.borrow().last().cloned()) }
}
