use std::sync::{Arc, Mutex};

use crate::observer::CallbackObserver;

/// Watches the value produced by an accessor and calls `on_change` whenever
/// a re-evaluation yields a value unequal to the previous one.
///
/// The accessor is re-evaluated when any signal it read (via `get`/`with`)
/// during its last evaluation notifies. Equality is `PartialEq`, which for
/// derived impls compares the whole structure. The initial evaluation only
/// records the value; it never calls `on_change`.
///
/// Dropping the watch, or calling [`Watch::stop`], removes every subscription.
pub struct Watch {
    observer: CallbackObserver,
}

impl Watch {
    pub fn new<D, A, C>(accessor: A, on_change: C) -> Self
    where
        D: PartialEq + Send + 'static,
        A: Fn() -> D + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        let previous: Arc<Mutex<Option<D>>> = Arc::new(Mutex::new(None));
        let observer = CallbackObserver::new(move || {
            let next = accessor();
            let changed = {
                let mut previous = previous.lock().unwrap_or_else(|e| e.into_inner());
                let changed = previous.as_ref().is_some_and(|prev| *prev != next);
                *previous = Some(next);
                changed
            };
            if changed {
                tracing::trace!("watched dependencies changed");
                on_change();
            }
        });
        observer.trigger();
        Self { observer }
    }

    /// Stop watching. Idempotent.
    pub fn stop(&self) { self.observer.clear(); }

    /// Whether the watch still listens to at least one signal
    pub fn is_active(&self) -> bool { self.observer.tracked() > 0 }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Watch").field("tracked", &self.observer.tracked()).finish() }
}
