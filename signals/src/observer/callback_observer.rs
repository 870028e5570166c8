use super::Observer;
use crate::{CurrentObserver, Signal, broadcast::BroadcastId, signal::ListenerGuard};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard, Weak};

/// Wraps a callback which is re-run whenever any signal it read during its
/// previous run changes. Each run re-tracks its signals with mark-and-sweep.
#[derive(Clone)]
pub struct CallbackObserver(Arc<Inner>);

struct SubscriptionEntry {
    _guard: ListenerGuard,
    marked_for_removal: bool,
}

struct Inner {
    callback: Box<dyn Fn() + Send + Sync>,
    entries: RwLock<HashMap<BroadcastId, SubscriptionEntry>>,
}

struct WeakCallbackObserver(Weak<Inner>);

impl WeakCallbackObserver {
    fn upgrade(&self) -> Option<CallbackObserver> { self.0.upgrade().map(CallbackObserver) }
}

impl CallbackObserver {
    pub fn new<F: Fn() + Send + Sync + 'static>(callback: F) -> Self {
        Self(Arc::new(Inner { callback: Box::new(callback), entries: RwLock::new(HashMap::new()) }))
    }

    /// Run the callback with this observer as the current context
    pub fn trigger(&self) { self.with_context(&self.0.callback); }

    /// Execute a function with this observer as the current context
    pub fn with_context<F: Fn() + ?Sized>(&self, f: &F) {
        self.mark_all_for_removal();

        CurrentObserver::set(self.clone());
        f();
        CurrentObserver::remove(self);

        self.sweep_marked_listeners();
    }

    /// Drop every subscription. The observer stays usable; the next trigger re-tracks.
    pub fn clear(&self) { self.entries().clear(); }

    /// Number of signals currently observed
    pub fn tracked(&self) -> usize { self.0.entries.read().map(|e| e.len()).unwrap_or_default() }

    fn entries(&self) -> RwLockWriteGuard<'_, HashMap<BroadcastId, SubscriptionEntry>> {
        self.0.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn mark_all_for_removal(&self) {
        for entry in self.entries().values_mut() {
            entry.marked_for_removal = true;
        }
    }

    fn sweep_marked_listeners(&self) { self.entries().retain(|_, entry| !entry.marked_for_removal); }
}

impl Observer for CallbackObserver {
    fn observe(&self, signal: &dyn Signal) {
        let broadcast_id = signal.broadcast_id();
        let mut entries = self.entries();

        if let Some(entry) = entries.get_mut(&broadcast_id) {
            // already listening, keep it through the sweep
            entry.marked_for_removal = false;
            return;
        }

        let weak = WeakCallbackObserver(Arc::downgrade(&self.0));
        let guard = signal.listen(Arc::new(move || {
            if let Some(observer) = weak.upgrade() {
                observer.trigger();
            }
        }));
        entries.insert(broadcast_id, SubscriptionEntry { _guard: guard, marked_for_removal: false });
    }

    fn observer_id(&self) -> usize { Arc::as_ptr(&self.0) as usize }
}
