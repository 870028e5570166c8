use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Identifies a broadcast for deduplication. Derived from the broadcast's allocation,
/// so it can only be obtained from a live `Broadcast` or one of its guards.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BroadcastId(usize);

impl std::fmt::Display for BroadcastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:#x}", self.0) }
}

/// A notification callback. Cells carry no payload in their notifications;
/// listeners that need the value read it back from the cell.
pub type Listener = Arc<dyn Fn() + Send + Sync + 'static>;

/// A fan-out notifier. Cloning shares the listener set.
#[derive(Clone, Default)]
pub struct Broadcast(Arc<Inner>);

#[derive(Default)]
struct Inner {
    listeners: RwLock<BTreeMap<usize, Listener>>,
    next_id: AtomicUsize,
}

/// A listen-only borrow of a broadcast
pub struct Ref<'a>(&'a Broadcast);

/// Removes its listener from the broadcast when dropped.
/// Does not keep the broadcast alive.
pub struct ListenerGuard {
    inner: Weak<Inner>,
    id: usize,
}

impl std::fmt::Debug for Broadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.0.listeners.read().map(|l| l.len()).unwrap_or_default();
        f.debug_struct("Broadcast").field("id", &self.id()).field("listeners", &listeners).finish()
    }
}

impl Broadcast {
    pub fn new() -> Self { Self::default() }

    pub fn id(&self) -> BroadcastId { BroadcastId(Arc::as_ptr(&self.0) as usize) }

    /// Notify every listener registered at the time of the call.
    pub fn send(&self) {
        // Snapshot so listeners can listen/unlisten re-entrantly
        let listeners: Vec<Listener> = match self.0.listeners.read() {
            Ok(listeners) => listeners.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        };
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize { self.0.listeners.read().map(|l| l.len()).unwrap_or_default() }

    pub fn reference(&self) -> Ref<'_> { Ref(self) }
}

impl Ref<'_> {
    pub fn listen(&self, listener: Listener) -> ListenerGuard {
        let inner = &self.0.0;
        let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
        inner.listeners.write().unwrap_or_else(|e| e.into_inner()).insert(id, listener);
        ListenerGuard { inner: Arc::downgrade(inner), id }
    }

    pub fn broadcast_id(&self) -> BroadcastId { self.0.id() }
}

impl ListenerGuard {
    /// The broadcast this guard listens to. The address stays reserved while the
    /// guard's weak reference exists, so the id cannot be reused underneath us.
    pub fn broadcast_id(&self) -> BroadcastId { BroadcastId(self.inner.as_ptr() as usize) }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.write().unwrap_or_else(|e| e.into_inner()).remove(&self.id);
        }
    }
}
