use crate::{
    broadcast::{Broadcast, BroadcastId},
    context::CurrentObserver,
    signal::{Get, GetReadCell, Listener, ListenerGuard, Peek, Signal, With},
    value::ReadValueCell,
};

/// Read-only signal
pub struct Read<T> {
    pub(crate) value: ReadValueCell<T>,
    pub(crate) broadcast: Broadcast,
}

impl<T> Clone for Read<T> {
    fn clone(&self) -> Self { Self { value: self.value.clone(), broadcast: self.broadcast.clone() } }
}

impl<T: 'static> With<T> for Read<T> {
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        CurrentObserver::track(self);
        self.value.with(f)
    }
}

impl<T: Clone + 'static> Get<T> for Read<T> {
    fn get(&self) -> T {
        CurrentObserver::track(self);
        self.value.value()
    }
}

impl<T: Clone + 'static> Peek<T> for Read<T> {
    fn peek(&self) -> T { self.value.value() }
}

impl<T: 'static> GetReadCell<T> for Read<T> {
    fn get_readcell(&self) -> ReadValueCell<T> { self.value.clone() }
}

impl<T> Signal for Read<T> {
    fn listen(&self, listener: Listener) -> ListenerGuard { self.broadcast.reference().listen(listener) }

    fn broadcast_id(&self) -> BroadcastId { self.broadcast.id() }
}

impl<T: std::fmt::Display + 'static> std::fmt::Display for Read<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.with(|v| write!(f, "{}", v)) }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Read<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.value.with(|v| f.debug_tuple("Read").field(v).finish()) }
}
