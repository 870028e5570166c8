use std::sync::Arc;

use crate::{GetReadCell, Read, Signal, signal::ListenerGuard};

/// Boxed listener receiving the new value
pub type SubscribeListener<T> = Box<dyn Fn(T) + Send + Sync + 'static>;

/// Types that can be converted into subscribe listeners
pub trait IntoSubscribeListener<T> {
    fn into_subscribe_listener(self) -> SubscribeListener<T>;
}

/// Subscribe to changes with a listener that receives each new value.
/// The listener is not called with the value present at subscription time.
pub trait Subscribe<T: 'static> {
    fn subscribe<F>(&self, listener: F) -> SubscriptionGuard
    where F: IntoSubscribeListener<T>;
}

/// Keeps a subscription alive; dropping it unsubscribes
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard {
    _listenerguard: ListenerGuard,
}

impl SubscriptionGuard {
    pub fn new(guard: ListenerGuard) -> Self { Self { _listenerguard: guard } }
}

impl<T> Subscribe<T> for Read<T>
where T: Clone + Send + Sync + 'static
{
    fn subscribe<F>(&self, listener: F) -> SubscriptionGuard
    where F: IntoSubscribeListener<T> {
        let listener = listener.into_subscribe_listener();
        let cell = self.get_readcell();
        SubscriptionGuard::new(self.listen(Arc::new(move || listener(cell.value()))))
    }
}

impl<T: Send + 'static> IntoSubscribeListener<T> for std::sync::mpsc::Sender<T> {
    fn into_subscribe_listener(self) -> SubscribeListener<T> {
        Box::new(move |value| {
            let _ = self.send(value);
        })
    }
}

#[cfg(feature = "tokio")]
impl<T: Send + 'static> IntoSubscribeListener<T> for tokio::sync::mpsc::UnboundedSender<T> {
    fn into_subscribe_listener(self) -> SubscribeListener<T> {
        Box::new(move |value| {
            let _ = self.send(value);
        })
    }
}

impl<F, T> IntoSubscribeListener<T> for F
where F: Fn(T) + Send + Sync + 'static
{
    fn into_subscribe_listener(self) -> SubscribeListener<T> { Box::new(self) }
}
