use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

/// Resolves once a query attempt has settled, whether its result was applied,
/// discarded as stale, or the attempt was superseded before it ran.
///
/// Cloneable; every clone resolves together.
#[derive(Clone)]
pub struct Loaded(Shared<BoxFuture<'static, ()>>);

/// Settles the paired [`Loaded`] when sent or dropped
pub(crate) struct Settle(oneshot::Sender<()>);

impl Loaded {
    pub(crate) fn pending() -> (Settle, Self) {
        let (tx, rx) = oneshot::channel();
        // a dropped sender means the attempt was abandoned, which also counts as settled
        (Settle(tx), Self(rx.map(|_| ()).boxed().shared()))
    }

    pub(crate) fn settled() -> Self { Self(futures::future::ready(()).boxed().shared()) }

    /// Whether the attempt has already settled, without waiting
    pub fn is_settled(&self) -> bool { self.0.clone().now_or_never().is_some() }
}

impl Settle {
    pub(crate) fn send(self) { let _ = self.0.send(()); }
}

impl Future for Loaded {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> { Pin::new(&mut self.0).poll(cx) }
}

impl std::fmt::Debug for Loaded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Loaded").field("settled", &self.0.peek().is_some()).finish() }
}
