use std::{
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::sync::oneshot;
use tracing::Level;

#[ctor::ctor]
fn init_tracing() { let _ = tracing_subscriber::fmt().with_max_level(Level::DEBUG).with_test_writer().try_init(); }

/// Let spawned tasks and zero-delay timers run. Under a paused clock this
/// advances time by a millisecond once everything is idle.
#[allow(unused)]
pub async fn settle() { tokio::time::sleep(Duration::from_millis(1)).await; }

/// A query function whose calls stay pending until the test responds to them
#[allow(unused)]
pub struct Script<T> {
    responders: Mutex<Vec<Option<oneshot::Sender<anyhow::Result<T>>>>>,
}

#[allow(unused)]
impl<T: Send + 'static> Script<T> {
    pub fn new() -> Arc<Self> { Arc::new(Self { responders: Mutex::new(Vec::new()) }) }

    pub fn query(self: &Arc<Self>) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send>> + Send + Sync + 'static {
        let script = self.clone();
        move || {
            let (tx, rx) = oneshot::channel();
            script.responders.lock().unwrap().push(Some(tx));
            Box::pin(async move { rx.await.unwrap_or_else(|_| Err(anyhow::anyhow!("responder dropped"))) })
        }
    }

    pub fn calls(&self) -> usize { self.responders.lock().unwrap().len() }

    /// Resolve the nth call (zero based)
    pub fn respond(&self, call: usize, result: anyhow::Result<T>) {
        let responder = self.responders.lock().unwrap()[call].take().expect("call already answered");
        let _ = responder.send(result);
    }
}

/// A query function resolving immediately with the next scripted result, counting calls
#[allow(unused)]
pub fn sequence<T: Send + 'static>(
    results: Vec<anyhow::Result<T>>,
) -> (Arc<AtomicUsize>, impl Fn() -> futures::future::Ready<anyhow::Result<T>> + Send + Sync + 'static) {
    let calls = Arc::new(AtomicUsize::new(0));
    let results = Mutex::new(results.into_iter());
    let counter = calls.clone();
    let query = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let next = results.lock().unwrap().next().unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")));
        futures::future::ready(next)
    };
    (calls, query)
}
