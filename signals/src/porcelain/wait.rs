use crate::signal::{GetReadCell, Signal};

/// Wait asynchronously for a signal to reach a value
pub trait Wait<T: 'static> {
    /// Resolves once the signal equals `target_value`
    fn wait_value(&self, target_value: T) -> impl std::future::Future<Output = ()> + Send
    where T: PartialEq + Send + Sync;

    /// Resolves once `predicate` produces a result for the current value
    fn wait_for<F, R>(&self, predicate: F) -> impl std::future::Future<Output = R::Output> + Send
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: WaitResult,
        T: Send + Sync;
}

/// Lets `wait_for` predicates return either `bool` or `Option<_>`.
///
/// - `result()` returns `Some(output)` to stop waiting and return `output`
/// - `result()` returns `None` to keep waiting for the next change
pub trait WaitResult {
    type Output;
    fn result(self) -> Option<Self::Output>;
}

impl WaitResult for bool {
    type Output = ();
    fn result(self) -> Option<Self::Output> { if self { Some(()) } else { None } }
}

impl<T> WaitResult for Option<T> {
    type Output = T;
    fn result(self) -> Option<Self::Output> { self }
}

#[cfg(feature = "tokio")]
impl<T, S> Wait<T> for S
where
    S: Signal + GetReadCell<T> + Sync,
    T: Send + Sync + 'static,
{
    fn wait_value(&self, target_value: T) -> impl std::future::Future<Output = ()> + Send
    where T: PartialEq + Send + Sync {
        self.wait_for(move |value| *value == target_value)
    }

    fn wait_for<F, R>(&self, predicate: F) -> impl std::future::Future<Output = R::Output> + Send
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: WaitResult,
        T: Send + Sync,
    {
        use std::sync::Arc;

        // Subscribe before the first check so a change in between is not missed
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        let subscription = self.listen(Arc::new(move || {
            let _ = tx.send(());
        }));
        let cell = self.get_readcell();

        async move {
            let _subscription = subscription;
            loop {
                if let Some(result) = cell.with(|value| predicate(value).result()) {
                    return result;
                }
                if rx.recv().await.is_none() {
                    // the sender lives in our own listener, which we hold
                    unreachable!("wait_for listener dropped while waiting");
                }
            }
        }
    }
}
