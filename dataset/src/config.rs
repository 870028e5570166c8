use std::{future::Future, sync::Arc, time::Duration};

use dataset_signals::Watch;
use futures::future::{BoxFuture, FutureExt};

/// Delay applied to re-queries triggered by dependency changes unless configured otherwise
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Type-erased query function
pub type QueryFn<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Installs the dependency watcher, given the callback to run on change
pub(crate) type DepsWatch = Box<dyn FnOnce(Box<dyn Fn() + Send + Sync>) -> Watch + Send>;

/// Value used in place of a failed query result
pub enum Fallback<T> {
    /// A fixed value, cloned each time it is used
    Value(T),
    /// Produced on demand; may fail
    Lazy(QueryFn<T>),
}

impl<T> Fallback<T> {
    pub fn value(value: T) -> Self { Self::Value(value) }

    pub fn with<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        Self::Lazy(Arc::new(move || futures::future::ready(Ok(f())).boxed()))
    }

    pub fn with_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: 'static,
    {
        Self::Lazy(Arc::new(move || f().boxed()))
    }
}

impl<T: Clone> Fallback<T> {
    pub async fn resolve(&self) -> anyhow::Result<T> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Lazy(f) => f().await,
        }
    }
}

impl<T> std::fmt::Debug for Fallback<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Fallback::Value"),
            Self::Lazy(_) => f.write_str("Fallback::Lazy"),
        }
    }
}

/// Construction parameters for a [`crate::DatasetService`]
///
/// ```no_run
/// # use dataset::*;
/// # use dataset_signals::{Get, Mut, Peek};
/// # use std::time::Duration;
/// # async fn fetch_page(page: u32) -> anyhow::Result<Vec<String>> { Ok(vec![]) }
/// let page = Mut::new(1);
/// let config = DatasetConfig::new({
///     let page = page.read();
///     move || {
///         let page = page.peek();
///         async move { fetch_page(page).await }
///     }
/// })
/// .fallback(Fallback::value(Vec::new()))
/// .deps({
///     let page = page.read();
///     move || page.get()
/// })
/// .debounce(Duration::from_millis(100))
/// .polling(Duration::from_secs(30));
/// ```
pub struct DatasetConfig<T> {
    pub(crate) query: QueryFn<T>,
    pub(crate) fallback: Option<Fallback<T>>,
    pub(crate) deps: Option<DepsWatch>,
    pub(crate) debounce: Duration,
    pub(crate) polling: Option<Duration>,
}

impl<T> DatasetConfig<T> {
    pub fn new<F, Fut>(query: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: 'static,
    {
        Self { query: Arc::new(move || query().boxed()), fallback: None, deps: None, debounce: DEFAULT_DEBOUNCE, polling: None }
    }

    pub fn fallback(mut self, fallback: Fallback<T>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Re-query (debounced) whenever the accessor's value changes.
    /// The accessor must read its inputs through tracked signal reads (`get`/`with`).
    pub fn deps<D, F>(mut self, get_deps: F) -> Self
    where
        D: PartialEq + Send + 'static,
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.deps = Some(Box::new(move |on_change: Box<dyn Fn() + Send + Sync>| Watch::new(get_deps, on_change)));
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Re-query (undebounced) every `interval`. A zero interval disables polling.
    pub fn polling(mut self, interval: Duration) -> Self {
        self.polling = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn debounce_delay(&self) -> Duration { self.debounce }

    pub fn polling_interval(&self) -> Option<Duration> { self.polling }
}

impl<T> std::fmt::Debug for DatasetConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetConfig")
            .field("fallback", &self.fallback)
            .field("deps", &self.deps.is_some())
            .field("debounce", &self.debounce)
            .field("polling", &self.polling)
            .finish()
    }
}
