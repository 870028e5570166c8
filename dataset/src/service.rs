use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use dataset_signals::{Mut, Peek, Read};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    config::{DatasetConfig, Fallback, QueryFn},
    error::DatasetError,
    loaded::{Loaded, Settle},
    strategy::{DataStrategy, Replace},
    task_manager::TaskManager,
};

/// Loads a dataset through an async query function and exposes the result
/// through observable cells.
///
/// Every query attempt is tagged with a generation. An attempt's outcome (its
/// data, its fallback, clearing `loading`) is applied only if no newer attempt
/// has started since; older attempts still run to completion but their results
/// are discarded. Query failures never reach the caller: they are recovered by
/// the fallback, or leave the previous data in place.
///
/// Must be constructed inside a tokio runtime; timers, attempts and polling
/// are spawned onto that runtime, so triggers may come from any thread. The
/// first query is issued immediately, without debounce.
pub struct DatasetService<T>(Arc<Inner<T>>);

impl<T> Clone for DatasetService<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

struct Inner<T> {
    query: QueryFn<T>,
    fallback: Option<Fallback<T>>,
    strategy: Arc<dyn DataStrategy<T>>,
    debounce: Duration,

    data: Mut<Option<T>>,
    loading: Mut<bool>,
    error: Mut<Option<DatasetError>>,
    loaded: Mutex<Loaded>,

    generation: AtomicU64,
    // at most one debounce timer is pending at a time
    pending: Mutex<Option<JoinHandle<()>>>,
    tasks: TaskManager,
    disposed: AtomicBool,
    runtime: Handle,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> { mutex.lock().unwrap_or_else(|e| e.into_inner()) }

impl<T> DatasetService<T>
where T: Clone + Send + Sync + 'static
{
    /// Service whose results replace each other
    pub fn new(config: DatasetConfig<T>) -> Self { Self::with_strategy(config, Arc::new(Replace)) }

    pub fn with_strategy(config: DatasetConfig<T>, strategy: Arc<dyn DataStrategy<T>>) -> Self {
        let DatasetConfig { query, fallback, deps, debounce, polling } = config;
        let inner = Arc::new(Inner {
            query,
            fallback,
            strategy,
            debounce,
            data: Mut::new(None),
            loading: Mut::new(false),
            error: Mut::new(None),
            loaded: Mutex::new(Loaded::settled()),
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
            tasks: TaskManager::new(),
            disposed: AtomicBool::new(false),
            runtime: Handle::current(),
        });

        {
            let weak = Arc::downgrade(&inner);
            inner.tasks.add(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.cancel_pending();
                }
            });
        }

        if let Some(install) = deps {
            let weak = Arc::downgrade(&inner);
            let watch = install(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    debug!("dataset dependencies changed");
                    inner.trigger_query(true);
                }
            }));
            inner.tasks.add(move || watch.stop());
        }

        if let Some(interval) = polling {
            let handle = inner.start_polling(interval);
            inner.tasks.add(move || handle.abort());
        }

        inner.trigger_query(false);
        Self(inner)
    }

    /// Schedule a new query attempt, superseding any attempt started before it.
    ///
    /// With `use_debounce`, the query runs after the configured debounce delay
    /// and a later trigger within that window replaces this one. Returns the
    /// future that settles with this attempt (also available as [`Self::loaded`]).
    pub fn trigger_query(&self, use_debounce: bool) -> Loaded { self.0.trigger_query(use_debounce) }

    /// Re-query now, without debounce
    pub fn refresh(&self) -> Loaded { self.0.trigger_query(false) }
}

impl<T> DatasetService<T> {
    /// The most recently accepted data; `None` until a query or fallback succeeds
    pub fn data(&self) -> Read<Option<T>> { self.0.data.read() }

    /// True while the latest attempt has not settled
    pub fn loading(&self) -> Read<bool> { self.0.loading.read() }

    /// The most recent failure of a current attempt; cleared by the next accepted result
    pub fn error(&self) -> Read<Option<DatasetError>> { self.0.error.read() }

    /// Settles when the most recently scheduled attempt settles
    pub fn loaded(&self) -> Loaded { lock(&self.0.loaded).clone() }

    /// Number of attempts scheduled so far
    pub fn generation(&self) -> u64 { self.0.generation.load(Ordering::SeqCst) }

    /// Cancel the pending debounce timer and polling, and stop watching dependencies.
    /// Attempts already running still settle. A cancelled timer clears `loading`.
    /// Later triggers are ignored.
    pub fn dispose(&self) { self.0.dispose(); }

    pub fn is_disposed(&self) -> bool { self.0.disposed.load(Ordering::SeqCst) }
}

impl<T> std::fmt::Debug for DatasetService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetService")
            .field("generation", &self.generation())
            .field("loading", &self.0.loading.peek())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl<T> Inner<T> {
    fn is_current(&self, generation: u64) -> bool { self.generation.load(Ordering::SeqCst) == generation }

    /// Returns true if a timer was cancelled before it started its attempt
    fn cancel_pending(&self) -> bool {
        let Some(timer) = lock(&self.pending).take() else { return false };
        let unfired = !timer.is_finished();
        timer.abort();
        unfired
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            debug!("dataset service already disposed");
        }
        if self.cancel_pending() {
            debug!("cancelled pending dataset query");
            self.loading.set_if_changed(false);
        }
        self.tasks.run();
    }
}

impl<T> Inner<T>
where T: Clone + Send + Sync + 'static
{
    fn trigger_query(self: &Arc<Self>, use_debounce: bool) -> Loaded {
        if self.disposed.load(Ordering::SeqCst) {
            debug!("ignoring query trigger on disposed dataset service");
            return Loaded::settled();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (settle, loaded) = Loaded::pending();
        *lock(&self.loaded) = loaded.clone();
        self.loading.set_if_changed(true);

        let delay = if use_debounce { self.debounce } else { Duration::ZERO };
        debug!(generation, ?delay, "scheduling dataset query");

        let me = self.clone();
        let timer = self.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let runtime = me.runtime.clone();
            // detached so that superseding the timer never cancels a running query
            runtime.spawn(me.attempt(generation, settle));
        });
        if let Some(previous) = lock(&self.pending).replace(timer) {
            previous.abort();
        }

        loaded
    }

    async fn attempt(self: Arc<Self>, generation: u64, settle: Settle) {
        match (self.query)().await {
            Ok(data) if self.is_current(generation) => {
                if self.strategy.can_set_data() {
                    self.strategy.set_data(&self.data, data);
                    if self.error.with(Option::is_some) {
                        self.error.set(None);
                    }
                }
            }
            Ok(_) => debug!(generation, "discarding superseded dataset result"),
            Err(err) if self.is_current(generation) => {
                warn!(generation, "dataset query failed: {err:#}");
                self.error.set(Some(DatasetError::query(err)));
                if self.strategy.can_fallback(self.fallback.as_ref()) {
                    self.apply_fallback(generation).await;
                }
            }
            Err(err) => debug!(generation, "discarding superseded dataset failure: {err:#}"),
        }

        if self.is_current(generation) {
            self.loading.set_if_changed(false);
        }
        settle.send();
    }

    async fn apply_fallback(&self, generation: u64) {
        let Some(fallback) = &self.fallback else { return };
        match fallback.resolve().await {
            Ok(value) if self.is_current(generation) => {
                debug!(generation, "applying dataset fallback");
                self.data.set(Some(value));
                self.strategy.fallback_applied();
            }
            Ok(_) => debug!(generation, "discarding superseded dataset fallback"),
            Err(err) => {
                // a failing fallback counts as no fallback: data keeps its previous value
                warn!(generation, "dataset fallback failed: {err:#}");
                if self.is_current(generation) {
                    self.error.set(Some(DatasetError::fallback(err)));
                }
            }
        }
    }

    fn start_polling(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                debug!(?interval, "polling dataset");
                inner.trigger_query(false);
            }
        })
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) { self.tasks.run(); }
}
