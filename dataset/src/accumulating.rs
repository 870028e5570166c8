use std::{ops::Deref, sync::Arc};

use crate::{config::DatasetConfig, service::DatasetService, strategy::Accumulate};

/// A [`DatasetService`] that merges each result into the data it already holds,
/// e.g. successive pages of a listing or an incremental log.
///
/// Once a fallback has been applied the service stops merging for good: the
/// next successful result replaces the fallback data instead of extending it.
pub struct AccumulatingDatasetService<T> {
    service: DatasetService<T>,
    strategy: Arc<Accumulate<T>>,
}

impl<T> Clone for AccumulatingDatasetService<T> {
    fn clone(&self) -> Self { Self { service: self.service.clone(), strategy: self.strategy.clone() } }
}

impl<T> AccumulatingDatasetService<T>
where T: Clone + Send + Sync + 'static
{
    /// `merge(existing, incoming)` combines a new result with the data already held
    pub fn new<F>(config: DatasetConfig<T>, merge: F) -> Self
    where F: Fn(T, T) -> T + Send + Sync + 'static {
        Self::from_strategy(config, Accumulate::new(merge))
    }

    fn from_strategy(config: DatasetConfig<T>, strategy: Accumulate<T>) -> Self {
        let strategy = Arc::new(strategy);
        let service = DatasetService::with_strategy(config, strategy.clone());
        Self { service, strategy }
    }
}

impl<U> AccumulatingDatasetService<Vec<U>>
where U: Clone + Send + Sync + 'static
{
    /// Appends each result to the items already held
    pub fn concat(config: DatasetConfig<Vec<U>>) -> Self { Self::from_strategy(config, Accumulate::concat()) }
}

impl<T> AccumulatingDatasetService<T> {
    /// Whether a fallback has been applied; from then on results replace the data instead of merging
    pub fn fallback_used(&self) -> bool { self.strategy.fallback_used() }

    pub fn into_inner(self) -> DatasetService<T> { self.service }
}

impl<T> Deref for AccumulatingDatasetService<T> {
    type Target = DatasetService<T>;
    fn deref(&self) -> &Self::Target { &self.service }
}

impl<T> std::fmt::Debug for AccumulatingDatasetService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccumulatingDatasetService").field("service", &self.service).field("strategy", &self.strategy).finish()
    }
}
