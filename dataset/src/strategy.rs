use std::sync::atomic::{AtomicBool, Ordering};

use dataset_signals::Mut;

use crate::config::Fallback;

/// Decides how a dataset service combines fetched data with what it already holds.
pub trait DataStrategy<T>: Send + Sync + 'static {
    /// Gate before accepting a successful result
    fn can_set_data(&self) -> bool { true }

    /// Apply an accepted result to the data cell
    fn set_data(&self, data: &Mut<Option<T>>, incoming: T);

    /// Decide whether the configured fallback applies to a failed attempt
    fn can_fallback(&self, fallback: Option<&Fallback<T>>) -> bool { fallback.is_some() }

    /// Called once a fallback value has been written to the data cell
    fn fallback_applied(&self) {}
}

/// Each result replaces the previous one
#[derive(Debug, Default, Clone, Copy)]
pub struct Replace;

impl<T: Send + Sync + 'static> DataStrategy<T> for Replace {
    fn set_data(&self, data: &Mut<Option<T>>, incoming: T) { data.set(Some(incoming)); }
}

type MergeFn<T> = Box<dyn Fn(T, T) -> T + Send + Sync>;

/// Each result is merged into the data already held, until a fallback is used.
/// From then on results replace: fallback data is not part of the sequence being accumulated.
pub struct Accumulate<T> {
    merge: MergeFn<T>,
    fallback_used: AtomicBool,
}

impl<T> Accumulate<T> {
    /// `merge(existing, incoming)` produces the combined data set
    pub fn new<F>(merge: F) -> Self
    where F: Fn(T, T) -> T + Send + Sync + 'static {
        Self { merge: Box::new(merge), fallback_used: AtomicBool::new(false) }
    }

    /// Whether a fallback has been applied. Sticky for the life of the strategy.
    pub fn fallback_used(&self) -> bool { self.fallback_used.load(Ordering::SeqCst) }
}

impl<U: 'static> Accumulate<Vec<U>> {
    /// Appends each result to the existing items, preserving order
    pub fn concat() -> Self {
        Self::new(|mut existing: Vec<U>, incoming: Vec<U>| {
            existing.extend(incoming);
            existing
        })
    }
}

impl<T: Send + Sync + 'static> DataStrategy<T> for Accumulate<T> {
    fn set_data(&self, data: &Mut<Option<T>>, incoming: T) {
        let fallback_used = self.fallback_used();
        data.update(|current| {
            let merged = match current.take() {
                Some(existing) if !fallback_used => (self.merge)(existing, incoming),
                _ => incoming,
            };
            *current = Some(merged);
        });
    }

    fn fallback_applied(&self) { self.fallback_used.store(true, Ordering::SeqCst); }
}

impl<T> std::fmt::Debug for Accumulate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulate").field("fallback_used", &self.fallback_used()).finish_non_exhaustive()
    }
}
