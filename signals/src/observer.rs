use crate::Signal;
mod callback_observer;
pub use callback_observer::*;

/// An Observer can observe multiple signals
pub trait Observer: Send + Sync {
    /// Subscribe to a signal that was read in this observer's context
    fn observe(&self, signal: &dyn Signal);

    /// Unique identifier for this observer (for equality comparison)
    fn observer_id(&self) -> usize;
}
