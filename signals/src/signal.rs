pub mod mutable;
pub mod read;

pub use crate::broadcast::{Listener, ListenerGuard};
pub use mutable::*;
pub use read::*;

use crate::broadcast::BroadcastId;

/// Core trait for signals - observation without regard to the payload.
/// Object safe so that observers can hold any signal behind `&dyn Signal`.
pub trait Signal {
    fn listen(&self, listener: Listener) -> ListenerGuard;

    fn broadcast_id(&self) -> BroadcastId;
}

/// Get the current value, tracked by the current observer
pub trait Get<T: 'static>: Signal {
    fn get(&self) -> T;
}

/// Borrow the current value, tracked by the current observer
pub trait With<T: 'static> {
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

/// Get the current value without tracking
pub trait Peek<T: 'static> {
    fn peek(&self) -> T;
}

/// Get a read-only cell containing the present value
pub trait GetReadCell<T: 'static> {
    fn get_readcell(&self) -> crate::value::ReadValueCell<T>;
}
