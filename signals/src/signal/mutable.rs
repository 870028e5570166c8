use crate::{Peek, broadcast::Broadcast, signal::Read, value::ValueCell};

/// Mutable (stateful) signal. Intentionally does not implement `Signal`,
/// `Subscribe` or `Get`; observe it through `read()`.
pub struct Mut<T> {
    value: ValueCell<T>,
    broadcast: Broadcast,
}

impl<T> Clone for Mut<T> {
    fn clone(&self) -> Self { Self { value: self.value.clone(), broadcast: self.broadcast.clone() } }
}

impl<T> Mut<T> {
    pub fn new(value: T) -> Self { Self { value: ValueCell::new(value), broadcast: Broadcast::new() } }

    /// Replace the value and notify listeners
    pub fn set(&self, value: T) {
        // the previous value is dropped before anyone is notified
        drop(self.value.set(value));
        self.broadcast.send();
    }

    /// Mutate the value in place and notify listeners
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = self.value.update(f);
        self.broadcast.send();
        result
    }

    /// Borrow the current value - not tracked by the current observer
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R { self.value.with(f) }

    /// Readonly signal downstream of this mutable signal
    pub fn read(&self) -> Read<T> { Read { value: self.value.readvalue(), broadcast: self.broadcast.clone() } }
}

impl<T: PartialEq> Mut<T> {
    /// Replace the value only if it differs, returning whether listeners were notified
    pub fn set_if_changed(&self, value: T) -> bool {
        let changed = self.value.update(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if changed {
            self.broadcast.send();
        }
        changed
    }
}

impl<T: Clone + 'static> Peek<T> for Mut<T> {
    fn peek(&self) -> T { self.value.value() }
}

impl<T: Default> Default for Mut<T> {
    fn default() -> Self { Self::new(T::default()) }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Mut<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.value.with(|v| f.debug_tuple("Mut").field(v).finish()) }
}
