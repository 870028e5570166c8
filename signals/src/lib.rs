/*!
Observable cells for dataset services

# Design requirements:
- Writers and readers are different types. `Mut<T>` writes, `Read<T>` observes.
- Writers do not implement subscription methods.
- Readers keep a reference to the present value.
- `Signal` is dyn object safe so observers can track heterogeneous cells.
- Notifications are delivered after the value lock is released, so a listener may read the cell that notified it.

# Nomenclature:
- fn subscribe - does not call the given closure with the current value, only with later ones
- fn get - returns the current value and registers the read with the current observer (if any)
- fn peek - returns the current value without tracking

# Basic usage

```rust
use dataset_signals::*;

let signal = Mut::new(42);
let _guard = signal.read().subscribe(|value: i32| println!("Read value: {}", value));
signal.set(43);
// Should print:
// Read value: 43
```

# Watch usage

```rust
use dataset_signals::*;

let page = Mut::new(1);
let size = Mut::new(20);
let watch = {
    let page = page.read();
    let size = size.read();
    Watch::new(move || (page.get(), size.get()), || println!("query inputs changed"))
};

page.set(2); // prints
page.set(2); // same inputs, no output
size.set(50); // prints
watch.stop();
page.set(3); // no longer watched
```
*/

pub mod broadcast;
pub mod context;
pub mod observer;
pub mod porcelain;
pub mod signal;
pub mod value;
pub mod watch;

pub use broadcast::{BroadcastId, ListenerGuard};
pub use context::CurrentObserver;
pub use observer::*;
pub use porcelain::*;
pub use signal::*;
pub use watch::Watch;
