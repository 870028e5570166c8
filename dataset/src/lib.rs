/*!
Reactive dataset loading.

A [`DatasetService`] calls an async query function and publishes the result,
a loading flag and the latest failure through observable cells from
`dataset_signals`. It can fall back to a default value when the query fails,
re-query (debounced) when watched dependencies change, and poll on an interval.
[`AccumulatingDatasetService`] merges results instead of replacing them.

```no_run
use std::time::Duration;
use dataset::{DatasetConfig, DatasetService, Fallback};
use dataset_signals::Peek;

# async fn example() {
let service = DatasetService::new(
    DatasetConfig::new(|| async { Ok(vec!["a".to_string(), "b".to_string()]) })
        .fallback(Fallback::value(Vec::new()))
        .polling(Duration::from_secs(60)),
);

service.loaded().await;
assert!(!service.loading().peek());
println!("{:?}", service.data().peek());
service.dispose();
# }
```
*/

mod accumulating;
mod config;
mod error;
mod loaded;
mod service;
pub mod strategy;
mod task_manager;

pub use accumulating::AccumulatingDatasetService;
pub use config::{DEFAULT_DEBOUNCE, DatasetConfig, Fallback, QueryFn};
pub use error::DatasetError;
pub use loaded::Loaded;
pub use service::DatasetService;
pub use strategy::{Accumulate, DataStrategy, Replace};
pub use task_manager::{TaskId, TaskManager};
