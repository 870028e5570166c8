use std::sync::Arc;

use thiserror::Error;

/// A failure observed by a dataset service.
///
/// Never returned from `trigger_query`; published through `DatasetService::error`.
/// Sources are shared so the error can live in a cloneable signal.
#[derive(Debug, Clone, Error)]
pub enum DatasetError {
    /// The query function failed
    #[error("query failed: {0:#}")]
    Query(Arc<anyhow::Error>),

    /// The query failed and resolving the fallback failed too
    #[error("fallback failed: {0:#}")]
    Fallback(Arc<anyhow::Error>),
}

impl DatasetError {
    pub fn query(err: anyhow::Error) -> Self { Self::Query(Arc::new(err)) }

    pub fn fallback(err: anyhow::Error) -> Self { Self::Fallback(Arc::new(err)) }

    /// The underlying error
    pub fn source_error(&self) -> &anyhow::Error {
        match self {
            Self::Query(err) | Self::Fallback(err) => err,
        }
    }
}
