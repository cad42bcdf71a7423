//! Reporting channel for failures inside the asynchronous pipeline.

use std::fmt;
use std::sync::Arc;

use crate::error::DeliveryError;

/// Cloneable handle to the diagnostics callback.
///
/// Every [`DeliveryError`] produced by the dispatch worker or the retention
/// sweeper is reported here exactly once, then the failed attempt is
/// abandoned. The default reporter logs through `tracing::error!`; tests
/// and embedders can install their own callback via
/// [`LoggerConfig`](crate::LoggerConfig).
#[derive(Clone)]
pub struct Diagnostics {
    handler: Arc<dyn Fn(&DeliveryError) + Send + Sync>,
}

impl Diagnostics {
    pub fn new(handler: impl Fn(&DeliveryError) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub(crate) fn report(&self, error: &DeliveryError) {
        (self.handler)(error);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(|error| tracing::error!("{error}"))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}
