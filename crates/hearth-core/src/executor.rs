//! Bounded executor for remote crew runs
//!
//! Remote model calls have unbounded, externally-controlled latency, so
//! they must never starve other requests. A semaphore caps how many run
//! at once; when every permit is taken the call is rejected outright
//! rather than queued without bound, and each run carries a deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::dispatch::WorkUnit;
use crate::error::DispatchError;
use crate::runner::CrewRunner;

pub struct CrewExecutor {
    runner: Arc<dyn CrewRunner>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    timeout: Duration,
}

impl CrewExecutor {
    pub fn new(runner: Arc<dyn CrewRunner>, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            runner,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            timeout,
        }
    }

    /// Run one work unit under a permit and a deadline.
    pub async fn execute(&self, unit: &WorkUnit) -> Result<String, DispatchError> {
        let _permit = self.permits.try_acquire().map_err(|_| DispatchError::Saturated {
            limit: self.max_concurrent,
        })?;

        debug!(
            "Executing work unit for specialist '{}' ({} permits free)",
            unit.specialist.role,
            self.permits.available_permits(),
        );

        match tokio::time::timeout(self.timeout, self.runner.run(unit)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(DispatchError::Remote(e)),
            Err(_) => Err(DispatchError::Timeout(self.timeout.as_secs())),
        }
    }
}
