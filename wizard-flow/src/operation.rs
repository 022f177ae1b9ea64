//! Handle for a simulated or real asynchronous operation started by a step.
//!
//! A step starts an operation, then either waits for its result or cancels it.
//! The canned collaborators use [`simulate`], a one-shot timer resolving to a
//! fixed value; real collaborators pass their own future to
//! [`PendingOperation::start`] and the step code stays the same.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{FlowError, Result};

pub struct PendingOperation<T> {
    name: String,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> PendingOperation<T> {
    pub fn start<F>(name: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let name = name.into();
        debug!(operation = %name, "starting operation");
        Self {
            name,
            handle: tokio::spawn(future),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the operation. Resolves at most once since it consumes the handle.
    pub async fn resolve(self) -> Result<T> {
        let name = self.name;
        match self.handle.await {
            Ok(value) => {
                debug!(operation = %name, "operation resolved");
                Ok(value)
            }
            Err(e) if e.is_cancelled() => Err(FlowError::OperationCancelled(name)),
            Err(e) => Err(FlowError::OperationFailed {
                operation: name,
                reason: e.to_string(),
            }),
        }
    }

    pub fn cancel(self) {
        debug!(operation = %self.name, "cancelling operation");
        self.handle.abort();
    }
}

/// One-shot timer that resolves to `value` after `delay`.
pub fn simulate<T>(name: impl Into<String>, delay: Duration, value: T) -> PendingOperation<T>
where
    T: Send + 'static,
{
    PendingOperation::start(name, async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        value
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_operation_resolves_to_its_value() {
        let op = simulate("extraction", Duration::from_millis(5), 42u32);
        assert_eq!(op.name(), "extraction");
        assert_eq!(op.resolve().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn cancelled_operation_never_delivers() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        let op = PendingOperation::start("form", async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = tx.send(());
        });
        op.cancel();

        // sender dropped by the aborted task without sending
        assert!(rx.recv().await.is_none());
    }

    async fn explode() -> u32 {
        panic!("boom")
    }

    #[tokio::test]
    async fn panicking_operation_is_reported_as_failure() {
        let op = PendingOperation::start("eligibility", explode());
        let err = op.resolve().await.unwrap_err();
        assert!(matches!(err, FlowError::OperationFailed { .. }));
    }
}
