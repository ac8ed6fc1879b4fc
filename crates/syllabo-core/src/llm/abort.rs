//! Abort signalling and deadlines for outbound calls

use crate::error::{Result, SyllaboError};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct AbortState {
    aborted: AtomicBool,
    notify: Notify,
}

/// Cloneable abort handle shared between a caller and a collaborator.
///
/// The caller triggers it when a deadline passes; collaborators either race
/// their in-flight work against [`AbortSignal::aborted`] or poll
/// [`AbortSignal::check`] between steps.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    state: Arc<AbortState>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the signal. Idempotent.
    pub fn abort(&self) {
        if !self.state.aborted.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::SeqCst)
    }

    /// Fail with `Aborted` if the signal has fired
    pub fn check(&self) -> Result<()> {
        if self.is_aborted() {
            Err(SyllaboError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Resolve once the signal fires
    pub async fn aborted(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent abort is not missed
        notified.as_mut().enable();
        if self.is_aborted() {
            return;
        }
        notified.await;
    }
}

/// Run `fut` under a wall-clock limit.
///
/// When the limit passes the future is dropped, `signal` is triggered so any
/// detached work can stop, and a `Timeout` error naming `operation` is
/// returned.
pub async fn with_deadline<T, F>(
    operation: &str,
    limit: Duration,
    signal: &AbortSignal,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            signal.abort();
            tracing::warn!(
                operation,
                timeout_secs = limit.as_secs(),
                "Deadline exceeded, request aborted"
            );
            Err(SyllaboError::Timeout {
                operation: operation.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}
