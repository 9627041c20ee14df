//! Cooperative cancellation for in-flight polls.

use std::sync::Arc;
use tokio::sync::watch;

/// Clonable handle to one shared cancellation signal.
///
/// Every task in a batch holds a clone; raising the signal through any
/// clone is observed by all of them. The sender side lives in an `Arc`
/// inside each clone, so the channel stays open as long as any token
/// exists and `cancelled()` can only resolve on a real cancel.
#[derive(Debug, Clone)]
pub struct CancelToken {
    raise: Arc<watch::Sender<bool>>,
    signal: watch::Receiver<bool>,
}

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        let (raise, signal) = watch::channel(false);
        Self {
            raise: Arc::new(raise),
            signal,
        }
    }

    /// Raise the signal. Idempotent.
    pub fn cancel(&self) {
        let _ = self.raise.send(true);
    }

    /// Whether the signal has been raised.
    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Completes once the signal is raised.
    pub async fn cancelled(&self) {
        let mut signal = self.signal.clone();
        let _ = signal.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_seen_by_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_signal() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
        timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should resolve once cancelled")
            .expect("waiter task should not panic");
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_raised() {
        let token = CancelToken::new();
        token.cancel();
        timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already-raised signal should resolve at once");
    }
}
