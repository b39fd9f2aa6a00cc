//! Cooperative cancellation for snapshot captures.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable cancellation signal.
///
/// All clones share one flag: cancelling any clone cancels them all.
/// Cancellation is permanent.
///
/// # Example
///
/// ```rust
/// use brokerlens::CancelToken;
///
/// let token = CancelToken::new();
/// let worker = token.clone();
///
/// token.cancel();
/// assert!(worker.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A token for callers that never intend to cancel.
    pub fn none() -> Self {
        Self::new()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once `cancel` has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // The sender lives as long as `self`, so this cannot close.
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
