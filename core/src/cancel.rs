//! Cooperative cancellation for in-flight requests.
//!
//! A `CancelToken` is handed to every service call. Transports race the
//! network round-trip against `cancelled()` and resolve to
//! `ApiError::Cancelled` once the token fires. Clones share state, so the
//! owner of a screen can keep one clone and cancel everything it started.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { state: Arc::new(tx) }
    }

    /// A token nobody else holds, so it never fires.
    pub fn none() -> Self {
        Self::new()
    }

    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once `cancel` has been called on this token or a clone.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot observe a
        // closed channel here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
