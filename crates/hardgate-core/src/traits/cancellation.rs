//! Cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Checked between gate evaluations and between evidence-source waits.
/// Cancellation is cooperative: work already in progress finishes, but no
/// partial report is ever returned.
pub trait Cancellable {
    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation.
    fn cancel(&self);
}

/// Shared cancellation flag. Clones observe the same flag, so a host can keep
/// one clone and hand another to a run on a different thread.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
