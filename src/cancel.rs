//! Cooperative cancellation token for in-flight compression runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot cancellation flag shared between the invoking context and
/// the pipeline worker.
///
/// Cloning is cheap (an `Arc` bump); all clones observe the same flag.
/// The pipeline checks the token once per entry boundary, so a
/// transcode already in progress always completes before the run
/// aborts.
///
/// # Example
///
/// ```
/// use pptslim::CancelToken;
///
/// let token = CancelToken::new();
/// let worker_token = token.clone();
///
/// assert!(!worker_token.is_cancelled());
/// token.cancel();
/// assert!(worker_token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent; the flag is never cleared.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
