//! Append-only log of deprecation warnings.
//!
//! Deprecated options push human-readable warnings here while arguments are
//! parsed; the host displays them once startup is done. Handles are cheap to
//! clone and share one underlying log.

use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, ordered collection of deprecation warnings.
///
/// Each [`push`](Self::push) is atomic. Messages are never overwritten; they
/// are only removed by [`drain`](Self::drain).
///
/// # Examples
///
/// ```
/// use optbind_core::DeprecationLog;
///
/// let log = DeprecationLog::new();
/// let writer = log.clone();
/// writer.push("DEPRECATION WARNING: --old has been deprecated.");
///
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.drain().len(), 1);
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeprecationLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl DeprecationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave a Vec half-pushed.
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends a message.
    pub fn push(&self, message: impl Into<String>) {
        self.lock().push(message.into());
    }

    /// Returns a copy of every message in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Removes and returns every message in arrival order.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of pending messages.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no messages are pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
