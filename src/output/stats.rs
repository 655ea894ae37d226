//! Per-item lifecycle stats
//!
//! Each work item gets one [`StatsKey`] at submission; the pool and the
//! item's own task record phases against it until a terminal outcome
//! retires it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Lifecycle phase of one work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Task created and queued.
    Prepared,
    /// Roles resolved and the document assembled.
    Evaluated,
    /// Document handed to the sink.
    Finished,
    /// Item failed with a permission denial.
    AccessException,
    /// Item failed with any other error.
    Exception,
}

/// Correlation key for one item's lifecycle events.
///
/// Created with the best URL known at submission time; once a canonical
/// URL is learned, `set_url` replaces it. That replacement happens at most
/// once, and later calls are ignored.
#[derive(Debug)]
pub struct StatsKey {
    url: Mutex<String>,
    canonicalized: AtomicBool,
}

impl StatsKey {
    /// Creates a key for the given (possibly provisional) resource URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Mutex::new(url.into()),
            canonicalized: AtomicBool::new(false),
        }
    }

    /// Replaces the provisional URL with the canonical one. One-shot.
    pub fn set_url(&self, url: impl Into<String>) {
        if self.canonicalized.swap(true, Ordering::SeqCst) {
            tracing::debug!("ignoring repeated set_url on stats key");
            return;
        }
        *self.url.lock().unwrap() = url.into();
    }

    /// Current resource URL.
    pub fn resource_url(&self) -> String {
        self.url.lock().unwrap().clone()
    }
}
