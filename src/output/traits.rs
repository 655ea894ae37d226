//! Sink trait interfaces
//!
//! The engine consumes these; the host framework implements them. All
//! three are called from worker tasks and must be thread-safe.

use crate::output::document::Document;
use crate::output::stats::{Phase, StatsKey};
use crate::{Result, TideError};

/// Destination for finished documents.
pub trait DocumentSink: Send + Sync {
    /// Stores one document. Called once per successfully processed item.
    fn store(&self, document: &Document) -> Result<()>;

    /// Commits everything stored so far. Called once at session end,
    /// regardless of earlier failures.
    fn commit(&self) -> Result<()>;
}

/// Destination for item-level failures that are not fatal to the session.
pub trait FailureSink: Send + Sync {
    /// Records one failure for operator review.
    fn store(&self, resource_url: &str, error: &TideError);
}

/// Destination for per-item lifecycle events.
pub trait StatsSink: Send + Sync {
    /// An item entered the pipeline.
    fn begin(&self, key: &StatsKey);

    /// An item reached a lifecycle phase.
    fn record(&self, key: &StatsKey, phase: Phase);

    /// An item reached a terminal outcome; the key is retired.
    fn done(&self, key: &StatsKey);
}
