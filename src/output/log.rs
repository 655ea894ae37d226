//! Tracing-backed failure and stats sinks
//!
//! Default collaborators for the standalone binary: failures become warn
//! events, lifecycle phases become debug events.

use crate::output::stats::{Phase, StatsKey};
use crate::output::traits::{FailureSink, StatsSink};
use crate::TideError;

/// Reports item-level failures through tracing.
#[derive(Debug, Default)]
pub struct LogFailureSink;

impl FailureSink for LogFailureSink {
    fn store(&self, resource_url: &str, error: &TideError) {
        tracing::warn!(
            resource = %resource_url,
            class = ?error.class(),
            error = %error,
            "item failed"
        );
    }
}

/// Reports lifecycle phases through tracing.
#[derive(Debug, Default)]
pub struct LogStatsSink;

impl StatsSink for LogStatsSink {
    fn begin(&self, key: &StatsKey) {
        tracing::debug!(resource = %key.resource_url(), "item begin");
    }

    fn record(&self, key: &StatsKey, phase: Phase) {
        tracing::debug!(resource = %key.resource_url(), phase = ?phase, "item phase");
    }

    fn done(&self, key: &StatsKey) {
        tracing::debug!(resource = %key.resource_url(), "item done");
    }
}
