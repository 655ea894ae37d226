//! In-memory collecting sink
//!
//! Implements all three sink traits and records everything it sees; used
//! throughout the test suite and handy for dry runs.

use crate::output::document::Document;
use crate::output::stats::{Phase, StatsKey};
use crate::output::traits::{DocumentSink, FailureSink, StatsSink};
use crate::{Result, TideError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Collects documents, failures, and lifecycle events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<Document>>,
    failures: Mutex<Vec<(String, String)>>,
    phases: Mutex<Vec<(String, Phase)>>,
    commits: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents stored so far.
    pub fn documents(&self) -> Vec<Document> {
        self.documents.lock().unwrap().clone()
    }

    /// `(resource_url, error_display)` pairs recorded so far.
    pub fn failures(&self) -> Vec<(String, String)> {
        self.failures.lock().unwrap().clone()
    }

    /// `(resource_url, phase)` events recorded so far.
    pub fn phases(&self) -> Vec<(String, Phase)> {
        self.phases.lock().unwrap().clone()
    }

    /// How many times `commit` ran.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl DocumentSink for MemorySink {
    fn store(&self, document: &Document) -> Result<()> {
        self.documents.lock().unwrap().push(document.clone());
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl FailureSink for MemorySink {
    fn store(&self, resource_url: &str, error: &TideError) {
        self.failures
            .lock()
            .unwrap()
            .push((resource_url.to_string(), error.to_string()));
    }
}

impl StatsSink for MemorySink {
    fn begin(&self, _key: &StatsKey) {}

    fn record(&self, key: &StatsKey, phase: Phase) {
        self.phases
            .lock()
            .unwrap()
            .push((key.resource_url(), phase));
    }

    fn done(&self, _key: &StatsKey) {}
}
