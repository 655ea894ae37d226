//! Output handlers and sink interfaces
//!
//! The engine never talks to the index host directly: finished documents,
//! item-level failures, and per-item lifecycle events all flow through the
//! sink traits defined here. Shipped implementations cover the standalone
//! binary (JSON-lines file, tracing) and tests (in-memory collector).

mod document;
mod jsonl;
mod log;
mod memory;
mod stats;
mod traits;

pub use document::Document;
pub use jsonl::JsonLinesSink;
pub use log::{LogFailureSink, LogStatsSink};
pub use memory::MemorySink;
pub use stats::{Phase, StatsKey};
pub use traits::{DocumentSink, FailureSink, StatsSink};
