//! JSON-lines document sink
//!
//! One serialized document per line. Used by the standalone binary; index
//! hosts bring their own sink.

use crate::output::document::Document;
use crate::output::traits::DocumentSink;
use crate::{Result, TideError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Writes documents to a file, one JSON object per line.
pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Creates (or truncates) the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl DocumentSink for JsonLinesSink {
    fn store(&self, document: &Document) -> Result<()> {
        let line = serde_json::to_string(document)?;
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{}", line).map_err(TideError::Io)?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush().map_err(TideError::Io)?;
        tracing::info!("document sink committed");
        Ok(())
    }
}
