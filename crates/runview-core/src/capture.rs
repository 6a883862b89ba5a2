#![forbid(unsafe_code)]

//! In-memory sink for tests and embedding.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::context::RecordSink;
use crate::record::LogRecord;

#[derive(Debug, Default)]
struct Captured {
    records: Vec<LogRecord>,
    closed: bool,
}

/// Records every emitted [`LogRecord`] in memory.
///
/// Clones share storage, so a test can keep one handle and attach another.
/// After `close`, further records are ignored.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    inner: Arc<Mutex<Captured>>,
}

impl CaptureSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Snapshot of captured records.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().records.clone()
    }

    /// Snapshot of captured messages, in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock()
            .records
            .iter()
            .map(|record| record.message.clone())
            .collect()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn clear(&self) {
        self.lock().records.clear();
    }
}

impl RecordSink for CaptureSink {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        let mut captured = self.lock();
        if !captured.closed {
            captured.records.push(record.clone());
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn captures_until_closed() {
        let mut sink = CaptureSink::new();
        let handle = sink.clone();

        sink.emit(&LogRecord::new("c", Level::INFO, "one")).unwrap();
        sink.close().unwrap();
        sink.emit(&LogRecord::new("c", Level::INFO, "two")).unwrap();

        assert_eq!(handle.messages(), vec!["one"]);
        assert!(handle.is_closed());
    }

    #[test]
    fn clear_drops_records() {
        let mut sink = CaptureSink::new();
        sink.emit(&LogRecord::new("c", Level::INFO, "x")).unwrap();
        sink.clear();
        assert!(sink.records().is_empty());
    }
}
