//! Shared helpers for unit tests.

use std::io;
use std::sync::{Arc, Mutex};

/// An `io::Write` whose bytes can be inspected from another handle.
#[derive(Clone, Default)]
pub(crate) struct SharedWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> String {
        let bytes = self.inner.lock().expect("writer lock").clone();
        String::from_utf8(bytes).unwrap_or_default()
    }
}

impl io::Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().expect("writer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
