//! Rendering of [`LogRecord`] values into wire lines.

use std::{fmt, sync::Arc};

use crate::{log_record::LogRecord, protocol::RECORD_DELIMITER};

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so one formatter can be
/// shared by every thread logging through the same client.
pub trait LineFormatter: Send + Sync {
    /// Format a log record, without the trailing delimiter.
    fn format(&self, record: &LogRecord) -> String;
}

/// `"<LEVEL>: <YYYY/MM/DD> <HH:MM:SS> <message>"`, in UTC.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl LineFormatter for DefaultFormatter {
    fn format(&self, record: &LogRecord) -> String {
        record.to_string()
    }
}

/// Shared formatter trait object used by the client.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn LineFormatter>,
}

impl SharedFormatter {
    pub fn new<F>(formatter: F) -> Self
    where
        F: LineFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Format `record` and append the record delimiter, producing exactly
    /// one wire line.
    pub fn format_line(&self, record: &LogRecord) -> Vec<u8> {
        let mut line = self.inner.format(record).into_bytes();
        line.push(RECORD_DELIMITER);
        line
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn LineFormatter>)")
    }
}
