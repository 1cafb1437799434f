//! Backend for the Rust `log` crate.
//!
//! The library reports its own diagnostics (session connects and
//! disconnects, failed writes) through the `log` facade. `ConsoleLog` renders
//! those records in the same line format used on the wire and writes them to
//! stderr. It is installed explicitly with [`install`]; applications that
//! already have a `log` backend simply skip it.

use std::io::{self, Write};

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;

use crate::{
    clock::{Clock, SystemClock},
    formatter::SharedFormatter,
    level::LogLevel,
    log_record::LogRecord,
};

static CONSOLE: OnceCell<ConsoleLog> = OnceCell::new();

/// `log::Log` implementation writing formatted lines to stderr.
#[derive(Debug, Default)]
pub struct ConsoleLog {
    formatter: SharedFormatter,
}

impl ConsoleLog {
    /// Render a `log` record as one wire-format line.
    pub fn render(&self, record: &Record<'_>) -> Vec<u8> {
        let record = LogRecord::from_args(
            LogLevel::from(record.level()),
            SystemClock.now(),
            *record.args(),
        );
        self.formatter.format_line(&record)
    }
}

impl log::Log for ConsoleLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.render(record);
        let _ = io::stderr().lock().write_all(&line);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Install [`ConsoleLog`] as the global `log` backend.
///
/// Fails if another backend has already been installed.
pub fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
    let console = CONSOLE.get_or_init(ConsoleLog::default);
    log::set_logger(console)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_records_with_level_tag() {
        let console = ConsoleLog::default();
        let line = console.render(
            &Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("{} disconnected", "127.0.0.1:4000"))
                .build(),
        );
        let text = String::from_utf8(line).unwrap();
        assert!(text.starts_with("WARN: "), "{text}");
        assert!(text.ends_with(" 127.0.0.1:4000 disconnected\n"), "{text}");
    }
}
