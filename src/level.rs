use std::fmt;
use std::str::FromStr;

/// Severity tag printed at the start of every record.
///
/// The client API only emits `Info` and `Error`; `Debug` and `Warn` exist so
/// records arriving through the `log` bridge keep their severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Tag written before the timestamp, without the trailing `": "`.
    pub const fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Error => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("info", LogLevel::Info)]
    #[case(" ERROR ", LogLevel::Error)]
    #[case("warning", LogLevel::Warn)]
    #[case("Debug", LogLevel::Debug)]
    fn parses_level_names(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
    }

    #[rstest]
    fn rejects_unknown_level() {
        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert_eq!(err.to_string(), "unknown log level: verbose");
    }

    #[rstest]
    fn trace_collapses_into_debug() {
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Debug);
    }
}
