//! Logging setup: `--log-level` and repeated `-v` flags select an
//! `env_logger` filter on stderr.

use clap::ValueEnum;
use log::LevelFilter;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => LevelFilter::Error,
        }
    }
}

/// Verbosity levels as described by the Nagios plugin guidelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Single line, minimal output
    None,
    /// Single line, additional information
    Single,
    /// Multi line, configuration debug output
    Multi,
    /// Lots of detail for problem diagnosis
    Debug,
}

impl From<u8> for Verbosity {
    fn from(count: u8) -> Self {
        match count {
            0 => Verbosity::None,
            1 => Verbosity::Single,
            2 => Verbosity::Multi,
            _ => Verbosity::Debug,
        }
    }
}

impl Verbosity {
    fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::None => LevelFilter::Off,
            Verbosity::Single | Verbosity::Multi => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

/// The more verbose of the two settings wins.
pub fn effective_level(level: LogLevel, verbosity: Verbosity) -> LevelFilter {
    LevelFilter::from(level).max(verbosity.level_filter())
}

/// Install the global logger. Safe to call more than once.
pub fn init(level: LogLevel, verbosity: Verbosity) {
    let filter = effective_level(level, verbosity);
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp_secs()
        .format_target(false)
        .try_init();
}
