#![deny(missing_docs)]
//! Logging front end shared by the tracker crates.
//!
//! The `tracker_*` macros are what core, engine and app log through. Level
//! names from `tracker.ron` go through [`parse_level`], and test binaries
//! install a stderr logger with [`initialize_for_tests`], whose level can be
//! raised with the `TRACKER_TEST_LOG` environment variable.

pub use log::LevelFilter;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Parses a level name such as `"info"` or `"DEBUG"`.
///
/// Returns `None` for unknown names so callers can fall back to a default.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Environment variable naming the level used by [`initialize_for_tests`].
pub const TEST_LOG_ENV: &str = "TRACKER_TEST_LOG";

/// Installs a stderr logger for test binaries.
///
/// Does nothing if another logger is already installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let requested = std::env::var(TEST_LOG_ENV).ok();
    let _ = CombinedLogger::init(vec![TermLogger::new(
        test_level(requested.as_deref()),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Never,
    )]);
}

/// Level for test logging: the requested name if it parses, otherwise warn.
fn test_level(requested: Option<&str>) -> LevelFilter {
    requested.and_then(parse_level).unwrap_or(LevelFilter::Warn)
}
