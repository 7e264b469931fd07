//! Leveled logging macros for [`Logger`](crate::Logger).
//!
//! Each macro checks the global threshold first, so the format arguments are
//! not evaluated for messages that would be dropped.
//!
//! ```ignore
//! let log = sinklog::get_logger("net::socket");
//! sinklog::info!(log, "connected to {}", addr);
//! ```

#[macro_export]
macro_rules! log_at {
    ($logger:expr, $lvl:expr, $($arg:tt)+) => {{
        let __logger = &$logger;
        let __level: $crate::Level = $lvl;
        if __logger.is_enabled_for(__level) {
            __logger.write(__level, format_args!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! debug    { ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::DEBUG, $($arg)+) } }
#[macro_export]
macro_rules! info     { ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::INFO, $($arg)+) } }
#[macro_export]
macro_rules! warning  { ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::WARNING, $($arg)+) } }
#[macro_export]
macro_rules! error    { ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::ERROR, $($arg)+) } }
#[macro_export]
macro_rules! critical { ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::CRITICAL, $($arg)+) } }

/// Write a line that ignores the global threshold
///
/// `write_line!(log, "text")` writes at level NONE,
/// `write_line!(log, level = Level::ERROR, "text")` at the given level.
#[macro_export]
macro_rules! write_line {
    ($logger:expr, level = $lvl:expr, $($arg:tt)+) => {{
        $logger.write_line_at($lvl, format_args!($($arg)+));
    }};
    ($logger:expr, $($arg:tt)+) => {{
        $logger.write_line(format_args!($($arg)+));
    }};
}
