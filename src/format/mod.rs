// Format module - Message header layout

use crate::error::{Result, SinklogError};
use crate::level::Level;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::atomic::{AtomicU32, Ordering};

/// Width of the prefix column inside the thread tag brackets
pub const PREFIX_WIDTH: usize = 16;
/// Width of the level column
pub const LEVEL_WIDTH: usize = 8;
/// Width of the logger name column
pub const NAME_WIDTH: usize = 32;

/// `dd.mm.yyyy HH:MM:SS.mmm`, always in UTC
const LOG4NET_PATTERN: &str = "%d.%m.%Y %H:%M:%S%.3f";
/// ctime(3) layout, local time
const UNIX_PATTERN: &str = "%a %b %e %H:%M:%S %Y";

static NEXT_THREAD_TAG: AtomicU32 = AtomicU32::new(1);

thread_local! {
    static THREAD_TAG: u32 = NEXT_THREAD_TAG.fetch_add(1, Ordering::Relaxed);
}

/// Stable tag for the calling thread, assigned on first use
pub fn thread_tag() -> u32 {
    THREAD_TAG.with(|tag| *tag)
}

/// Timestamp layout used in the header
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeFormat {
    /// `19.10.2026 14:03:07.125` (UTC)
    #[default]
    Log4Net,
    /// `Mon Oct 19 14:03:07 2026` (local time)
    Unix,
    /// Any chrono strftime pattern, rendered in local time
    Custom(String),
}

impl TimeFormat {
    /// Reject custom patterns chrono cannot render
    pub fn validate(&self) -> Result<()> {
        if let TimeFormat::Custom(pattern) = self {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(SinklogError::ConfigValidationError(format!(
                    "Invalid time format pattern: {}",
                    pattern
                )));
            }
        }
        Ok(())
    }

    fn write_time(&self, out: &mut String, now: DateTime<Utc>) {
        // A bad custom pattern yields an empty timestamp rather than a failure
        let _ = match self {
            TimeFormat::Log4Net => write!(out, "{}", now.format(LOG4NET_PATTERN)),
            TimeFormat::Unix => write!(out, "{}", now.with_timezone(&Local).format(UNIX_PATTERN)),
            TimeFormat::Custom(pattern) => {
                write!(out, "{}", now.with_timezone(&Local).format(pattern))
            }
        };
    }
}

impl From<String> for TimeFormat {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "log4net" | "default" => TimeFormat::Log4Net,
            "unix" => TimeFormat::Unix,
            _ => TimeFormat::Custom(value),
        }
    }
}

impl From<TimeFormat> for String {
    fn from(value: TimeFormat) -> Self {
        match value {
            TimeFormat::Log4Net => "log4net".to_string(),
            TimeFormat::Unix => "unix".to_string(),
            TimeFormat::Custom(pattern) => pattern,
        }
    }
}

/// Per-message inputs to the header
#[derive(Debug, Clone, Copy)]
pub struct HeaderFields<'a> {
    pub level: Level,
    pub name: &'a str,
    pub prefix: Option<&'a str>,
    pub indent: usize,
    /// Render a blank prefix column for loggers without a prefix
    pub auto_prefix: bool,
}

/// Builds message headers
///
/// Layout: `<time> [<tag>::<prefix>] <LEVEL> <name> - <indent>`
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    time_format: TimeFormat,
}

impl Formatter {
    pub fn new(time_format: TimeFormat) -> Self {
        Self { time_format }
    }

    pub fn time_format(&self) -> &TimeFormat {
        &self.time_format
    }

    /// Write the header for the current time and thread into `out`
    pub fn build_header(&self, out: &mut String, fields: &HeaderFields<'_>) {
        self.build_header_at(out, Utc::now(), thread_tag(), fields);
    }

    /// Write the header for an explicit time and thread tag into `out`
    pub fn build_header_at(
        &self,
        out: &mut String,
        now: DateTime<Utc>,
        tag: u32,
        fields: &HeaderFields<'_>,
    ) {
        out.clear();
        self.time_format.write_time(out, now);

        // Writing into a String cannot fail
        let _ = match (fields.prefix, fields.auto_prefix) {
            (Some(prefix), _) => write!(out, " [{:08x}::{:>w$}]", tag, prefix, w = PREFIX_WIDTH),
            (None, true) => write!(out, " [{:08x}::{:w$}]", tag, "", w = PREFIX_WIDTH),
            (None, false) => write!(out, " [{:08x}]", tag),
        };
        let _ = write!(
            out,
            " {:>lw$} {:>nw$} - ",
            fields.level,
            fields.name,
            lw = LEVEL_WIDTH,
            nw = NAME_WIDTH
        );
        out.extend(std::iter::repeat(' ').take(fields.indent));
    }
}
