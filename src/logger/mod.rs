// Logger module - Named loggers and their registry

mod registry;

pub use registry::{split_auto_prefix, LoggerRegistry};

use crate::context::Core;
use crate::format::HeaderFields;
use crate::level::Level;
use crate::sinks::DispatchReport;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Upper bound for a logger's indent
pub const MAX_INDENT: usize = 256;
/// Columns added by [`Logger::enter`] and removed by [`Logger::leave`]
pub const INDENT_STEP: usize = 2;

/// A named source of log messages
///
/// Loggers are created by the [`LoggerRegistry`] and shared as
/// `Arc<Logger>`. Indent and the enable flag are atomics, so a logger can be
/// used from several threads without locking.
pub struct Logger {
    name: String,
    prefix: Option<String>,
    indent: AtomicUsize,
    enabled: AtomicBool,
    core: Arc<Core>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("indent", &self.indent())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Logger {
    pub(crate) fn new(name: &str, prefix: Option<&str>, core: Arc<Core>) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.map(str::to_string),
            indent: AtomicUsize::new(0),
            enabled: AtomicBool::new(true),
            core,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Write a message at `level`
    ///
    /// Nothing is formatted when the logger is disabled or `level` is below
    /// the global threshold; the returned report is then empty.
    pub fn write(&self, level: Level, args: fmt::Arguments<'_>) -> DispatchReport {
        if !self.is_enabled() || !self.core.passes(level) {
            return DispatchReport::default();
        }
        self.emit(level, args)
    }

    /// Write a message regardless of the global threshold
    ///
    /// The message carries level NONE, so only sinks with a NONE threshold
    /// receive it.
    pub fn write_line(&self, args: fmt::Arguments<'_>) -> DispatchReport {
        self.write_line_at(Level::NONE, args)
    }

    /// Write a message at `level` regardless of the global threshold
    ///
    /// Only the logger's enable flag and each sink's own threshold apply.
    pub fn write_line_at(&self, level: Level, args: fmt::Arguments<'_>) -> DispatchReport {
        if !self.is_enabled() {
            return DispatchReport::default();
        }
        self.emit(level, args)
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) -> DispatchReport {
        let mut buffer = self.core.pool().checkout();
        buffer.format(args);
        if self.core.append_newline() {
            buffer.push_str("\n");
        }

        let fields = HeaderFields {
            level,
            name: &self.name,
            prefix: self.prefix.as_deref(),
            indent: self.indent(),
            auto_prefix: self.core.auto_prefix(),
        };
        self.core.formatter().build_header(buffer.header_mut(), &fields);

        let (header, body) = buffer.parts();
        self.core.sinks().dispatch(level, header, body)
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) -> DispatchReport {
        self.write(Level::DEBUG, args)
    }

    pub fn info(&self, args: fmt::Arguments<'_>) -> DispatchReport {
        self.write(Level::INFO, args)
    }

    pub fn warning(&self, args: fmt::Arguments<'_>) -> DispatchReport {
        self.write(Level::WARNING, args)
    }

    pub fn error(&self, args: fmt::Arguments<'_>) -> DispatchReport {
        self.write(Level::ERROR, args)
    }

    pub fn critical(&self, args: fmt::Arguments<'_>) -> DispatchReport {
        self.write(Level::CRITICAL, args)
    }

    /// True if a message at `level` would pass the global threshold
    pub fn is_enabled_for(&self, level: Level) -> bool {
        self.core.passes(level)
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.is_enabled_for(Level::DEBUG)
    }

    pub fn is_info_enabled(&self) -> bool {
        self.is_enabled_for(Level::INFO)
    }

    pub fn is_warning_enabled(&self) -> bool {
        self.is_enabled_for(Level::WARNING)
    }

    pub fn is_error_enabled(&self) -> bool {
        self.is_enabled_for(Level::ERROR)
    }

    pub fn is_critical_enabled(&self) -> bool {
        self.is_enabled_for(Level::CRITICAL)
    }

    /// Increase the indent by one step, up to [`MAX_INDENT`]
    pub fn enter(&self) {
        self.adjust_indent(|indent| (indent + INDENT_STEP).min(MAX_INDENT));
    }

    /// Decrease the indent by one step, not below zero
    pub fn leave(&self) {
        self.adjust_indent(|indent| indent.saturating_sub(INDENT_STEP));
    }

    fn adjust_indent(&self, f: impl Fn(usize) -> usize) {
        // The closure always returns Some, so this cannot fail
        let _ = self
            .indent
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |indent| Some(f(indent)));
    }

    pub fn indent(&self) -> usize {
        self.indent.load(Ordering::Relaxed)
    }

    /// Set the indent, clamped to [`MAX_INDENT`]
    pub fn set_indent(&self, indent: usize) {
        self.indent.store(indent.min(MAX_INDENT), Ordering::Relaxed);
    }

    /// Indent until the returned guard is dropped
    pub fn scope(&self) -> LogIndent<'_> {
        self.enter();
        LogIndent { logger: self }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Guard returned by [`Logger::scope`]; leaves the indent level on drop
#[must_use = "the indent is removed as soon as the guard is dropped"]
pub struct LogIndent<'a> {
    logger: &'a Logger,
}

impl Drop for LogIndent<'_> {
    fn drop(&mut self) {
        self.logger.leave();
    }
}
