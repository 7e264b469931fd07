// Context module - The handle that owns sinks, loggers and shared state

use crate::buffer::BufferPool;
use crate::config::{LoggerConfig, SinkConfig};
use crate::error::{Result, SinklogError};
use crate::format::Formatter;
use crate::level::Level;
use crate::logger::{Logger, LoggerRegistry};
use crate::sinks::{sink_from_config, ConsoleSink, Sink, SinkRegistry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

/// Environment variable naming the configuration file of the global context
pub const CONFIG_ENV_VAR: &str = "SINKLOG_CONFIG";
/// Configuration file loaded by the global context when present
pub const DEFAULT_CONFIG_FILE: &str = "logger.res";

/// State shared by every logger of a context
pub(crate) struct Core {
    threshold: AtomicI32,
    auto_prefix: AtomicBool,
    append_newline: AtomicBool,
    formatter: Formatter,
    pool: BufferPool,
    sinks: SinkRegistry,
}

impl Core {
    fn new(config: &LoggerConfig) -> Self {
        Self {
            threshold: AtomicI32::new(config.debug_level.value()),
            auto_prefix: AtomicBool::new(config.auto_prefix),
            append_newline: AtomicBool::new(config.append_newline),
            formatter: Formatter::new(config.time_format.clone()),
            pool: BufferPool::new(),
            sinks: SinkRegistry::new(config.dispatch),
        }
    }

    pub(crate) fn threshold(&self) -> Level {
        Level(self.threshold.load(Ordering::Relaxed))
    }

    /// Global gate
    pub(crate) fn passes(&self, level: Level) -> bool {
        level.passes(self.threshold())
    }

    pub(crate) fn auto_prefix(&self) -> bool {
        self.auto_prefix.load(Ordering::Relaxed)
    }

    pub(crate) fn append_newline(&self) -> bool {
        self.append_newline.load(Ordering::Relaxed)
    }

    pub(crate) fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub(crate) fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub(crate) fn sinks(&self) -> &SinkRegistry {
        &self.sinks
    }
}

/// A logging engine instance
///
/// Owns the global threshold, the buffer pool, the sinks and the loggers.
/// Every logger obtained from a context writes to that context's sinks.
/// Contexts are independent of each other; [`global`] returns a lazily
/// built process-wide one.
pub struct LogContext {
    core: Arc<Core>,
    loggers: LoggerRegistry,
}

impl std::fmt::Debug for LogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogContext")
            .field("debug_level", &self.debug_level())
            .field("auto_prefix", &self.core.auto_prefix())
            .field("sinks", &self.core.sinks)
            .field("loggers", &self.loggers.len())
            .finish()
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl LogContext {
    /// Build a context and the sinks listed in `config`
    ///
    /// Sink entries with an unknown class are dropped with a warning. Sinks
    /// whose initialization fails stay attached and report I/O errors.
    ///
    /// # Arguments
    /// * `config` - Global threshold, header options, dispatch mode and the
    ///   sinks to create in fan-out order
    ///
    /// # Returns
    /// A context with every usable sink attached
    pub fn new(config: LoggerConfig) -> Self {
        let core = Arc::new(Core::new(&config));
        let context = Self {
            loggers: LoggerRegistry::new(Arc::clone(&core)),
            core,
        };
        context.build_sinks(&config.sinks);
        context
    }

    /// Load configuration from `path` and build a context from it
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Ok(Self::new(LoggerConfig::from_file(path)?))
    }

    /// Get the logger for `name`, splitting `Prefix::name` when auto-prefix
    /// is on
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        self.loggers.get_logger(name, None)
    }

    pub fn get_logger_with_prefix(&self, name: &str, prefix: Option<&str>) -> Arc<Logger> {
        self.loggers.get_logger(name, prefix)
    }

    pub fn loggers(&self) -> &LoggerRegistry {
        &self.loggers
    }

    /// Disable the logger named `name`, creating it if needed
    pub fn disable_logger(&self, name: &str) {
        self.loggers.disable_logger(name);
    }

    pub fn enable_all_loggers(&self) {
        self.loggers.enable_all_loggers();
    }

    /// Set the global threshold
    pub fn set_debug_level(&self, level: Level) {
        self.core.threshold.store(level.value(), Ordering::Relaxed);
    }

    pub fn debug_level(&self) -> Level {
        self.core.threshold()
    }

    /// Turn auto-prefix splitting on or off for loggers created afterwards
    pub fn set_auto_prefix(&self, enabled: bool) {
        self.core.auto_prefix.store(enabled, Ordering::Relaxed);
    }

    pub fn auto_prefix(&self) -> bool {
        self.core.auto_prefix()
    }

    pub fn set_append_newline(&self, enabled: bool) {
        self.core.append_newline.store(enabled, Ordering::Relaxed);
    }

    /// Name, initialize and attach a sink
    ///
    /// The sink is attached even if initialization fails; the error is
    /// returned for the caller to report.
    pub fn add_sink(&self, sink: Box<dyn Sink>, name: &str, args: &[&str]) -> Result<()> {
        self.core.sinks.add_sink(sink, name, args)
    }

    /// Remove and close all sinks named `name`
    pub fn remove_sink(&self, name: &str) -> bool {
        self.core.sinks.remove_sink(name)
    }

    /// Set the threshold of every sink
    pub fn set_all_sink_levels(&self, level: Level) {
        self.core.sinks.set_all_levels(level);
    }

    pub fn sinks(&self) -> &SinkRegistry {
        &self.core.sinks
    }

    pub fn pool(&self) -> &BufferPool {
        &self.core.pool
    }

    /// Close every sink and recreate the sinks listed in `config`
    ///
    /// Returns the identifiers of entries that were dropped, both those
    /// skipped while loading and those whose class is unknown. The global
    /// threshold is taken from `config` too.
    pub fn rebuild_sinks_from_config(&self, config: &LoggerConfig) -> Vec<String> {
        self.core.sinks.close_all();
        self.set_debug_level(config.debug_level);
        let mut dropped = config.skipped_sinks.clone();
        dropped.extend(self.build_sinks(&config.sinks));
        dropped
    }

    fn build_sinks(&self, sinks: &[SinkConfig]) -> Vec<String> {
        let mut dropped = Vec::new();
        for sink_config in sinks {
            match self.build_sink(sink_config) {
                Ok(()) => {}
                Err(SinklogError::UnknownSinkClass(class)) => {
                    tracing::warn!(
                        "Dropping sink {}: unknown class {}",
                        sink_config.display_name(),
                        class
                    );
                    dropped.push(sink_config.id.clone());
                }
                // Initialization failures are already reported by the registry
                Err(_) => {}
            }
        }
        dropped
    }

    fn build_sink(&self, config: &SinkConfig) -> Result<()> {
        let sink = sink_from_config(config)
            .ok_or_else(|| SinklogError::UnknownSinkClass(config.class.clone()))?;
        let name = config.display_name().to_string();
        self.core.sinks.add_sink(sink, &name, &[])
    }

    /// Flush every sink
    pub fn flush_all(&self) -> Result<()> {
        self.core.sinks.flush_all()
    }

    /// Close every sink and drop every logger
    pub fn close_all(&self) {
        self.core.sinks.close_all();
        self.loggers.clear();
    }
}

static GLOBAL: OnceLock<LogContext> = OnceLock::new();

/// The process-wide context, built on first access
///
/// Configuration comes from the file named by `SINKLOG_CONFIG`, else from
/// `logger.res` in the working directory if it exists. Debug builds get a
/// console sink when the configuration lists no sinks.
pub fn global() -> &'static LogContext {
    GLOBAL.get_or_init(build_global)
}

/// Get a logger from the process-wide context
pub fn get_logger(name: &str) -> Arc<Logger> {
    global().get_logger(name)
}

fn global_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

fn build_global() -> LogContext {
    let config = match global_config_path() {
        Some(path) => LoggerConfig::from_file(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring logger configuration {}: {}", path.display(), e);
            LoggerConfig::default()
        }),
        None => LoggerConfig::default(),
    };

    let has_sinks = !config.sinks.is_empty();
    let context = LogContext::new(config);
    if cfg!(debug_assertions) && !has_sinks {
        let _ = context.add_sink(Box::new(ConsoleSink::new()), "console", &[]);
    }
    context
}
