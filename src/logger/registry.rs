use crate::context::Core;
use crate::logger::Logger;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Registry key: logger name and optional prefix
type LoggerKey = (String, Option<String>);

/// Separator between prefix and name in auto-prefixed logger names
const PREFIX_SEPARATOR: &str = "::";

/// Split `Prefix::name` at the first separator
///
/// Returns the name and the prefix; a name without separator has no prefix.
pub fn split_auto_prefix(name: &str) -> (&str, Option<&str>) {
    match name.split_once(PREFIX_SEPARATOR) {
        Some((prefix, rest)) => (rest, Some(prefix)),
        None => (name, None),
    }
}

/// Holds one [`Logger`] per distinct (name, prefix)
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<LoggerKey, Arc<Logger>>>,
    core: Arc<Core>,
}

impl LoggerRegistry {
    pub(crate) fn new(core: Arc<Core>) -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            core,
        }
    }

    fn read_loggers(&self) -> RwLockReadGuard<'_, HashMap<LoggerKey, Arc<Logger>>> {
        match self.loggers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_loggers(&self) -> RwLockWriteGuard<'_, HashMap<LoggerKey, Arc<Logger>>> {
        match self.loggers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Get the logger for `name` and `prefix`, creating it on first use
    ///
    /// # Arguments
    /// * `name` - Logger name; with auto-prefix and no explicit prefix,
    ///   `Prefix::name` is split at the first `::`
    /// * `prefix` - Explicit prefix; None only matches loggers created
    ///   without one
    ///
    /// # Returns
    /// The shared logger; repeated calls with the same key return the same
    /// instance.
    pub fn get_logger(&self, name: &str, prefix: Option<&str>) -> Arc<Logger> {
        let (name, prefix) = match prefix {
            None if self.core.auto_prefix() => split_auto_prefix(name),
            _ => (name, prefix),
        };
        let key = (name.to_string(), prefix.map(str::to_string));

        if let Some(logger) = self.read_loggers().get(&key) {
            return Arc::clone(logger);
        }

        // Another thread may have created it between the two locks
        let mut loggers = self.write_loggers();
        let logger = loggers
            .entry(key)
            .or_insert_with(|| Arc::new(Logger::new(name, prefix, Arc::clone(&self.core))));
        Arc::clone(logger)
    }

    /// Disable the logger named `name`, creating it if needed
    pub fn disable_logger(&self, name: &str) -> Arc<Logger> {
        let logger = self.get_logger(name, None);
        logger.disable();
        logger
    }

    /// Enable every registered logger
    pub fn enable_all_loggers(&self) {
        for logger in self.read_loggers().values() {
            logger.enable();
        }
    }

    /// Drop every logger; outstanding `Arc`s stay usable
    pub fn clear(&self) {
        self.write_loggers().clear();
    }

    pub fn len(&self) -> usize {
        self.read_loggers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_loggers().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerConfig;
    use crate::context::LogContext;

    #[test]
    fn test_split_auto_prefix() {
        assert_eq!(split_auto_prefix("MyClass::function"), ("function", Some("MyClass")));
        assert_eq!(split_auto_prefix("a::b::c"), ("b::c", Some("a")));
        assert_eq!(split_auto_prefix("plain"), ("plain", None));
        assert_eq!(split_auto_prefix("::name"), ("name", Some("")));
    }

    #[test]
    fn test_get_logger_is_idempotent() {
        let ctx = LogContext::new(LoggerConfig::default());
        let a = ctx.get_logger("net");
        let b = ctx.get_logger("net");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ctx.loggers().len(), 1);
    }

    #[test]
    fn test_prefix_is_part_of_identity() {
        let ctx = LogContext::new(LoggerConfig::default());
        let plain = ctx.get_logger("run");
        let prefixed = ctx.get_logger_with_prefix("run", Some("Job"));
        assert!(!Arc::ptr_eq(&plain, &prefixed));
        assert_eq!(prefixed.prefix(), Some("Job"));
        assert_eq!(plain.prefix(), None);
    }

    #[test]
    fn test_auto_prefix_split_only_when_enabled() {
        let ctx = LogContext::new(LoggerConfig::default());
        let verbatim = ctx.get_logger("MyClass::function");
        assert_eq!(verbatim.name(), "MyClass::function");
        assert_eq!(verbatim.prefix(), None);

        ctx.set_auto_prefix(true);
        let split = ctx.get_logger("MyClass::function");
        assert_eq!(split.name(), "function");
        assert_eq!(split.prefix(), Some("MyClass"));

        // Explicit prefix suppresses the split
        let explicit = ctx.get_logger_with_prefix("A::b", Some("P"));
        assert_eq!(explicit.name(), "A::b");
    }

    #[test]
    fn test_disable_and_enable_all() {
        let ctx = LogContext::new(LoggerConfig::default());
        let other = ctx.get_logger("other");
        let quiet = ctx.loggers().disable_logger("quiet");

        assert!(!quiet.is_enabled());
        assert!(other.is_enabled());
        assert!(Arc::ptr_eq(&quiet, &ctx.get_logger("quiet")));

        ctx.loggers().enable_all_loggers();
        assert!(quiet.is_enabled());
    }

    #[test]
    fn test_clear() {
        let ctx = LogContext::new(LoggerConfig::default());
        let before = ctx.get_logger("x");
        ctx.loggers().clear();
        assert!(ctx.loggers().is_empty());

        let after = ctx.get_logger("x");
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
