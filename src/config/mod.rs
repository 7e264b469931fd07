// Config module - Typed logger and sink configuration

mod properties;

pub use properties::Properties;

use crate::error::{Result, SinklogError};
use crate::format::TimeFormat;
use crate::level::Level;
use crate::sinks::{DispatchMode, RollTrigger};
use properties::parse_bool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default roll limit for rolling file sinks (10MB)
pub const DEFAULT_MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of backups kept by rolling file sinks
pub const DEFAULT_MAX_BACKUP_INDEX: usize = 10;

/// Default base name for file sinks
pub const DEFAULT_LOG_FILE: &str = "logfile";

/// Configuration for one sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Identifier used in the `sinks` list
    #[serde(default)]
    pub id: String,

    /// Sink class looked up in the factory table
    #[serde(default)]
    pub class: String,

    /// Sink name, defaults to the identifier
    #[serde(default)]
    pub name: Option<String>,

    /// Messages below this level are filtered by the sink
    #[serde(default, alias = "debuglevel")]
    pub debug_level: Level,

    /// Target file (base name for rolling sinks)
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Number of rolled backups to keep
    #[serde(default = "default_max_backup_index", alias = "maxbackupindex")]
    pub max_backup_index: usize,

    /// Roll limit in bytes, 0 means the default
    #[serde(default = "default_max_log_size", alias = "maxlogsize")]
    pub max_log_size: u64,

    /// Append to an existing file instead of truncating it
    #[serde(default)]
    pub append: bool,

    /// Flush after every write
    #[serde(default = "default_autoflush")]
    pub autoflush: bool,

    /// Colorize console output
    #[serde(default)]
    pub color: bool,

    /// When a rolling sink rolls over
    #[serde(default, alias = "rolltrigger")]
    pub roll_trigger: RollTrigger,
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_max_backup_index() -> usize {
    DEFAULT_MAX_BACKUP_INDEX
}

fn default_max_log_size() -> u64 {
    DEFAULT_MAX_LOG_SIZE
}

fn default_autoflush() -> bool {
    true
}

fn default_append_newline() -> bool {
    true
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            class: String::new(),
            name: None,
            debug_level: Level::NONE,
            file: default_log_file(),
            max_backup_index: default_max_backup_index(),
            max_log_size: default_max_log_size(),
            append: false,
            autoflush: default_autoflush(),
            color: false,
            roll_trigger: RollTrigger::default(),
        }
    }
}

impl SinkConfig {
    /// Create a config for a sink class with default settings
    pub fn for_class(id: &str, class: &str) -> Self {
        Self {
            id: id.to_string(),
            class: class.to_string(),
            ..Self::default()
        }
    }

    /// Name the sink is registered under
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Apply one `key=value` setting
    ///
    /// Keys the core does not know are ignored.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let sink = self.display_name().to_string();
        let invalid = |what: &str| {
            SinklogError::ConfigValidationError(format!(
                "Invalid {} for sink {}: {}",
                what, sink, value
            ))
        };

        match key {
            "name" => self.name = Some(value.to_string()),
            "class" => self.class = value.to_string(),
            "debuglevel" => {
                self.debug_level = Level::parse(value).ok_or_else(|| invalid("debuglevel"))?
            }
            "file" => self.file = PathBuf::from(value),
            "maxbackupindex" => {
                self.max_backup_index = value.parse().map_err(|_| invalid("maxbackupindex"))?
            }
            "maxlogsize" => {
                self.max_log_size = value.parse().map_err(|_| invalid("maxlogsize"))?
            }
            "append" => self.append = parse_bool(value).ok_or_else(|| invalid("append"))?,
            "autoflush" => {
                self.autoflush = parse_bool(value).ok_or_else(|| invalid("autoflush"))?
            }
            "color" => self.color = parse_bool(value).ok_or_else(|| invalid("color"))?,
            "rolltrigger" => {
                self.roll_trigger = RollTrigger::parse(value).ok_or_else(|| invalid("rolltrigger"))?
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply sink initialization arguments given as key/value pairs
    ///
    /// `["file", "app.log", "maxlogsize", "1024"]`. A trailing key without a
    /// value is ignored.
    pub fn apply_args(&mut self, args: &[&str]) -> Result<()> {
        for pair in args.chunks_exact(2) {
            self.apply(pair[0], pair[1])?;
        }
        Ok(())
    }

    /// Build a sink config from the `<id>.<key>` entries of a property store
    pub fn from_properties(props: &Properties, id: &str) -> Result<Self> {
        let mut config = Self {
            id: id.to_string(),
            ..Self::default()
        };
        let prefix = format!("{}.", id);
        for (key, value) in props.starting_with(&prefix) {
            config.apply(&key[prefix.len()..], value)?;
        }
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.class.is_empty() {
            return Err(SinklogError::ConfigValidationError(format!(
                "Sink {} has no class",
                self.display_name()
            )));
        }
        if self.file.as_os_str().is_empty() {
            return Err(SinklogError::ConfigValidationError(format!(
                "Sink {} has an empty file name",
                self.display_name()
            )));
        }
        Ok(())
    }
}

/// Engine configuration, validated once at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Global severity threshold
    #[serde(default, alias = "debuglevel")]
    pub debug_level: Level,

    /// Split `Prefix::name` logger names and show the prefix column
    #[serde(default, alias = "autoprefix")]
    pub auto_prefix: bool,

    /// Header timestamp layout
    #[serde(default, alias = "timeformat")]
    pub time_format: TimeFormat,

    /// Terminate every message body with a newline
    #[serde(default = "default_append_newline", alias = "newline")]
    pub append_newline: bool,

    /// How writes to sinks are serialized
    #[serde(default)]
    pub dispatch: DispatchMode,

    /// Sinks created at startup, in fan-out order
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,

    /// Identifiers of sink entries dropped while loading
    #[serde(skip)]
    pub skipped_sinks: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            debug_level: Level::NONE,
            auto_prefix: false,
            time_format: TimeFormat::default(),
            append_newline: default_append_newline(),
            dispatch: DispatchMode::default(),
            sinks: Vec::new(),
            skipped_sinks: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Load configuration from a file (supports TOML, JSON and flat properties)
    ///
    /// Only an unreadable or unparsable file is an error. Bad values are
    /// dropped one by one with a warning: a bad sink entry loses that sink, a
    /// bad top-level value keeps its default.
    ///
    /// # Arguments
    /// * `path` - Configuration file; the extension selects the format
    ///
    /// # Returns
    /// * `Ok(LoggerConfig)` - Configuration with every usable entry
    /// * `Err(SinklogError)` - File missing, unreadable or of unknown format
    pub fn from_file(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut config = match extension {
            "res" | "properties" => Self::from_properties(&Properties::from_file(path)?)?,
            "toml" | "json" => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    SinklogError::ConfigError(format!("Failed to read config file: {}", e))
                })?;
                if extension == "toml" {
                    Self::parse_toml(&contents)?
                } else {
                    Self::parse_json(&contents)?
                }
            }
            _ => {
                return Err(SinklogError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml, .json, .res or .properties",
                    extension
                )))
            }
        };

        config.assign_sink_ids();
        if let Err(e) = config.validate() {
            tracing::warn!("Ignoring timeformat: {}", e);
            config.time_format = TimeFormat::default();
        }
        Ok(config)
    }

    /// Parse TOML configuration
    pub fn parse_toml(contents: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(contents)
            .map_err(|e| SinklogError::InvalidConfig(format!("Failed to parse TOML: {}", e)))?;
        let sinks = table.remove("sinks");

        let table: toml::Table = table
            .into_iter()
            .filter(|(key, value)| {
                let mut single = toml::Table::new();
                single.insert(key.clone(), value.clone());
                keep_setting(key, toml::Value::Table(single).try_into::<LoggerConfig>())
            })
            .collect();
        let mut config: LoggerConfig = toml::Value::Table(table)
            .try_into()
            .map_err(|e| SinklogError::InvalidConfig(format!("Failed to parse TOML: {}", e)))?;

        match sinks {
            Some(toml::Value::Array(entries)) => {
                for (index, entry) in entries.into_iter().enumerate() {
                    let id = entry.get("id").and_then(|v| v.as_str()).map(str::to_string);
                    config.push_sink(index, id, entry.try_into::<SinkConfig>());
                }
            }
            Some(_) => tracing::warn!("Ignoring sinks: expected an array of tables"),
            None => {}
        }
        config.assign_sink_ids();
        Ok(config)
    }

    /// Parse JSON configuration
    pub fn parse_json(contents: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(contents)
            .map_err(|e| SinklogError::InvalidConfig(format!("Failed to parse JSON: {}", e)))?;
        let serde_json::Value::Object(mut object) = value else {
            return Err(SinklogError::InvalidConfig(
                "Failed to parse JSON: expected an object".to_string(),
            ));
        };
        let sinks = object.remove("sinks");

        let object: serde_json::Map<String, serde_json::Value> = object
            .into_iter()
            .filter(|(key, value)| {
                let mut single = serde_json::Map::new();
                single.insert(key.clone(), value.clone());
                keep_setting(
                    key,
                    serde_json::from_value::<LoggerConfig>(serde_json::Value::Object(single)),
                )
            })
            .collect();
        let mut config: LoggerConfig = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| SinklogError::InvalidConfig(format!("Failed to parse JSON: {}", e)))?;

        match sinks {
            Some(serde_json::Value::Array(entries)) => {
                for (index, entry) in entries.into_iter().enumerate() {
                    let id = entry.get("id").and_then(|v| v.as_str()).map(str::to_string);
                    config.push_sink(index, id, serde_json::from_value::<SinkConfig>(entry));
                }
            }
            Some(_) => tracing::warn!("Ignoring sinks: expected an array of objects"),
            None => {}
        }
        config.assign_sink_ids();
        Ok(config)
    }

    /// Append a parsed sink entry, or record it as skipped
    fn push_sink<E: std::fmt::Display>(
        &mut self,
        index: usize,
        id: Option<String>,
        parsed: std::result::Result<SinkConfig, E>,
    ) {
        let id = id.unwrap_or_else(|| format!("sink{}", index));
        match parsed {
            Ok(mut sink) => {
                if sink.id.is_empty() {
                    sink.id = id;
                }
                self.sinks.push(sink);
            }
            Err(e) => {
                tracing::warn!("Dropping sink {}: {}", id, e);
                self.skipped_sinks.push(id);
            }
        }
    }

    /// Build configuration from a flat property store
    ///
    /// ```text
    /// debuglevel=INFO
    /// sinks=console,roll
    /// console.class=LogConsoleSink
    /// roll.class=LogRollingFileSink
    /// roll.file=/var/log/app
    /// roll.maxlogsize=1048576
    /// ```
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let mut config = LoggerConfig::default();

        if let Some(level) = parsed_setting(props, "debuglevel", Level::parse) {
            config.debug_level = level;
        }
        if let Some(enabled) = parsed_setting(props, "autoprefix", parse_bool) {
            config.auto_prefix = enabled;
        }
        if let Some(value) = props.get("timeformat") {
            config.time_format = TimeFormat::from(value.to_string());
        }
        if let Some(enabled) = parsed_setting(props, "newline", parse_bool) {
            config.append_newline = enabled;
        }
        if let Some(mode) = parsed_setting(props, "dispatch", DispatchMode::parse) {
            config.dispatch = mode;
        }

        for (index, id) in props.get_list("sinks").into_iter().enumerate() {
            let parsed = SinkConfig::from_properties(props, &id);
            config.push_sink(index, Some(id), parsed);
        }

        Ok(config)
    }

    /// Give every sink without an identifier a positional one
    fn assign_sink_ids(&mut self) {
        for (index, sink) in self.sinks.iter_mut().enumerate() {
            if sink.id.is_empty() {
                sink.id = format!("sink{}", index);
            }
        }
    }

    /// Validate the configuration
    ///
    /// Sink classes are not checked here: unknown classes are dropped when
    /// sinks are built.
    pub fn validate(&self) -> Result<()> {
        self.time_format.validate()
    }
}

/// Parse the top-level property `key`, warning about and skipping bad values
fn parsed_setting<T>(props: &Properties, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let value = props.get(key)?;
    let parsed = parse(value);
    if parsed.is_none() {
        tracing::warn!("Ignoring invalid value for {}: {}", key, value);
    }
    parsed
}

/// Whether a single top-level setting deserializes; bad ones are logged
fn keep_setting<E: std::fmt::Display>(key: &str, parsed: std::result::Result<LoggerConfig, E>) -> bool {
    match parsed {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Ignoring invalid value for {}: {}", key, e);
            false
        }
    }
}
