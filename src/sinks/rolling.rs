use crate::config::{SinkConfig, DEFAULT_MAX_LOG_SIZE};
use crate::error::{Result, SinklogError};
use crate::level::Level;
use crate::sinks::{FileSink, Sink, SinkWrite};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// When a rolling sink rolls over to a fresh file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollTrigger {
    /// Roll before a write that would push a non-empty file past the limit,
    /// so the triggering message starts the new file
    #[default]
    BeforeOverflow,
    /// Roll before a write once the file is already past the limit
    Exceeded,
}

impl RollTrigger {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "before-overflow" | "beforeoverflow" | "overflow" => Some(RollTrigger::BeforeOverflow),
            "exceeded" => Some(RollTrigger::Exceeded),
            _ => None,
        }
    }

    fn should_roll(self, current: u64, pending: u64, limit: u64) -> bool {
        match self {
            RollTrigger::BeforeOverflow => current > 0 && current + pending > limit,
            RollTrigger::Exceeded => current > limit,
        }
    }
}

/// Path of backup `index` for `base`: `<base>.<index>.log`
pub fn backup_path(base: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{}.log", index));
    PathBuf::from(name)
}

/// File sink that rolls over to a fresh file when a size limit is reached
///
/// The live file is the configured base path. On rollover backups shift up
/// one index (`.1.log` becomes `.2.log` and so on, the oldest is
/// overwritten), the live file becomes `.1.log`, and a fresh live file is
/// opened.
///
/// The rollover check and the byte counter are updated together under
/// `&mut self`; the [`SinkRegistry`] holds a per-sink lock for each write, so
/// concurrent loggers cannot interleave a check with another thread's
/// rollover.
///
/// [`SinkRegistry`]: crate::sinks::SinkRegistry
#[derive(Debug)]
pub struct RollingFileSink {
    inner: FileSink,
    /// Bytes in the currently open file
    current_bytes: u64,
    /// Roll limit in bytes
    max_bytes: u64,
    max_backup_index: usize,
    trigger: RollTrigger,
    rollovers: u64,
}

impl Default for RollingFileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingFileSink {
    pub fn new() -> Self {
        Self::with_config(SinkConfig::for_class("rolling", "LogRollingFileSink"))
    }

    pub fn with_config(config: SinkConfig) -> Self {
        Self {
            inner: FileSink::with_config(config),
            current_bytes: 0,
            max_bytes: DEFAULT_MAX_LOG_SIZE,
            max_backup_index: 0,
            trigger: RollTrigger::default(),
            rollovers: 0,
        }
    }

    pub fn create_instance() -> Box<dyn Sink> {
        Box::new(Self::new())
    }

    /// Bytes written to the currently open file
    pub fn current_bytes(&self) -> u64 {
        self.current_bytes
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn max_backup_index(&self) -> usize {
        self.max_backup_index
    }

    /// Number of rollovers since initialization
    pub fn rollovers(&self) -> u64 {
        self.rollovers
    }

    pub fn base_path(&self) -> &Path {
        &self.inner.config().file
    }

    /// Close the live file, shift backups and open a fresh live file
    ///
    /// A failed rename is reported after the live file has been reopened, so
    /// the sink keeps writing. If the live file itself could not be moved it
    /// is reopened for appending instead of being truncated. If the reopen
    /// fails the byte count is reset, so later writes fail without shifting
    /// the backups again.
    ///
    /// # Returns
    /// * `Ok(())` - Backups shifted and a fresh live file is open
    /// * `Err(SinklogError)` - The first rename or reopen failure
    pub fn roll_over(&mut self) -> Result<()> {
        self.inner.close();
        let base = self.inner.config().file.clone();
        let mut failure = None;

        for index in (1..self.max_backup_index).rev() {
            let from = backup_path(&base, index);
            let to = backup_path(&base, index + 1);
            if let Err(e) = rename_if_exists(&from, &to) {
                failure.get_or_insert(e);
            }
        }

        let mut live_moved = true;
        if self.max_backup_index > 0 {
            if let Err(e) = rename_if_exists(&base, &backup_path(&base, 1)) {
                live_moved = false;
                failure.get_or_insert(e);
            }
        }

        if let Err(e) = self.inner.open(&base, !live_moved) {
            self.current_bytes = 0;
            return Err(e);
        }
        self.current_bytes = if live_moved {
            0
        } else {
            self.inner.size().unwrap_or(0)
        };
        self.rollovers += 1;

        tracing::debug!(
            file = %base.display(),
            backups = self.max_backup_index,
            "Rolled over log file"
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Rename `from` to `to`, overwriting `to`; a missing `from` is not an error
fn rename_if_exists(from: &Path, to: &Path) -> Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SinklogError::LogRotationError(format!(
            "Failed to rename {} to {}: {}",
            from.display(),
            to.display(),
            e
        ))),
    }
}

impl Sink for RollingFileSink {
    fn config(&self) -> &SinkConfig {
        self.inner.config()
    }

    fn config_mut(&mut self) -> &mut SinkConfig {
        self.inner.config_mut()
    }

    /// Open the base file for appending and resume counting from its size
    fn initialize(&mut self, args: &[&str]) -> Result<()> {
        self.inner.config_mut().apply_args(args)?;

        let config = self.inner.config();
        self.max_bytes = match config.max_log_size {
            0 => DEFAULT_MAX_LOG_SIZE,
            n => n,
        };
        self.max_backup_index = config.max_backup_index;
        self.trigger = config.roll_trigger;

        let base = config.file.clone();
        self.inner.open(&base, true)?;
        self.current_bytes = self.inner.size().unwrap_or(0);
        self.rollovers = 0;
        Ok(())
    }

    fn write(&mut self, level: Level, header: &str, body: &str) -> SinkWrite {
        if !self.within_range(level) {
            return SinkWrite::Filtered;
        }

        let pending = (header.len() + body.len()) as u64;
        if self.trigger.should_roll(self.current_bytes, pending, self.max_bytes) {
            if let Err(e) = self.roll_over() {
                tracing::warn!("Rollover of {} failed: {}", self.base_path().display(), e);
            }
        }

        let result = self.inner.write_entry(header, body);
        if let SinkWrite::Written(n) = result {
            self.current_bytes += n as u64;
        }
        result
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
