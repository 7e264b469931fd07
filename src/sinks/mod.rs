// Sinks module - Output destinations and their registry

mod console;
mod factory;
mod file;
mod registry;
mod rolling;

pub use console::ConsoleSink;
pub use factory::{create_sink, sink_classes, sink_from_config, SinkFactory};
pub use file::FileSink;
pub use registry::{DispatchMode, DispatchReport, SinkRegistry};
pub use rolling::{backup_path, RollTrigger, RollingFileSink};

use crate::config::SinkConfig;
use crate::error::Result;
use crate::level::Level;

/// Write code for a message the sink filtered out
pub const SINK_WRITE_FILTERED: i64 = 0;
/// Write code for a failed write
pub const SINK_WRITE_IO_ERROR: i64 = -1;

/// Outcome of a single sink write
///
/// Informational only: the registry never retries and never drops a sink
/// because of a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkWrite {
    /// Level below the sink's threshold, nothing written
    Filtered,
    /// Number of bytes written
    Written(usize),
    /// The write was attempted and failed
    IoError,
}

impl SinkWrite {
    /// Integer code: 0 filtered, -1 I/O error, otherwise bytes written
    pub fn code(self) -> i64 {
        match self {
            SinkWrite::Filtered => SINK_WRITE_FILTERED,
            SinkWrite::Written(n) => n as i64,
            SinkWrite::IoError => SINK_WRITE_IO_ERROR,
        }
    }
}

/// A destination for formatted log output
///
/// Every sink carries a [`SinkConfig`] holding its name and threshold; the
/// provided methods read and update it. Sinks are owned by the
/// [`SinkRegistry`], which is the only component that closes them.
pub trait Sink: Send {
    fn config(&self) -> &SinkConfig;

    fn config_mut(&mut self) -> &mut SinkConfig;

    /// Replace the sink's configuration before initialization
    fn configure(&mut self, config: SinkConfig) {
        *self.config_mut() = config;
    }

    fn name(&self) -> &str {
        self.config().display_name()
    }

    fn set_name(&mut self, name: &str) {
        self.config_mut().name = Some(name.to_string());
    }

    fn debug_level(&self) -> Level {
        self.config().debug_level
    }

    fn set_debug_level(&mut self, level: Level) {
        self.config_mut().debug_level = level;
    }

    /// True if a message at `level` passes this sink's threshold
    fn within_range(&self, level: Level) -> bool {
        level.passes(self.debug_level())
    }

    /// Prepare the sink for writing
    ///
    /// `args` are key/value pairs applied on top of the configuration, e.g.
    /// `["file", "app.log"]`.
    fn initialize(&mut self, args: &[&str]) -> Result<()>;

    /// Filter and write one message
    fn write(&mut self, level: Level, header: &str, body: &str) -> SinkWrite;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the sink's resources
    fn close(&mut self);
}
