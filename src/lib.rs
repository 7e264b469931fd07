// Library exports for the sinklog logging engine

pub mod buffer;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
mod macros;
pub mod sinks;

pub use buffer::{BufferPool, MsgBuffer, PooledBuffer};
pub use config::{LoggerConfig, Properties, SinkConfig};
pub use context::{get_logger, global, LogContext};
pub use error::{Result, SinklogError};
pub use format::{Formatter, HeaderFields, TimeFormat};
pub use level::Level;
pub use logger::{LogIndent, Logger, LoggerRegistry};
pub use sinks::{
    create_sink, ConsoleSink, DispatchMode, DispatchReport, FileSink, RollTrigger,
    RollingFileSink, Sink, SinkRegistry, SinkWrite,
};
