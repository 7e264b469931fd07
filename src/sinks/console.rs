use crate::config::SinkConfig;
use crate::error::Result;
use crate::level::Level;
use crate::sinks::{Sink, SinkWrite};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

/// Writes every message to standard output
#[derive(Debug)]
pub struct ConsoleSink {
    config: SinkConfig,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            config: SinkConfig::for_class("console", "LogConsoleSink"),
        }
    }

    pub fn create_instance() -> Box<dyn Sink> {
        Box::new(Self::new())
    }

    /// Color a message body by level, keeping the line terminator uncolored
    fn paint(level: Level, text: &str) -> ColoredString {
        if level >= Level::ERROR {
            text.red().bold()
        } else if level >= Level::WARNING {
            text.yellow()
        } else if level >= Level::INFO {
            text.normal()
        } else {
            text.dimmed()
        }
    }
}

impl Sink for ConsoleSink {
    fn config(&self) -> &SinkConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SinkConfig {
        &mut self.config
    }

    fn initialize(&mut self, args: &[&str]) -> Result<()> {
        self.config.apply_args(args)
    }

    fn write(&mut self, level: Level, header: &str, body: &str) -> SinkWrite {
        if !self.within_range(level) {
            return SinkWrite::Filtered;
        }

        let mut out = io::stdout().lock();
        let result = if self.config.color {
            let text = body.trim_end_matches('\n');
            let newline = &body[text.len()..];
            write!(out, "{}{}{}", header.dimmed(), Self::paint(level, text), newline)
        } else {
            write!(out, "{}{}", header, body)
        };

        match result {
            Ok(()) => SinkWrite::Written(header.len() + body.len()),
            Err(_) => SinkWrite::IoError,
        }
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn close(&mut self) {
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_filters_below_threshold() {
        let mut sink = ConsoleSink::new();
        sink.set_debug_level(Level::WARNING);

        assert_eq!(sink.write(Level::INFO, "hdr ", "hidden\n"), SinkWrite::Filtered);
        assert_eq!(
            sink.write(Level::ERROR, "hdr ", "shown\n"),
            SinkWrite::Written("hdr shown\n".len())
        );
    }

    #[test]
    fn test_console_initialize_applies_args() {
        let mut sink = ConsoleSink::new();
        sink.initialize(&["debuglevel", "ERROR", "color", "true"]).unwrap();
        assert_eq!(sink.debug_level(), Level::ERROR);
        assert!(sink.config().color);
        assert_eq!(sink.name(), "console");
    }
}
