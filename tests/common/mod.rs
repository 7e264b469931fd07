use sinklog::{Level, Result, Sink, SinkConfig, SinkWrite};
use std::sync::{Arc, Mutex};

/// A captured message: level, header and body
pub type Captured = Arc<Mutex<Vec<(Level, String, String)>>>;

/// Sink that keeps every message it accepts in memory
pub struct CaptureSink {
    config: SinkConfig,
    messages: Captured,
}

impl CaptureSink {
    pub fn new() -> (Self, Captured) {
        let messages: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Self {
            config: SinkConfig::for_class("capture", "CaptureSink"),
            messages: Arc::clone(&messages),
        };
        (sink, messages)
    }
}

impl Sink for CaptureSink {
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
        self.messages
            .lock()
            .unwrap()
            .push((level, header.to_string(), body.to_string()));
        SinkWrite::Written(header.len() + body.len())
    }

    fn close(&mut self) {}
}

/// Bodies of the captured messages, without the trailing newline
pub fn bodies(messages: &Captured) -> Vec<String> {
    messages
        .lock()
        .unwrap()
        .iter()
        .map(|(_, _, body)| body.trim_end_matches('\n').to_string())
        .collect()
}
