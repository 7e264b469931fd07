use crate::config::SinkConfig;
use crate::sinks::{ConsoleSink, FileSink, RollingFileSink, Sink};

/// Constructor for a sink class
pub type SinkFactory = fn() -> Box<dyn Sink>;

/// Sink classes that can be created by name
const SINK_FACTORIES: &[(&str, SinkFactory)] = &[
    ("LogConsoleSink", ConsoleSink::create_instance),
    ("LogRollingFileSink", RollingFileSink::create_instance),
    ("LogFileSink", FileSink::create_instance),
    ("console", ConsoleSink::create_instance),
    ("rollingfile", RollingFileSink::create_instance),
    ("file", FileSink::create_instance),
];

/// Create a sink from its class name, None for unknown classes
pub fn create_sink(class: &str) -> Option<Box<dyn Sink>> {
    SINK_FACTORIES
        .iter()
        .find(|(name, _)| *name == class)
        .map(|(_, factory)| factory())
}

/// Create a sink from a configuration entry, carrying the configuration over
pub fn sink_from_config(config: &SinkConfig) -> Option<Box<dyn Sink>> {
    let mut sink = create_sink(&config.class)?;
    sink.configure(config.clone());
    Some(sink)
}

/// Names of every known sink class
pub fn sink_classes() -> impl Iterator<Item = &'static str> {
    SINK_FACTORIES.iter().map(|(name, _)| *name)
}
