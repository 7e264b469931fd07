use clap::Parser;
use colored::Colorize;
use sinklog::{
    ConsoleSink, Level, LogContext, LoggerConfig, Result, RollingFileSink, SinklogError,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// sinklog - write lines of text through a configured logging context
#[derive(Parser)]
#[command(name = "sinklog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Logger configuration (.res, .properties, .toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logger name, `Prefix::name` is split when auto-prefix is on
    #[arg(short, long, default_value = "sinklog")]
    logger: String,

    /// Level every line is written at
    #[arg(long, default_value = "INFO", value_parser = parse_level)]
    level: Level,

    /// Global threshold, overrides the configuration
    #[arg(short, long, value_parser = parse_level)]
    threshold: Option<Level>,

    /// Also write to a rolling file with this base path
    #[arg(short, long)]
    rolling: Option<PathBuf>,

    /// Roll limit in bytes for --rolling
    #[arg(long, default_value = "10485760")]
    max_size: u64,

    /// Backups kept for --rolling
    #[arg(long, default_value = "10")]
    backups: usize,

    /// Split `Prefix::name` logger names
    #[arg(long)]
    auto_prefix: bool,
}

fn parse_level(value: &str) -> std::result::Result<Level, String> {
    Level::parse(value).ok_or_else(|| format!("unknown level: {}", value))
}

impl Cli {
    fn build_context(&self) -> Result<LogContext> {
        let config = match &self.config {
            Some(path) => LoggerConfig::from_file(path)?,
            None => LoggerConfig::default(),
        };
        let has_sinks = !config.sinks.is_empty();
        let context = LogContext::new(config);

        if let Some(level) = self.threshold {
            context.set_debug_level(level);
        }
        if self.auto_prefix {
            context.set_auto_prefix(true);
        }

        if let Some(base) = &self.rolling {
            let file = base.to_string_lossy().to_string();
            let max_size = self.max_size.to_string();
            let backups = self.backups.to_string();
            context.add_sink(
                Box::new(RollingFileSink::new()),
                "rolling",
                &["file", &file, "maxlogsize", &max_size, "maxbackupindex", &backups],
            )?;
        }

        if !has_sinks && self.rolling.is_none() {
            context.add_sink(Box::new(ConsoleSink::new()), "console", &[])?;
        }
        Ok(context)
    }

    fn run(&self) -> Result<()> {
        let context = self.build_context()?;
        let logger = context.get_logger(&self.logger);

        let reader: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
                SinklogError::ConfigError(format!("Failed to open {}: {}", path.display(), e))
            })?)),
            None => Box::new(io::stdin().lock()),
        };

        let mut lines = 0usize;
        let mut failed = 0usize;
        for line in reader.lines() {
            let line = line?;
            let report = logger.write(self.level, format_args!("{}", line));
            lines += 1;
            failed += report.failed;
        }

        context.flush_all()?;
        context.close_all();
        tracing::info!(lines, failed, "Finished writing log lines");

        if failed > 0 {
            eprintln!(
                "{} {} sink write(s) failed",
                "⚠".yellow().bold(),
                failed
            );
        }
        Ok(())
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();
    if let Err(e) = cli.run() {
        eprintln!("{} {}", "✗ Error:".red().bold(), e);
        std::process::exit(1);
    }
}
