use crate::config::SinkConfig;
use crate::error::{Result, SinklogError};
use crate::level::Level;
use crate::sinks::{Sink, SinkWrite};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes messages to a single file
///
/// The file is truncated on open unless `append` is configured. With
/// `autoflush` (the default) every write is flushed through to the file.
#[derive(Debug)]
pub struct FileSink {
    config: SinkConfig,
    /// Open handle, None before initialize and after close
    file: Option<BufWriter<File>>,
    /// Path of the currently open file
    path: Option<PathBuf>,
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSink {
    pub fn new() -> Self {
        Self::with_config(SinkConfig::for_class("file", "LogFileSink"))
    }

    pub fn with_config(config: SinkConfig) -> Self {
        Self {
            config,
            file: None,
            path: None,
        }
    }

    pub fn create_instance() -> Box<dyn Sink> {
        Box::new(Self::new())
    }

    /// Open `path`, closing any file that is already open
    ///
    /// Missing parent directories are created.
    pub(crate) fn open(&mut self, path: &Path, append: bool) -> Result<()> {
        self.close_file();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SinklogError::LogFileError(format!(
                    "Failed to create log directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|e| {
                SinklogError::LogFileError(format!("Failed to open {}: {}", path.display(), e))
            })?;

        self.file = Some(BufWriter::new(file));
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Current length of the open file, including unflushed bytes
    pub(crate) fn size(&self) -> Option<u64> {
        let writer = self.file.as_ref()?;
        let on_disk = writer.get_ref().metadata().ok()?.len();
        Some(on_disk + writer.buffer().len() as u64)
    }

    /// Write without level filtering
    pub(crate) fn write_entry(&mut self, header: &str, body: &str) -> SinkWrite {
        let autoflush = self.config.autoflush;
        let Some(writer) = self.file.as_mut() else {
            return SinkWrite::IoError;
        };

        match write_parts(writer, header, body, autoflush) {
            Ok(()) => SinkWrite::Written(header.len() + body.len()),
            Err(_) => SinkWrite::IoError,
        }
    }

    fn close_file(&mut self) {
        if let Some(mut writer) = self.file.take() {
            let _ = writer.flush();
        }
        self.path = None;
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the open file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn write_parts(
    writer: &mut BufWriter<File>,
    header: &str,
    body: &str,
    autoflush: bool,
) -> std::io::Result<()> {
    writer.write_all(header.as_bytes())?;
    writer.write_all(body.as_bytes())?;
    if autoflush {
        writer.flush()?;
    }
    Ok(())
}

impl Sink for FileSink {
    fn config(&self) -> &SinkConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SinkConfig {
        &mut self.config
    }

    fn initialize(&mut self, args: &[&str]) -> Result<()> {
        self.config.apply_args(args)?;
        let path = self.config.file.clone();
        self.open(&path, self.config.append)
    }

    fn write(&mut self, level: Level, header: &str, body: &str) -> SinkWrite {
        if !self.within_range(level) {
            return SinkWrite::Filtered;
        }
        self.write_entry(header, body)
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.file.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.close_file();
    }
}
