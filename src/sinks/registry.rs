use crate::error::{Result, SinklogError};
use crate::level::Level;
use crate::sinks::{Sink, SinkWrite};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// How concurrent dispatches share the sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMode {
    /// Each sink has its own lock; threads may write different sinks at once
    #[default]
    PerSink,
    /// One lock is held for the whole fan-out, so every sink sees messages
    /// in the same order
    Serialized,
}

impl DispatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "per-sink" | "persink" => Some(DispatchMode::PerSink),
            "serialized" | "serialised" | "global" => Some(DispatchMode::Serialized),
            _ => None,
        }
    }
}

/// Count of sink outcomes for one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub written: usize,
    pub filtered: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn record(&mut self, outcome: SinkWrite) {
        match outcome {
            SinkWrite::Written(_) => self.written += 1,
            SinkWrite::Filtered => self.filtered += 1,
            SinkWrite::IoError => self.failed += 1,
        }
    }
}

/// A registered sink
struct SinkSlot {
    name: String,
    sink: Mutex<Box<dyn Sink>>,
}

impl SinkSlot {
    fn lock(&self) -> MutexGuard<'_, Box<dyn Sink>> {
        match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Ordered set of active sinks
///
/// Insertion order is the fan-out order. The registry owns every sink and is
/// the only place sinks are closed.
pub struct SinkRegistry {
    slots: RwLock<Vec<SinkSlot>>,
    /// Held for the whole fan-out in [`DispatchMode::Serialized`]
    arbiter: Mutex<()>,
    mode: DispatchMode,
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new(DispatchMode::default())
    }
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("sinks", &self.names())
            .field("mode", &self.mode)
            .finish()
    }
}

impl SinkRegistry {
    pub fn new(mode: DispatchMode) -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            arbiter: Mutex::new(()),
            mode,
        }
    }

    fn read_slots(&self) -> RwLockReadGuard<'_, Vec<SinkSlot>> {
        match self.slots.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_slots(&self) -> RwLockWriteGuard<'_, Vec<SinkSlot>> {
        match self.slots.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Name, initialize and append a sink
    ///
    /// The sink is attached even when initialization fails; its writes then
    /// report I/O errors.
    ///
    /// # Arguments
    /// * `sink` - Sink to register, usually from the factory table
    /// * `name` - Name the sink is registered and looked up under
    /// * `args` - Key/value initialization arguments, e.g. `["file", "app.log"]`
    ///
    /// # Returns
    /// * `Ok(())` - Sink initialized and attached
    /// * `Err(SinklogError)` - Sink attached, but initialization failed
    pub fn add_sink(&self, mut sink: Box<dyn Sink>, name: &str, args: &[&str]) -> Result<()> {
        sink.set_name(name);
        let result = sink
            .initialize(args)
            .map_err(|e| SinklogError::SinkInitError(name.to_string(), e.to_string()));
        if let Err(ref e) = result {
            tracing::warn!("{}", e);
        }
        self.attach(sink, name);
        result
    }

    /// Append an already initialized sink
    pub fn attach(&self, mut sink: Box<dyn Sink>, name: &str) {
        sink.set_name(name);
        self.write_slots().push(SinkSlot {
            name: name.to_string(),
            sink: Mutex::new(sink),
        });
        tracing::debug!("Attached sink {}", name);
    }

    /// Remove and close every sink named `name`
    ///
    /// Returns whether anything was removed.
    pub fn remove_sink(&self, name: &str) -> bool {
        let removed: Vec<SinkSlot> = {
            let mut slots = self.write_slots();
            let (removed, kept) = std::mem::take(&mut *slots)
                .into_iter()
                .partition(|slot| slot.name == name);
            *slots = kept;
            removed
        };

        for slot in &removed {
            slot.lock().close();
        }
        if !removed.is_empty() {
            tracing::debug!("Removed {} sink(s) named {}", removed.len(), name);
        }
        !removed.is_empty()
    }

    /// Send a message to every sink in order
    ///
    /// Each sink applies its own level filter. A failing sink does not stop
    /// delivery to the rest.
    pub fn dispatch(&self, level: Level, header: &str, body: &str) -> DispatchReport {
        let _arbiter = match self.mode {
            DispatchMode::Serialized => Some(match self.arbiter.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }),
            DispatchMode::PerSink => None,
        };

        let mut report = DispatchReport::default();
        for slot in self.read_slots().iter() {
            report.record(slot.lock().write(level, header, body));
        }
        report
    }

    /// Flush every sink, returning the first failure
    pub fn flush_all(&self) -> Result<()> {
        let mut first_error = None;
        for slot in self.read_slots().iter() {
            if let Err(e) = slot.lock().flush() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close every sink and empty the registry
    pub fn close_all(&self) {
        let slots = std::mem::take(&mut *self.write_slots());
        for slot in &slots {
            slot.lock().close();
        }
    }

    /// Set the threshold of every sink
    pub fn set_all_levels(&self, level: Level) {
        for slot in self.read_slots().iter() {
            slot.lock().set_debug_level(level);
        }
    }

    /// Run `f` on the first sink named `name`
    pub fn with_sink<R>(&self, name: &str, f: impl FnOnce(&mut dyn Sink) -> R) -> Option<R> {
        let slots = self.read_slots();
        let slot = slots.iter().find(|slot| slot.name == name)?;
        let mut sink = slot.lock();
        Some(f(sink.as_mut()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read_slots().iter().any(|slot| slot.name == name)
    }

    /// Sink names in fan-out order
    pub fn names(&self) -> Vec<String> {
        self.read_slots().iter().map(|slot| slot.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_slots().is_empty()
    }
}
