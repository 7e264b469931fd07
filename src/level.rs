// Level module - Message classes and their numeric ranges

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A message level
///
/// Levels are plain integers so callers can use custom values between and
/// above the named classes. The named classes partition the range:
///
/// ```text
///   < 100  NONE
/// 100..199 DEBUG
/// 200..299 INFO
/// 300..399 WARN
/// 400..499 ERROR
///  >= 500  CRITICAL
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(pub i32);

impl Level {
    pub const NONE: Level = Level(0);
    pub const DEBUG: Level = Level(100);
    pub const INFO: Level = Level(200);
    pub const WARNING: Level = Level(300);
    pub const ERROR: Level = Level(400);
    pub const CRITICAL: Level = Level(500);

    /// Numeric value of the level
    pub fn value(self) -> i32 {
        self.0
    }

    /// Canonical class name for the range this level falls in
    pub fn name(self) -> &'static str {
        match self.0 {
            i32::MIN..=99 => "NONE",
            100..=199 => "DEBUG",
            200..=299 => "INFO",
            300..=399 => "WARN",
            400..=499 => "ERROR",
            _ => "CRITICAL",
        }
    }

    /// Look up a level by class name (case-insensitive)
    ///
    /// Both `WARN` and `WARNING` are accepted.
    pub fn from_name(name: &str) -> Option<Level> {
        match name.trim().to_ascii_uppercase().as_str() {
            "NONE" => Some(Level::NONE),
            "DEBUG" => Some(Level::DEBUG),
            "INFO" => Some(Level::INFO),
            "WARN" | "WARNING" => Some(Level::WARNING),
            "ERROR" => Some(Level::ERROR),
            "CRITICAL" => Some(Level::CRITICAL),
            _ => None,
        }
    }

    /// Parse a configuration value: either an integer or a class name
    pub fn parse(value: &str) -> Option<Level> {
        let value = value.trim();
        match value.parse::<i32>() {
            Ok(n) => Some(Level(n)),
            Err(_) => Level::from_name(value),
        }
    }

    /// True if a message at this level passes a `threshold` filter
    #[inline]
    pub fn passes(self, threshold: Level) -> bool {
        self >= threshold
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() keeps width/alignment flags working for header columns
        f.pad(self.name())
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i32),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Level(n)),
            Repr::Name(name) => Level::parse(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown debug level: {}", name))),
        }
    }
}
