//! Log events and the attribute tree they carry.
//!
//! A [`LogEvent`] is created once per log call and handed to a
//! [`Handler`](crate::Handler) by reference. Its [`entries`](LogEvent::entries)
//! are an ordered list of [`Entry`] values: plain attributes, and group
//! markers that open a named scope enclosing every entry after them.
//!
//! ```rust
//! use boxlog::{Attr, Level, LogEvent};
//!
//! let event = LogEvent::new(Level::Info, "request served")
//!     .with_attr(Attr::string("op", "write"))
//!     .with_attr(Attr::group(
//!         "request",
//!         [Attr::string("id", "123"), Attr::int("size", 42)],
//!     ));
//! assert_eq!(event.attr_count(), 2);
//! ```

use core::{fmt, str::FromStr, time::Duration};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::ParseLevelError;

/// Severity of a [`LogEvent`], ordered from least to most severe.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Diagnostic detail, also switches handlers into verbose mode.
    Debug,
    /// Routine operational messages.
    #[default]
    Info,
    /// Something unexpected that the process recovered from.
    Warn,
    /// A failed operation.
    Error,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// The upper-case name used when rendering the level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let level = if name.eq_ignore_ascii_case("debug") {
            Level::Debug
        } else if name.eq_ignore_ascii_case("info") {
            Level::Info
        } else if name.eq_ignore_ascii_case("warn") || name.eq_ignore_ascii_case("warning") {
            Level::Warn
        } else if name.eq_ignore_ascii_case("error") {
            Level::Error
        } else {
            return Err(ParseLevelError::new(s));
        };
        Ok(level)
    }
}

/// The place in the source code an event was emitted from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path of the source file
    pub file: String,
    /// One-based line number
    pub line: u32,
}

impl SourceLocation {
    /// Creates a location from a file path and line number.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Captures the location of the caller.
    #[track_caller]
    pub fn caller() -> Self {
        let location = core::panic::Location::caller();
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The value half of an [`Attr`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Text, rendered quoted
    String(String),
    /// Signed integer
    I64(i64),
    /// Unsigned integer
    U64(u64),
    /// Floating point number
    F64(f64),
    /// Boolean flag
    Bool(bool),
    /// Elapsed time, rendered with its `Debug` form (`1.5s`)
    Duration(Duration),
    /// Opaque structured payload, rendered as indented JSON
    Structured(serde_json::Value),
    /// Nested attributes rendered as a group one level deeper
    Group(Vec<Attr>),
}

impl Value {
    /// Serializes `value` into a [`Value::Structured`].
    ///
    /// When serialization fails the value degrades to a [`Value::String`]
    /// holding its `Debug` representation, so building an attribute never
    /// fails.
    pub fn structured<T>(value: &T) -> Self
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        match serde_json::to_value(value) {
            Ok(json) => Value::Structured(json),
            Err(error) => {
                tracing::trace!(
                    target: "boxlog",
                    %error,
                    "structured value fell back to its debug representation"
                );
                Value::String(format!("{value:?}"))
            }
        }
    }

    /// Creates a [`Value::Group`] from a list of attributes.
    pub fn group(attrs: impl IntoIterator<Item = Attr>) -> Self {
        Value::Group(attrs.into_iter().collect())
    }

    pub(crate) fn is_empty_string(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(value) => f.write_str(value),
            Value::I64(value) => write!(f, "{value}"),
            Value::U64(value) => write!(f, "{value}"),
            Value::F64(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Duration(value) => write!(f, "{value:?}"),
            Value::Structured(value) => write!(f, "{value}"),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (index, attr) in attrs.iter().enumerate() {
                    if index != 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::U64(u64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::U64(value as u64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

/// Types that know how to present themselves as a log [`Value`].
///
/// Typically implemented by configuration structs, which present themselves
/// as a group of their interesting fields:
///
/// ```rust
/// use boxlog::{Attr, LogValue, Value};
///
/// struct GrpcConfig {
///     port: u16,
///     tls: bool,
/// }
///
/// impl LogValue for GrpcConfig {
///     fn log_value(&self) -> Value {
///         Value::group([
///             Attr::uint("port", u64::from(self.port)),
///             Attr::bool("tls", self.tls),
///         ])
///     }
/// }
///
/// let attr = Attr::logged("grpc", &GrpcConfig { port: 50051, tls: false });
/// assert!(matches!(attr.value, Value::Group(_)));
/// ```
pub trait LogValue {
    /// Returns the value to log in place of `self`.
    fn log_value(&self) -> Value;
}

/// A single key/value pair attached to an event or a group.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    /// The attribute name
    pub key: String,
    /// The attribute value
    pub value: Value,
}

impl Attr {
    /// Creates an attribute from anything convertible into a [`Value`].
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a string attribute.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    /// Creates a signed integer attribute.
    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::I64(value))
    }

    /// Creates an unsigned integer attribute.
    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, Value::U64(value))
    }

    /// Creates a floating point attribute.
    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::F64(value))
    }

    /// Creates a boolean attribute.
    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    /// Creates a duration attribute.
    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    /// Creates a structured attribute, see [`Value::structured`].
    pub fn structured<T>(key: impl Into<String>, value: &T) -> Self
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        Self::new(key, Value::structured(value))
    }

    /// Creates a nested group attribute.
    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Self {
        Self::new(key, Value::group(attrs))
    }

    /// Creates an `error` attribute holding the error's `Display` output.
    pub fn error(error: &(dyn core::error::Error + 'static)) -> Self {
        Self::string("error", error.to_string())
    }

    /// Creates an attribute from a [`LogValue`], resolving it immediately.
    pub fn logged(key: impl Into<String>, value: &(impl LogValue + ?Sized)) -> Self {
        Self::new(key, value.log_value())
    }

    /// Whether this attribute carries nothing at all and should be ignored.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty_string()
    }
}

/// One element of an event's entry list.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A key/value attribute
    Attribute(Attr),
    /// Opens a named group enclosing every entry that follows it
    GroupMarker {
        /// Name shown in the group header
        name: String,
    },
}

impl From<Attr> for Entry {
    fn from(attr: Attr) -> Self {
        Entry::Attribute(attr)
    }
}

/// One emitted log record.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEvent {
    /// When the event happened, if known
    pub timestamp: Option<DateTime<Local>>,
    /// Severity
    pub level: Level,
    /// Human readable message
    pub message: String,
    /// Where the event was emitted from, if captured
    pub source: Option<SourceLocation>,
    /// Ordered attributes and group markers
    pub entries: Vec<Entry>,
}

impl LogEvent {
    /// Creates an event without timestamp, source or entries.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            level,
            message: message.into(),
            source: None,
            entries: Vec::new(),
        }
    }

    /// Sets the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the timestamp to the current local time.
    pub fn timestamped_now(self) -> Self {
        self.with_timestamp(Local::now())
    }

    /// Sets the source location.
    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the source location to the caller of this method.
    #[track_caller]
    pub fn with_caller_source(self) -> Self {
        self.with_source(SourceLocation::caller())
    }

    /// Appends one attribute.
    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.entries.push(Entry::Attribute(attr));
        self
    }

    /// Appends several attributes in order.
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.entries.extend(attrs.into_iter().map(Entry::Attribute));
        self
    }

    /// Opens a named group; attributes appended afterwards are nested in it.
    pub fn with_group(mut self, name: impl Into<String>) -> Self {
        self.entries.push(Entry::GroupMarker { name: name.into() });
        self
    }

    /// Number of attributes directly in the entry list, markers excluded.
    pub fn attr_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Attribute(_)))
            .count()
    }
}
