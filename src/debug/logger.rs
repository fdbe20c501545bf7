// Logger - `log` backend with a trace buffer
//
// Provides:
// - Configurable log levels
// - CPU trace capture (records logged with target `nesemu::cpu`)
// - Log output to stderr, a file and a bounded in-memory buffer

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

/// Target used by the CPU for per-instruction trace lines
pub const CPU_TRACE_TARGET: &str = "nesemu::cpu";

/// Log level
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warning,
    /// Info, warnings, and errors
    #[default]
    Info,
    /// Debug information
    Debug,
    /// Verbose trace logging (includes CPU traces)
    Trace,
}

impl LogLevel {
    /// Equivalent `log` crate filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::None => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(LogLevel::None),
            "error" => Ok(LogLevel::Error),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Trace entry
///
/// Represents a single buffered log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEntry {
    /// CPU trace line in nestest format
    Cpu(String),
    /// Any other log message
    Message {
        level: log::Level,
        target: String,
        text: String,
    },
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEntry::Cpu(line) => write!(f, "CPU: {}", line),
            TraceEntry::Message {
                level,
                target,
                text,
            } => write!(f, "[{:<5} {}] {}", level, target, text),
        }
    }
}

/// Logger
///
/// Implements `log::Log`. Records at or below the configured level go to
/// stderr (messages only), the optional log file and the trace buffer.
pub struct Logger {
    log_level: LogLevel,

    /// Maximum number of entries in the trace buffer (0 = unlimited)
    max_buffer_size: usize,

    trace_buffer: Mutex<VecDeque<TraceEntry>>,

    output_file: Mutex<Option<File>>,

    /// Echo non-trace messages to stderr
    echo: bool,
}

impl Logger {
    /// Create a logger at `level` with a 10000-entry buffer
    pub fn new(level: LogLevel) -> Self {
        Logger {
            log_level: level,
            max_buffer_size: 10000,
            trace_buffer: Mutex::new(VecDeque::new()),
            output_file: Mutex::new(None),
            echo: true,
        }
    }

    /// Set the maximum trace buffer size (0 = unlimited)
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Enable or disable echoing messages to stderr
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Also write every entry to the file at `path`
    pub fn with_log_file<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        if let Ok(mut output) = self.output_file.lock() {
            *output = Some(file);
        }
        Ok(self)
    }

    /// Current log level
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Register as the global `log` backend
    ///
    /// The logger lives for the rest of the program; the returned reference
    /// can be used to query the trace buffer.
    pub fn install(self) -> Result<&'static Logger, log::SetLoggerError> {
        let level = self.log_level.to_level_filter();
        let logger: &'static Logger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(level);
        Ok(logger)
    }

    /// The last `n` buffered entries, oldest first
    pub fn last_entries(&self, n: usize) -> Vec<TraceEntry> {
        match self.trace_buffer.lock() {
            Ok(buffer) => {
                let skip = buffer.len().saturating_sub(n);
                buffer.iter().skip(skip).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Number of buffered entries
    pub fn buffered(&self) -> usize {
        self.trace_buffer.lock().map_or(0, |buffer| buffer.len())
    }

    /// Drop every buffered entry
    pub fn clear(&self) {
        if let Ok(mut buffer) = self.trace_buffer.lock() {
            buffer.clear();
        }
    }

    fn add_entry(&self, entry: TraceEntry) {
        if let Ok(mut output) = self.output_file.lock() {
            if let Some(file) = output.as_mut() {
                let _ = writeln!(file, "{}", entry);
            }
        }

        if let Ok(mut buffer) = self.trace_buffer.lock() {
            buffer.push_back(entry);
            if self.max_buffer_size > 0 && buffer.len() > self.max_buffer_size {
                buffer.pop_front();
            }
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.log_level.to_level_filter()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = if record.target() == CPU_TRACE_TARGET && record.level() == log::Level::Trace
        {
            TraceEntry::Cpu(record.args().to_string())
        } else {
            let entry = TraceEntry::Message {
                level: record.level(),
                target: record.target().to_string(),
                text: record.args().to_string(),
            };
            if self.echo {
                eprintln!("{}", entry);
            }
            entry
        };
        self.add_entry(entry);
    }

    fn flush(&self) {
        if let Ok(mut output) = self.output_file.lock() {
            if let Some(file) = output.as_mut() {
                let _ = file.flush();
            }
        }
    }
}
