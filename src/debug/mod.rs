// Debug module - Diagnostics for the emulator
//
// Holds the crate's `log` backend. CPU trace lines and library messages are
// routed through it and kept in a bounded buffer for inspection.

pub mod logger;

pub use logger::{LogLevel, Logger, TraceEntry, CPU_TRACE_TARGET};
