//! Logging abstractions so the manager can report without picking a backend
//!
//! Hosts hand the manager a `SharedLogger`; warnings about sources that fail to
//! activate or close go through it.

mod traits;
mod noop;
mod console;
mod memory;

pub use traits::{Logger, LoggerExt, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{MemoryLogger, LogRecord};
