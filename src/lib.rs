//! # pipelog
//!
//! Leveled, template-formatted logging with any number of destinations.
//!
//! ## Features
//!
//! - **Bitmask Levels**: INFO, SUCCESS, WARNING, ERROR plus custom levels, combined freely
//! - **Templates**: `%name` placeholders with literal or computed values and `{style text}` markup
//! - **Transports**: console, file and in-memory sinks, or any callback
//! - **Pipes**: forward messages between loggers with independent muting
//! - **Thread Safe**: loggers are shared as `Arc<Logger>`
//!
//! ## Example
//!
//! ```
//! use pipelog::prelude::*;
//! use pipelog::transports::MemorySink;
//!
//! let audit = MemorySink::new();
//! let app = Logger::builder().format("%symbol %msg").build().unwrap();
//! let auditor = Logger::builder()
//!     .transport("audit", audit.transport())
//!     .build()
//!     .unwrap();
//!
//! // piped messages arrive already formatted by the sender
//! app.pipe(&auditor);
//! app.warn("disk at 91%");
//!
//! assert_eq!(audit.plain_output(), "[WARNING] disk at 91%\n");
//! ```

pub mod core;
pub mod macros;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        BraceMarkup, ConvertOptions, EmitOptions, LevelMask, LevelSet, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, Markup, Message, MethodKey, Pipe, PlainMarkup,
        PredefinedValue, PredefinedValues, Registry, Result, TimestampFormat, Transport,
    };
    pub use crate::transports::{console, MemorySink};
}

pub use crate::core::{
    to_segment, BraceMarkup, ConvertOptions, EmitOptions, IntoSegments, LevelMask, LevelSet,
    Logger, LoggerBuilder, LoggerError, LoggerMetrics, Markup, Message, MessageContent, MethodKey,
    Pipe, PlainMarkup, PredefinedValue, PredefinedValues, Reducer, Registry, Result,
    TimestampFormat, Transport, TransportBuilder, DEFAULT_FORMAT,
};
