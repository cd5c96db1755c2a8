//! Core logger types and traits

pub mod error;
pub mod formatter;
pub mod level;
pub mod logger;
pub mod markup;
pub mod message;
pub mod metrics;
pub mod pipe;
pub mod predefined;
pub mod registry;
pub mod timestamp;
pub mod transport;

pub use error::{LoggerError, Result};
pub use formatter::{
    convert_value, default_reducer, join_segments, ConvertOptions, Reducer, TemplateFormatter,
    DEFAULT_JOIN,
};
pub use level::{LevelMask, LevelSet, ALL, DEFAULT_LEVELS};
pub use logger::{
    default_predefined_values, EmitOptions, Logger, LoggerBuilder, DEFAULT_FORMAT, DEFAULT_LEVEL,
};
pub use markup::{strip_ansi, BraceMarkup, Markup, PlainMarkup};
pub use message::{to_segment, IntoSegments, Message, MessageContent};
pub use metrics::LoggerMetrics;
pub use pipe::Pipe;
pub use predefined::{PredefinedValue, PredefinedValues, ValueFn};
pub use registry::Registry;
pub use timestamp::TimestampFormat;
pub use transport::{MethodKey, Transport, TransportBuilder, TransportFn};
