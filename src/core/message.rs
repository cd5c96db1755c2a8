//! Message record passed through loggers, pipes and transports

use super::error::Result;
use super::level::LevelMask;
use super::predefined::PredefinedValues;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Text carried by a [`Message`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageContent {
    /// Arguments exactly as the caller passed them
    pub passed_segments: Vec<Value>,
    /// Segments joined by the logger's reducer
    pub joined_segments: String,
    /// Rendered template with markup applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    /// `formatted` with markup escapes removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain: Option<String>,
}

/// One emitted log record
///
/// Cloning produces a fully independent copy, which is what each pipe
/// receives so that mute changes on one branch never leak into another.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub content: MessageContent,
    pub level: LevelMask,
    pub source_logger: String,
    pub endl: bool,
    /// Template override for this message only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Placeholder overrides for this message only
    #[serde(skip)]
    pub predefined_values: PredefinedValues,
    pub muted: bool,
    pub timestamp: DateTime<Utc>,
    /// Loggers that already posted this record
    #[serde(skip)]
    pub(crate) route: Vec<String>,
}

impl Message {
    pub fn new(
        passed_segments: Vec<Value>,
        joined_segments: String,
        level: LevelMask,
        source_logger: impl Into<String>,
    ) -> Self {
        Self {
            content: MessageContent {
                passed_segments,
                joined_segments,
                formatted: None,
                plain: None,
            },
            level,
            source_logger: source_logger.into(),
            endl: true,
            format: None,
            predefined_values: PredefinedValues::new(),
            muted: false,
            timestamp: Utc::now(),
            route: Vec::new(),
        }
    }

    /// Formatted text, or the joined line when no template was applied
    pub fn formatted_text(&self) -> String {
        match self.content.formatted {
            Some(ref formatted) => formatted.clone(),
            None => self.fallback_line(),
        }
    }

    /// Plain text, or the joined line when no template was applied
    pub fn plain_text(&self) -> String {
        match self.content.plain {
            Some(ref plain) => plain.clone(),
            None => self.fallback_line(),
        }
    }

    /// Ids of the loggers this record has passed through, in order
    pub fn route(&self) -> &[String] {
        &self.route
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn fallback_line(&self) -> String {
        let mut line = self.content.joined_segments.clone();
        if self.endl {
            line.push('\n');
        }
        line
    }
}

/// Conversion of log call arguments into ordered segments
///
/// A JSON array is spread into its elements; any other single value becomes
/// a one-element sequence.
pub trait IntoSegments {
    fn into_segments(self) -> Vec<Value>;
}

impl IntoSegments for &str {
    fn into_segments(self) -> Vec<Value> {
        vec![Value::String(self.to_string())]
    }
}

impl IntoSegments for String {
    fn into_segments(self) -> Vec<Value> {
        vec![Value::String(self)]
    }
}

impl IntoSegments for &String {
    fn into_segments(self) -> Vec<Value> {
        vec![Value::String(self.clone())]
    }
}

impl IntoSegments for Value {
    fn into_segments(self) -> Vec<Value> {
        match self {
            Value::Array(items) => items,
            other => vec![other],
        }
    }
}

impl<T: Into<Value>> IntoSegments for Vec<T> {
    fn into_segments(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Serialize any value into a segment, falling back to `null`
///
/// Used by the logging macros so callers can mix strings, numbers and
/// serializable structs in one call.
pub fn to_segment<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
