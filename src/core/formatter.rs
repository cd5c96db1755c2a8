//! Template rendering and segment joining
//!
//! A template is plain text with `%name` tokens. Tokens are replaced from a
//! table built, later entries winning, from:
//!
//! 1. `%msg`, the joined message line
//! 2. the logger's persistent predefined values
//! 3. the message's own predefined values
//!
//! Tokens without an entry are left untouched, so a template can reference
//! values that are only supplied later.

use super::message::Message;
use super::predefined::PredefinedValues;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Token pattern: `%` followed by letters, digits, `_` or `-`
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[a-zA-Z0-9_-]+").expect("token pattern is valid"));

/// Separator placed between joined segments unless overridden
pub const DEFAULT_JOIN: &str = " ";

/// Options for turning segments into one line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub join_char: Option<String>,
}

impl ConvertOptions {
    pub fn joined_by(join: impl Into<String>) -> Self {
        Self {
            join_char: Some(join.into()),
        }
    }
}

/// Joins heterogeneous segments into a single string
pub type Reducer = Arc<dyn Fn(&[Value], &ConvertOptions) -> String + Send + Sync>;

/// Default reducer: strings verbatim, everything else as compact JSON
pub fn join_segments(segments: &[Value], options: &ConvertOptions) -> String {
    let join = options.join_char.as_deref().unwrap_or(DEFAULT_JOIN);
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .fold(String::new(), |mut acc, (i, segment)| {
            match segment {
                Value::String(s) => acc.push_str(s),
                other => acc.push_str(&other.to_string()),
            }
            if i != last {
                acc.push_str(join);
            }
            acc
        })
}

pub fn default_reducer() -> Reducer {
    Arc::new(join_segments)
}

/// Convert a produced value with the reducer, spreading arrays into segments
pub fn convert_value(value: Value, reducer: &Reducer, options: &ConvertOptions) -> String {
    match value {
        Value::Array(items) => reducer(&items, options),
        other => reducer(std::slice::from_ref(&other), options),
    }
}

/// Substitutes `%name` tokens in a template
pub struct TemplateFormatter<'a> {
    reducer: &'a Reducer,
    options: &'a ConvertOptions,
}

impl<'a> TemplateFormatter<'a> {
    pub fn new(reducer: &'a Reducer, options: &'a ConvertOptions) -> Self {
        Self { reducer, options }
    }

    /// Render `template` for `message`
    ///
    /// Each token is resolved at most once per call; producers for names the
    /// template never mentions are not invoked.
    pub fn render(
        &self,
        template: &str,
        message: &Message,
        persistent: &PredefinedValues,
    ) -> String {
        let mut resolved: HashMap<String, Option<String>> = HashMap::new();

        TOKEN
            .replace_all(template, |caps: &Captures<'_>| {
                let token = &caps[0];
                let name = &token[1..];
                let value = resolved
                    .entry(name.to_string())
                    .or_insert_with(|| self.resolve(name, message, persistent));
                match value {
                    Some(text) => text.clone(),
                    None => token.to_string(),
                }
            })
            .into_owned()
    }

    fn resolve(
        &self,
        name: &str,
        message: &Message,
        persistent: &PredefinedValues,
    ) -> Option<String> {
        let entry = message
            .predefined_values
            .get(name)
            .or_else(|| persistent.get(name));

        match entry {
            Some(value) => Some(convert_value(
                value.evaluate(message),
                self.reducer,
                self.options,
            )),
            None if name == "msg" => Some(message.content.joined_segments.clone()),
            None => None,
        }
    }
}
