//! Named placeholder values available to the template formatter

use super::message::Message;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Producer invoked with the message being rendered
pub type ValueFn = Arc<dyn Fn(&Message) -> Value + Send + Sync>;

/// A placeholder value: fixed, or computed from the message at render time
#[derive(Clone)]
pub enum PredefinedValue {
    Literal(Value),
    Computed(ValueFn),
}

impl PredefinedValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        PredefinedValue::Literal(value.into())
    }

    /// Wrap a producer; closures that ignore the message cover the zero-argument case
    pub fn computed<F>(producer: F) -> Self
    where
        F: Fn(&Message) -> Value + Send + Sync + 'static,
    {
        PredefinedValue::Computed(Arc::new(producer))
    }

    pub fn evaluate(&self, message: &Message) -> Value {
        match self {
            PredefinedValue::Literal(value) => value.clone(),
            PredefinedValue::Computed(producer) => producer(message),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, PredefinedValue::Computed(_))
    }
}

impl fmt::Debug for PredefinedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredefinedValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            PredefinedValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for PredefinedValue {
    fn from(s: &str) -> Self {
        PredefinedValue::Literal(Value::String(s.to_string()))
    }
}

impl From<String> for PredefinedValue {
    fn from(s: String) -> Self {
        PredefinedValue::Literal(Value::String(s))
    }
}

impl From<Value> for PredefinedValue {
    fn from(value: Value) -> Self {
        PredefinedValue::Literal(value)
    }
}

/// Ordered name → value collection
///
/// Names are stored without the leading `%`; `"%symbol"` and `"symbol"`
/// address the same entry. Replacing an entry keeps its position.
#[derive(Debug, Clone, Default)]
pub struct PredefinedValues {
    entries: Vec<(String, PredefinedValue)>,
}

impl PredefinedValues {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<PredefinedValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<PredefinedValue>) {
        let key = normalize_key(key);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PredefinedValue> {
        let key = normalize_key(key);
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<PredefinedValue> {
        let key = normalize_key(key);
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Copy every entry of `other` over this collection
    pub fn merge(&mut self, other: &PredefinedValues) {
        for (key, value) in other.iter() {
            self.set(key, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PredefinedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(key: &str) -> &str {
    key.strip_prefix('%').unwrap_or(key)
}
