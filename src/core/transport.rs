//! Transport: an addressable output sink
//!
//! A transport owns a table of callbacks keyed by [`MethodKey`], an enabled
//! switch and an opaque context value handed to every callback. Loggers only
//! call [`Transport::post`]; whether a muted message is skipped is decided by
//! the bound callback.

use super::error::Result;
use super::message::Message;
use super::registry::Registry;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Callback bound to a transport method
pub type TransportFn = Arc<dyn Fn(&Message, &Value) -> Result<()> + Send + Sync>;

/// Operations a transport can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKey {
    Write,
}

impl MethodKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKey::Write => "write",
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Transport {
    id: String,
    registry: Arc<Registry>,
    methods: RwLock<HashMap<MethodKey, TransportFn>>,
    enabled: AtomicBool,
    context: RwLock<Arc<Value>>,
}

impl Transport {
    /// Create an enabled transport with no methods in the default registry
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TransportBuilder {
        TransportBuilder::new()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run the write callback
    ///
    /// Returns `false` when the transport is disabled or has no write method.
    /// A failing callback is reported on stderr; the call still counts as
    /// invoked.
    pub fn post(&self, msg: &Message) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let callback = match self.methods.read().get(&MethodKey::Write) {
            Some(callback) => Arc::clone(callback),
            None => return false,
        };
        let context = Arc::clone(&self.context.read());

        if let Err(e) = callback(msg, &context) {
            eprintln!("[LOGGER ERROR] Transport '{}' write failed: {}", self.id, e);
        }
        true
    }

    /// Bind `callback` under `key`
    ///
    /// An existing binding is only replaced when `force` is set; the return
    /// value tells whether the callback was stored.
    pub fn set_method<F>(&self, key: MethodKey, callback: F, force: bool) -> bool
    where
        F: Fn(&Message, &Value) -> Result<()> + Send + Sync + 'static,
    {
        let mut methods = self.methods.write();
        if methods.contains_key(&key) && !force {
            return false;
        }
        methods.insert(key, Arc::new(callback));
        true
    }

    pub fn remove_method(&self, key: MethodKey) -> bool {
        self.methods.write().remove(&key).is_some()
    }

    pub fn has_method(&self, key: MethodKey) -> bool {
        self.methods.read().contains_key(&key)
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn context(&self) -> Arc<Value> {
        Arc::clone(&self.context.read())
    }

    pub fn set_context(&self, context: Value) {
        *self.context.write() = Arc::new(context);
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<MethodKey> = self.methods.read().keys().copied().collect();
        f.debug_struct("Transport")
            .field("id", &self.id)
            .field("enabled", &self.is_enabled())
            .field("methods", &methods)
            .finish()
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.registry.release_transport_id(&self.id);
    }
}

/// Builder for [`Transport`]
///
/// # Example
///
/// ```
/// use pipelog::{MethodKey, Transport};
/// use serde_json::json;
///
/// let transport = Transport::builder()
///     .id("audit")
///     .context(json!({ "paths": ["./logs/audit.log"] }))
///     .build();
///
/// transport.set_method(MethodKey::Write, |_msg, _ctx| Ok(()), false);
/// assert!(transport.has_method(MethodKey::Write));
/// ```
pub struct TransportBuilder {
    id: Option<String>,
    context: Value,
    registry: Option<Arc<Registry>>,
    enabled: bool,
}

impl TransportBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            context: Value::Null,
            registry: None,
            enabled: true,
        }
    }

    /// Requested id; replaced by a generated one if already taken
    #[must_use = "builder methods return a new value"]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn build(self) -> Transport {
        let registry = self.registry.unwrap_or_else(Registry::global);
        let id = registry.claim_transport_id(self.id.as_deref());

        Transport {
            id,
            registry,
            methods: RwLock::new(HashMap::new()),
            enabled: AtomicBool::new(self.enabled),
            context: RwLock::new(Arc::new(self.context)),
        }
    }
}

impl Default for TransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
