//! Main logger implementation

use super::{
    error::{LoggerError, Result},
    formatter::{default_reducer, ConvertOptions, Reducer, TemplateFormatter},
    level::{LevelMask, LevelSet, ALL},
    markup::{BraceMarkup, Markup},
    message::{IntoSegments, Message},
    metrics::LoggerMetrics,
    pipe::Pipe,
    predefined::{PredefinedValue, PredefinedValues},
    registry::Registry,
    timestamp::TimestampFormat,
    transport::Transport,
};
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Template used when none is configured
pub const DEFAULT_FORMAT: &str = "%symbol %msg {gray [%date]}";

/// Level used by [`Logger::log`] and [`Logger::log_with_options`] by default
pub const DEFAULT_LEVEL: &str = "INFO";

/// Per-call options for [`Logger::log_with_options`]
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Message level; INFO when unset
    pub level: Option<LevelMask>,
    /// Append a trailing newline to the formatted text
    pub endl: bool,
    /// Template override for this message
    pub format: Option<String>,
    /// Placeholder overrides for this message
    pub predefined_values: PredefinedValues,
    pub convert: ConvertOptions,
}

impl EmitOptions {
    pub fn new() -> Self {
        Self {
            level: None,
            endl: true,
            format: None,
            predefined_values: PredefinedValues::new(),
            convert: ConvertOptions::default(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LevelMask) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn endl(mut self, endl: bool) -> Self {
        self.endl = endl;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn predefined_value(mut self, key: &str, value: impl Into<PredefinedValue>) -> Self {
        self.predefined_values.set(key, value);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn join_char(mut self, join: impl Into<String>) -> Self {
        self.convert.join_char = Some(join.into());
        self
    }
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Leveled, formatted, multi-destination logger
///
/// Loggers are always handled through `Arc<Logger>`. Every method takes
/// `&self`, and no internal lock is held while a pipe or a transport runs,
/// so transport callbacks may log again.
pub struct Logger {
    id: String,
    registry: Arc<Registry>,
    levels: Arc<LevelSet>,
    reducer: Reducer,
    markup: Arc<dyn Markup>,
    format: RwLock<String>,
    /// `None` accepts every registered level, including ones added later
    filter: RwLock<Option<LevelMask>>,
    muted: AtomicBool,
    predefined: RwLock<PredefinedValues>,
    transports: RwLock<Vec<(String, Arc<Transport>)>>,
    pipes: RwLock<Vec<Arc<Pipe>>>,
    metrics: LoggerMetrics,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn levels(&self) -> &Arc<LevelSet> {
        &self.levels
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn format(&self) -> String {
        self.format.read().clone()
    }

    /// Replace the template; an empty string restores [`DEFAULT_FORMAT`]
    pub fn set_format(&self, format: impl Into<String>) -> &Self {
        let format = format.into();
        *self.format.write() = if format.is_empty() {
            DEFAULT_FORMAT.to_string()
        } else {
            format
        };
        self
    }

    pub fn reset_format(&self) -> &Self {
        self.set_format(String::new())
    }

    /// Current filter, resolved against the level set
    pub fn level(&self) -> LevelMask {
        match *self.filter.read() {
            Some(mask) => mask,
            None => self.levels.all(),
        }
    }

    /// Accept only messages whose level intersects `mask`
    pub fn set_level(&self, mask: LevelMask) -> &Self {
        *self.filter.write() = Some(mask);
        self
    }

    /// Accept every level, including levels registered after this call
    pub fn set_level_all(&self) -> &Self {
        *self.filter.write() = None;
        self
    }

    pub fn accepts(&self, level: LevelMask) -> bool {
        level.intersects(self.level())
    }

    pub fn mute_messages(&self) -> &Self {
        self.muted.store(true, Ordering::Release);
        self
    }

    pub fn unmute_messages(&self) -> &Self {
        self.muted.store(false, Ordering::Release);
        self
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    pub fn set_predefined_value(&self, key: &str, value: impl Into<PredefinedValue>) -> &Self {
        self.predefined.write().set(key, value);
        self
    }

    pub fn predefined_value(&self, key: &str) -> Option<PredefinedValue> {
        self.predefined.read().get(key).cloned()
    }

    pub fn remove_predefined_value(&self, key: &str) -> Option<PredefinedValue> {
        self.predefined.write().remove(key)
    }

    pub fn predefined_values(&self) -> PredefinedValues {
        self.predefined.read().clone()
    }

    /// Register a transport under `key`
    ///
    /// Fails with [`LoggerError::DuplicateTransport`] if the key is taken;
    /// the existing transport is kept.
    pub fn add_transport(&self, key: &str, transport: impl Into<Arc<Transport>>) -> Result<()> {
        let mut transports = self.transports.write();
        if transports.iter().any(|(k, _)| k == key) {
            return Err(LoggerError::duplicate_transport(key));
        }
        transports.push((key.to_string(), transport.into()));
        Ok(())
    }

    pub fn remove_transport(&self, key: &str) -> Option<Arc<Transport>> {
        let mut transports = self.transports.write();
        let index = transports.iter().position(|(k, _)| k == key)?;
        Some(transports.remove(index).1)
    }

    pub fn transport(&self, key: &str) -> Option<Arc<Transport>> {
        self.transports
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, t)| Arc::clone(t))
    }

    /// Registered transports in registration order
    pub fn transports(&self) -> Vec<(String, Arc<Transport>)> {
        self.transports.read().clone()
    }

    /// Forward every message of this logger to `receiver`
    ///
    /// Returns the existing pipe if one already links the two loggers.
    pub fn pipe(self: &Arc<Self>, receiver: &Arc<Logger>) -> Arc<Pipe> {
        let (pipe, created) = self.registry.get_or_create(self, receiver);
        if created {
            self.attach_pipe(Arc::clone(&pipe));
        }
        pipe
    }

    /// Outgoing pipes in attachment order
    pub fn pipes(&self) -> Vec<Arc<Pipe>> {
        self.pipes.read().clone()
    }

    pub fn pipe_by_id(&self, id: &str) -> Option<Arc<Pipe>> {
        self.pipes
            .read()
            .iter()
            .find(|pipe| pipe.id() == id)
            .map(Arc::clone)
    }

    /// Destroy one of this logger's outgoing pipes
    pub fn remove_pipe(&self, id: &str) -> Result<()> {
        let pipe = self
            .pipe_by_id(id)
            .ok_or_else(|| LoggerError::pipe_destroyed(id))?;
        pipe.destroy()
    }

    pub(crate) fn attach_pipe(&self, pipe: Arc<Pipe>) {
        let mut pipes = self.pipes.write();
        pipes.retain(|existing| existing.receiver().is_some());
        pipes.push(pipe);
    }

    pub(crate) fn detach_pipe(&self, id: &str) {
        self.pipes.write().retain(|pipe| pipe.id() != id);
    }

    /// Build, format and route one message
    pub fn log_with_options(&self, segments: impl IntoSegments, options: EmitOptions) -> &Self {
        let passed = segments.into_segments();
        let level = options
            .level
            .unwrap_or_else(|| self.levels.get_one(DEFAULT_LEVEL));
        let joined = (self.reducer)(&passed, &options.convert);

        let mut msg = Message::new(passed, joined, level, &self.id);
        msg.endl = options.endl;
        msg.format = options.format;
        msg.predefined_values = options.predefined_values;

        self.format_message(&mut msg, &options.convert);
        self.post_message(msg)
    }

    /// Emit at a level looked up by name
    ///
    /// An unknown name yields an empty mask, which every filter rejects.
    pub fn log_at(&self, level: &str, segments: impl IntoSegments) -> &Self {
        let options = EmitOptions::new().level(self.levels.get_one(level));
        self.log_with_options(segments, options)
    }

    /// Alias of [`Logger::info`]
    pub fn log(&self, segments: impl IntoSegments) -> &Self {
        self.info(segments)
    }

    pub fn info(&self, segments: impl IntoSegments) -> &Self {
        self.log_at("INFO", segments)
    }

    pub fn success(&self, segments: impl IntoSegments) -> &Self {
        self.log_at("SUCCESS", segments)
    }

    pub fn warn(&self, segments: impl IntoSegments) -> &Self {
        self.log_at("WARNING", segments)
    }

    pub fn error(&self, segments: impl IntoSegments) -> &Self {
        self.log_at("ERROR", segments)
    }

    /// Route an already built message
    ///
    /// The message is muted if its level is filtered out or the logger is
    /// muted; an incoming mute is never lifted here. Pipes get their own
    /// copy first, then every transport sees the message.
    pub fn post_message(&self, mut msg: Message) -> &Self {
        self.metrics.record_posted();

        if self.is_muted() || !self.accepts(msg.level) {
            msg.muted = true;
        }
        if msg.muted {
            self.metrics.record_muted();
        }
        msg.route.push(self.id.clone());

        let pipes = self.pipes();
        for pipe in pipes {
            let revisits = pipe
                .receiver()
                .map_or(false, |receiver| msg.route.iter().any(|id| id == receiver.id()));
            if revisits {
                continue;
            }
            if pipe.write(msg.clone()) {
                self.metrics.record_piped();
            }
        }

        let transports = self.transports();
        for (_, transport) in transports {
            if transport.post(&msg) {
                self.metrics.record_delivered();
            } else {
                self.metrics.record_undelivered();
            }
        }
        self
    }

    /// Builder pre-filled from this logger
    ///
    /// The built copy shares transports, reducer, markup and level set,
    /// starts with the same format, filter and a copy of the predefined
    /// values, and gets a muted pipe into this logger.
    pub fn copy_builder(self: &Arc<Self>) -> LoggerBuilder {
        LoggerBuilder {
            id: None,
            format: Some(self.format()),
            level: *self.filter.read(),
            transports: self.transports(),
            predefined: PredefinedValues::new(),
            base_predefined: Some(self.predefined_values()),
            reducer: Some(Arc::clone(&self.reducer)),
            markup: Some(Arc::clone(&self.markup)),
            levels: Some(Arc::clone(&self.levels)),
            custom_levels: Vec::new(),
            registry: Some(Arc::clone(&self.registry)),
            date_format: TimestampFormat::default(),
            copy_of: Some(Arc::clone(self)),
        }
    }

    pub fn create_copy(self: &Arc<Self>) -> Result<Arc<Logger>> {
        self.copy_builder().build()
    }

    fn format_message(&self, msg: &mut Message, convert: &ConvertOptions) {
        let template = match msg.format.as_deref() {
            Some(format) if !format.is_empty() => format.to_string(),
            _ => self.format(),
        };
        let persistent = self.predefined_values();

        let substituted =
            TemplateFormatter::new(&self.reducer, convert).render(&template, msg, &persistent);
        let mut formatted = self.markup.render(&substituted);
        if msg.endl {
            formatted.push('\n');
        }

        msg.content.plain = Some(self.markup.strip(&formatted));
        msg.content.formatted = Some(formatted);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transports: Vec<String> = self.transports.read().iter().map(|(k, _)| k.clone()).collect();
        let pipes: Vec<String> = self.pipes.read().iter().map(|p| p.id().to_string()).collect();
        f.debug_struct("Logger")
            .field("id", &self.id)
            .field("format", &*self.format.read())
            .field("level", &self.level())
            .field("muted", &self.is_muted())
            .field("transports", &transports)
            .field("pipes", &pipes)
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.registry.forget_logger(&self.id);
    }
}

/// Order in which `%symbol` picks among the built-in levels; custom levels
/// follow in registration order
const SYMBOL_PRIORITY: [&str; 4] = ["INFO", "WARNING", "SUCCESS", "ERROR"];

/// Placeholders every logger starts with: `%date` and `%symbol`
pub fn default_predefined_values(
    levels: Arc<LevelSet>,
    date_format: TimestampFormat,
) -> PredefinedValues {
    PredefinedValues::new()
        .with(
            "date",
            PredefinedValue::computed(move |_| Value::String(date_format.now())),
        )
        .with(
            "symbol",
            PredefinedValue::computed(move |msg| {
                let symbol = SYMBOL_PRIORITY
                    .iter()
                    .find(|name| levels.get_one(name).intersects(msg.level))
                    .map(|name| name.to_string())
                    .or_else(|| levels.name_of(msg.level))
                    .map(|name| format!("[{}]", name))
                    .unwrap_or_default();
                Value::String(symbol)
            }),
        )
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use pipelog::prelude::*;
/// use pipelog::transports::MemorySink;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder()
///     .id("api")
///     .format("%symbol %app %msg")
///     .predefined_value("app", "billing")
///     .custom_levels(["debug"])
///     .transport("memory", sink.transport())
///     .build()
///     .unwrap();
///
/// logger.log_at("debug", "cache warm");
/// assert_eq!(sink.written()[0].plain_text(), "[DEBUG] billing cache warm\n");
/// ```
pub struct LoggerBuilder {
    id: Option<String>,
    format: Option<String>,
    level: Option<LevelMask>,
    transports: Vec<(String, Arc<Transport>)>,
    predefined: PredefinedValues,
    base_predefined: Option<PredefinedValues>,
    reducer: Option<Reducer>,
    markup: Option<Arc<dyn Markup>>,
    levels: Option<Arc<LevelSet>>,
    custom_levels: Vec<String>,
    registry: Option<Arc<Registry>>,
    date_format: TimestampFormat,
    copy_of: Option<Arc<Logger>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            id: None,
            format: None,
            level: None,
            transports: Vec::new(),
            predefined: PredefinedValues::new(),
            base_predefined: None,
            reducer: None,
            markup: None,
            levels: None,
            custom_levels: Vec::new(),
            registry: None,
            date_format: TimestampFormat::default(),
            copy_of: None,
        }
    }

    /// Requested id; a generated one is used if it is taken
    #[must_use = "builder methods return a new value"]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Template; an empty string keeps the default
    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, mask: LevelMask) -> Self {
        self.level = Some(mask);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level_all(mut self) -> Self {
        self.level = None;
        self
    }

    /// Add a transport under `key`
    #[must_use = "builder methods return a new value"]
    pub fn transport(mut self, key: impl Into<String>, transport: impl Into<Arc<Transport>>) -> Self {
        self.transports.push((key.into(), transport.into()));
        self
    }

    /// Replace every transport configured so far
    #[must_use = "builder methods return a new value"]
    pub fn transports<I, K, T>(mut self, transports: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Arc<Transport>>,
    {
        self.transports = transports
            .into_iter()
            .map(|(key, transport)| (key.into(), transport.into()))
            .collect();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn predefined_value(mut self, key: &str, value: impl Into<PredefinedValue>) -> Self {
        self.predefined.set(key, value);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = Some(reducer);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn markup<M: Markup + 'static>(mut self, markup: M) -> Self {
        self.markup = Some(Arc::new(markup));
        self
    }

    /// Share an existing level set
    #[must_use = "builder methods return a new value"]
    pub fn levels(mut self, levels: Arc<LevelSet>) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Register extra levels after the defaults
    #[must_use = "builder methods return a new value"]
    pub fn custom_levels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_levels.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Rendering of the default `%date` value
    #[must_use = "builder methods return a new value"]
    pub fn date_format(mut self, format: TimestampFormat) -> Self {
        self.date_format = format;
        self
    }

    /// Build the logger
    ///
    /// Fails on a transport key used twice, an invalid custom date pattern or a
    /// custom level that cannot be registered; the registry is left untouched
    /// in every case.
    pub fn build(self) -> Result<Arc<Logger>> {
        for (i, (key, _)) in self.transports.iter().enumerate() {
            if self.transports[..i].iter().any(|(k, _)| k == key) {
                return Err(LoggerError::duplicate_transport(key.as_str()));
            }
        }
        self.date_format.validate()?;

        let levels = self.levels.unwrap_or_else(|| Arc::new(LevelSet::new()));
        for name in &self.custom_levels {
            if levels.add(name).is_none() && !name.eq_ignore_ascii_case(ALL) {
                return Err(LoggerError::config(
                    "LevelSet",
                    format!("no free level bit for '{}'", name),
                ));
            }
        }

        let mut predefined = self
            .base_predefined
            .unwrap_or_else(|| default_predefined_values(Arc::clone(&levels), self.date_format));
        predefined.merge(&self.predefined);

        let format = self
            .format
            .filter(|format| !format.is_empty())
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

        let registry = self.registry.unwrap_or_else(Registry::global);
        let id = registry.claim_logger_id(self.id.as_deref());

        let logger = Arc::new(Logger {
            id,
            registry,
            levels,
            reducer: self.reducer.unwrap_or_else(default_reducer),
            markup: self
                .markup
                .unwrap_or_else(|| Arc::new(BraceMarkup::new()) as Arc<dyn Markup>),
            format: RwLock::new(format),
            filter: RwLock::new(self.level),
            muted: AtomicBool::new(false),
            predefined: RwLock::new(predefined),
            transports: RwLock::new(self.transports),
            pipes: RwLock::new(Vec::new()),
            metrics: LoggerMetrics::new(),
        });

        if let Some(origin) = self.copy_of {
            logger.pipe(&origin).mute();
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
