//! Identity and pipe bookkeeping shared by loggers, pipes and transports
//!
//! Every logger, pipe and transport is created inside a [`Registry`]. The
//! registry hands out ids and remembers which `(sender, receiver)` pairs are
//! already linked so that requesting the same pipe twice returns the existing
//! edge. A lazily created process-wide registry backs the default
//! constructors; tests build their own to stay isolated.

use super::logger::Logger;
use super::pipe::Pipe;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

type PipeKey = (String, String);

#[derive(Debug, Default)]
struct Tables {
    loggers: HashSet<String>,
    transports: HashSet<String>,
    pipes: HashMap<PipeKey, Weak<Pipe>>,
}

#[derive(Debug)]
pub struct Registry {
    tables: Mutex<Tables>,
    next_logger: AtomicU64,
    next_pipe: AtomicU64,
    next_transport: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            next_logger: AtomicU64::new(0),
            next_pipe: AtomicU64::new(0),
            next_transport: AtomicU64::new(0),
        }
    }

    /// The process-wide default registry
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Reserve a logger id
    ///
    /// A requested id already held by a live logger is replaced by a
    /// generated `logger-N` and a warning is printed.
    pub fn claim_logger_id(&self, requested: Option<&str>) -> String {
        let mut tables = self.tables.lock();
        let id = Self::claim(&mut tables.loggers, requested, "logger", &self.next_logger);
        if let Some(requested) = requested {
            if requested != id {
                eprintln!(
                    "[LOGGER WARNING] Logger id '{}' is already in use, using '{}' instead",
                    requested, id
                );
            }
        }
        id
    }

    /// Release a logger id and drop every pipe entry that touches it
    pub fn forget_logger(&self, id: &str) {
        let mut tables = self.tables.lock();
        tables.loggers.remove(id);
        tables
            .pipes
            .retain(|(sender, receiver), _| sender != id && receiver != id);
    }

    pub fn is_logger_id_taken(&self, id: &str) -> bool {
        self.tables.lock().loggers.contains(id)
    }

    pub fn logger_count(&self) -> usize {
        self.tables.lock().loggers.len()
    }

    pub fn claim_transport_id(&self, requested: Option<&str>) -> String {
        let mut tables = self.tables.lock();
        Self::claim(
            &mut tables.transports,
            requested,
            "transport",
            &self.next_transport,
        )
    }

    pub fn release_transport_id(&self, id: &str) {
        self.tables.lock().transports.remove(id);
    }

    pub fn next_pipe_id(&self) -> String {
        format!("pipe-{}", self.next_pipe.fetch_add(1, Ordering::Relaxed))
    }

    /// Look up the live pipe from `sender` to `receiver`, creating it if needed
    ///
    /// The flag is `true` when the pipe was created by this call.
    pub fn get_or_create(
        self: &Arc<Self>,
        sender: &Arc<Logger>,
        receiver: &Arc<Logger>,
    ) -> (Arc<Pipe>, bool) {
        let key = (sender.id().to_string(), receiver.id().to_string());
        let mut tables = self.tables.lock();

        if let Some(existing) = tables.pipes.get(&key).and_then(Weak::upgrade) {
            if !existing.is_destroyed() {
                return (existing, false);
            }
        }

        let pipe = Arc::new(Pipe::new(
            self.next_pipe_id(),
            sender,
            receiver,
            Arc::clone(self),
        ));
        tables.pipes.insert(key, Arc::downgrade(&pipe));
        (pipe, true)
    }

    /// The live pipe between two logger ids, if any
    pub fn find_pipe(&self, sender_id: &str, receiver_id: &str) -> Option<Arc<Pipe>> {
        let key = (sender_id.to_string(), receiver_id.to_string());
        self.tables
            .lock()
            .pipes
            .get(&key)
            .and_then(Weak::upgrade)
            .filter(|pipe| !pipe.is_destroyed())
    }

    /// Drop the entry for this pair if it still refers to `pipe`
    pub(crate) fn remove_pipe(&self, sender_id: &str, receiver_id: &str, pipe: &Pipe) {
        let key = (sender_id.to_string(), receiver_id.to_string());
        let mut tables = self.tables.lock();
        if tables
            .pipes
            .get(&key)
            .is_some_and(|entry| std::ptr::eq(entry.as_ptr(), pipe))
        {
            tables.pipes.remove(&key);
        }
    }

    pub fn pipe_count(&self) -> usize {
        self.tables
            .lock()
            .pipes
            .values()
            .filter(|pipe| pipe.strong_count() > 0)
            .count()
    }

    fn claim(
        taken: &mut HashSet<String>,
        requested: Option<&str>,
        prefix: &str,
        counter: &AtomicU64,
    ) -> String {
        if let Some(id) = requested {
            if taken.insert(id.to_string()) {
                return id.to_string();
            }
        }
        loop {
            let candidate = format!("{}-{}", prefix, counter.fetch_add(1, Ordering::Relaxed));
            if taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
