//! In-memory transport for tests and embedding

use crate::core::{Message, MethodKey, Transport};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects every message its transports receive
///
/// Muted messages are recorded too; [`MemorySink::written`] filters them out
/// and corresponds to what a console or file transport would print.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// New transport recording into this sink
    pub fn transport(&self) -> Transport {
        let transport = Transport::builder().id("memory").build();
        let messages = Arc::clone(&self.messages);
        transport.set_method(
            MethodKey::Write,
            move |msg, _context| {
                messages.lock().push(msg.clone());
                Ok(())
            },
            true,
        );
        transport
    }

    /// Every received message, muted or not
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    /// Received messages that were not muted
    pub fn written(&self) -> Vec<Message> {
        self.messages
            .lock()
            .iter()
            .filter(|msg| !msg.muted)
            .cloned()
            .collect()
    }

    /// Plain text of the unmuted messages, concatenated
    pub fn plain_output(&self) -> String {
        self.messages
            .lock()
            .iter()
            .filter(|msg| !msg.muted)
            .map(Message::plain_text)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}
