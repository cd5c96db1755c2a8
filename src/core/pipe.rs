//! Directed forwarding edge between two loggers
//!
//! A pipe holds weak references to both ends: the sender keeps the pipe alive
//! through its outgoing list, and nothing on the edge keeps either logger
//! alive.

use super::error::{LoggerError, Result};
use super::logger::Logger;
use super::message::Message;
use super::registry::Registry;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct Endpoints {
    sender: Weak<Logger>,
    receiver: Weak<Logger>,
    sender_id: String,
    receiver_id: String,
}

/// Deduplicated edge from a sender logger to a receiver logger
///
/// Pipes are obtained through [`Logger::pipe`]; asking twice for the same pair
/// returns the same pipe.
///
/// # Example
///
/// ```
/// use pipelog::{Logger, Registry};
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::new());
/// let a = Logger::builder().registry(Arc::clone(&registry)).build().unwrap();
/// let b = Logger::builder().registry(registry).build().unwrap();
///
/// let pipe = a.pipe(&b);
/// pipe.mute().enable_unmuting_messages();
/// assert!(Arc::ptr_eq(&pipe, &a.pipe(&b)));
/// assert_eq!(a.pipes().len(), 1);
///
/// pipe.destroy().unwrap();
/// assert!(pipe.destroy().is_err());
/// ```
pub struct Pipe {
    id: String,
    registry: Arc<Registry>,
    endpoints: RwLock<Option<Endpoints>>,
    muted: AtomicBool,
    unmuting: AtomicBool,
}

impl Pipe {
    pub(crate) fn new(
        id: String,
        sender: &Arc<Logger>,
        receiver: &Arc<Logger>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            id,
            registry,
            endpoints: RwLock::new(Some(Endpoints {
                sender: Arc::downgrade(sender),
                receiver: Arc::downgrade(receiver),
                sender_id: sender.id().to_string(),
                receiver_id: receiver.id().to_string(),
            })),
            muted: AtomicBool::new(false),
            unmuting: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Forward a copy of a message to the receiver
    ///
    /// A muted pipe mutes the message; otherwise an unmuting pipe clears an
    /// incoming mute. Returns `true` if a live receiver got the message.
    pub fn write(&self, mut msg: Message) -> bool {
        if self.is_muted() {
            msg.muted = true;
        } else if msg.muted && self.does_unmute_messages() {
            msg.muted = false;
        }

        match self.receiver() {
            Some(receiver) => {
                receiver.post_message(msg);
                true
            }
            None => false,
        }
    }

    /// Detach from the sender and the registry
    ///
    /// Fails with [`LoggerError::PipeDestroyed`] on a second call.
    pub fn destroy(&self) -> Result<()> {
        let endpoints = self
            .endpoints
            .write()
            .take()
            .ok_or_else(|| LoggerError::pipe_destroyed(&self.id))?;

        if let Some(sender) = endpoints.sender.upgrade() {
            sender.detach_pipe(&self.id);
        }
        self.registry
            .remove_pipe(&endpoints.sender_id, &endpoints.receiver_id, self);
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.endpoints.read().is_none()
    }

    pub fn sender(&self) -> Option<Arc<Logger>> {
        self.endpoints.read().as_ref()?.sender.upgrade()
    }

    pub fn receiver(&self) -> Option<Arc<Logger>> {
        self.endpoints.read().as_ref()?.receiver.upgrade()
    }

    pub fn mute(&self) -> &Self {
        self.muted.store(true, Ordering::Release);
        self
    }

    pub fn unmute(&self) -> &Self {
        self.muted.store(false, Ordering::Release);
        self
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    /// Let messages muted upstream through, unless the pipe itself is muted
    pub fn enable_unmuting_messages(&self) -> &Self {
        self.unmuting.store(true, Ordering::Release);
        self
    }

    pub fn disable_unmuting_messages(&self) -> &Self {
        self.unmuting.store(false, Ordering::Release);
        self
    }

    pub fn does_unmute_messages(&self) -> bool {
        self.unmuting.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoints = self.endpoints.read();
        let (sender, receiver) = match endpoints.as_ref() {
            Some(e) => (Some(e.sender_id.as_str()), Some(e.receiver_id.as_str())),
            None => (None, None),
        };
        f.debug_struct("Pipe")
            .field("id", &self.id)
            .field("sender", &sender)
            .field("receiver", &receiver)
            .field("muted", &self.is_muted())
            .field("unmuting", &self.does_unmute_messages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::LevelMask;
    use crate::transports::MemorySink;

    fn pair() -> (Arc<Logger>, Arc<Logger>, MemorySink) {
        let registry = Arc::new(Registry::new());
        let sink = MemorySink::new();
        let sender = Logger::builder()
            .registry(Arc::clone(&registry))
            .format("%msg")
            .build()
            .unwrap();
        let receiver = Logger::builder()
            .registry(registry)
            .format("%msg")
            .transport("memory", sink.transport())
            .build()
            .unwrap();
        (sender, receiver, sink)
    }

    #[test]
    fn test_write_reaches_receiver() {
        let (sender, receiver, sink) = pair();
        let pipe = sender.pipe(&receiver);

        sender.info("hi");
        assert_eq!(sink.written().len(), 1);
        assert_eq!(sink.written()[0].plain_text(), "hi\n");
        assert!(Arc::ptr_eq(&pipe.receiver().unwrap(), &receiver));
    }

    #[test]
    fn test_muted_pipe_wins_over_unmuting() {
        let (sender, receiver, sink) = pair();
        sender.pipe(&receiver).mute().enable_unmuting_messages();

        sender.info("quiet");
        assert_eq!(sink.len(), 1);
        assert!(sink.written().is_empty());
    }

    #[test]
    fn test_unmuting_clears_upstream_mute() {
        let (sender, receiver, sink) = pair();
        sender.mute_messages();
        sender.pipe(&receiver).enable_unmuting_messages();

        sender.error("loud");
        assert_eq!(sink.written().len(), 1);
    }

    #[test]
    fn test_upstream_mute_propagates_by_default() {
        let (sender, receiver, sink) = pair();
        sender.mute_messages();
        sender.pipe(&receiver);

        sender.info("muted");
        assert_eq!(sink.len(), 1);
        assert!(sink.written().is_empty());
    }

    #[test]
    fn test_destroy_detaches() {
        let (sender, receiver, sink) = pair();
        let pipe = sender.pipe(&receiver);
        let id = pipe.id().to_string();

        pipe.destroy().unwrap();
        assert!(pipe.is_destroyed());
        assert!(sender.pipes().is_empty());
        assert!(sender.pipe_by_id(&id).is_none());
        assert!(matches!(
            pipe.destroy(),
            Err(LoggerError::PipeDestroyed { .. })
        ));

        sender.info("after");
        assert!(sink.is_empty());
        assert!(!pipe.write(Message::new(Vec::new(), String::new(), LevelMask::from(1), "x")));
    }

    #[test]
    fn test_pipe_does_not_keep_receiver_alive() {
        let (sender, receiver, _sink) = pair();
        let pipe = sender.pipe(&receiver);
        drop(receiver);

        assert!(pipe.receiver().is_none());
        sender.info("nobody listening");
        assert_eq!(sender.metrics().piped(), 0);
    }
}
