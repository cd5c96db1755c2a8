//! Console transport

use crate::core::{LoggerError, MethodKey, Transport};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Transport printing formatted text to stdout
pub fn console() -> Transport {
    console_to(io::stdout())
}

/// Transport printing formatted text to `writer`
///
/// # Example
///
/// ```
/// use pipelog::prelude::*;
/// use pipelog::transports::{console_to, SharedBuffer};
///
/// let out = SharedBuffer::new();
/// let logger = Logger::builder()
///     .format("%msg")
///     .transport("console", console_to(out.clone()))
///     .build()
///     .unwrap();
///
/// logger.info("ready");
/// assert_eq!(out.contents(), "ready\n");
/// ```
pub fn console_to<W: Write + Send + 'static>(writer: W) -> Transport {
    let transport = Transport::builder().id("console").build();
    bind_console(&transport, writer);
    transport
}

/// Bind the console write method, replacing any existing one
///
/// Muted messages are skipped. Styling is kept as rendered by the logger's
/// markup.
pub fn bind_console<W: Write + Send + 'static>(transport: &Transport, writer: W) {
    let writer = Mutex::new(writer);
    transport.set_method(
        MethodKey::Write,
        move |msg, _context| {
            if msg.muted {
                return Ok(());
            }
            let mut writer = writer.lock();
            writer
                .write_all(msg.formatted_text().as_bytes())
                .and_then(|_| writer.flush())
                .map_err(|e| LoggerError::io_operation("writing to console", "write failed", e))
        },
        true,
    );
}

/// Cloneable in-memory writer for capturing console output
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LevelMask, Message};
    use serde_json::json;

    fn message(text: &str, muted: bool) -> Message {
        let mut msg = Message::new(vec![json!(text)], text.to_string(), LevelMask::from(1), "t");
        msg.content.formatted = Some(format!("[INFO] {}\n", text));
        msg.muted = muted;
        msg
    }

    #[test]
    fn test_writes_formatted_text() {
        let out = SharedBuffer::new();
        let transport = console_to(out.clone());

        assert!(transport.post(&message("hello", false)));
        assert_eq!(out.contents(), "[INFO] hello\n");
    }

    #[test]
    fn test_skips_muted() {
        let out = SharedBuffer::new();
        let transport = console_to(out.clone());

        assert!(transport.post(&message("quiet", true)));
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_bind_replaces_existing_method() {
        let out = SharedBuffer::new();
        let transport = Transport::new();
        transport.set_method(MethodKey::Write, |_, _| Ok(()), false);

        bind_console(&transport, out.clone());
        transport.post(&message("x", false));
        assert_eq!(out.contents(), "[INFO] x\n");

        out.clear();
        assert!(out.contents().is_empty());
    }
}
