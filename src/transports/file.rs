//! File transport

use crate::core::{LoggerError, MethodKey, Result, TimestampFormat, Transport};
use fs2::FileExt;
use parking_lot::Mutex;
use serde_json::json;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// First characters of the line written at the top of every log file
pub const FILE_HEADER_PREFIX: &str = "# File autogenerated by pipelog";

/// Transport appending plain text to the file at `path`
///
/// The file is truncated and a header line is written when the transport is
/// created. The path is stored in the transport context under `"path"`.
///
/// # Example
///
/// ```no_run
/// use pipelog::prelude::*;
/// use pipelog::transports::file;
///
/// let logger = Logger::builder()
///     .transport("file", file("./logs/app.log").unwrap())
///     .build()
///     .unwrap();
/// logger.info("written without color codes");
/// ```
pub fn file(path: impl AsRef<Path>) -> Result<Transport> {
    let path = path.as_ref();
    let transport = Transport::builder()
        .id(format!("file:{}", path.display()))
        .context(json!({ "path": path.display().to_string() }))
        .build();
    bind_file(&transport, path)?;
    Ok(transport)
}

/// Bind the file write method to `transport`, replacing any existing one
pub fn bind_file(transport: &Transport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let mut handle = File::create(path)
        .map_err(|e| LoggerError::file_transport(display.as_str(), e.to_string()))?;
    writeln!(
        handle,
        "{} [{}]",
        FILE_HEADER_PREFIX,
        TimestampFormat::Iso8601.now()
    )
    .map_err(|e| LoggerError::io_operation("writing log file header", display.as_str(), e))?;
    drop(handle);

    let handle = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| LoggerError::file_transport(display.as_str(), e.to_string()))?;
    let handle = Mutex::new(handle);

    transport.set_method(
        MethodKey::Write,
        move |msg, _context| {
            if msg.muted {
                return Ok(());
            }
            let mut file = handle.lock();
            FileExt::lock_exclusive(&*file)
                .map_err(|e| LoggerError::io_operation("locking log file", display.as_str(), e))?;
            let written = file.write_all(msg.plain_text().as_bytes());
            if let Err(e) = FileExt::unlock(&*file) {
                eprintln!("[LOGGER WARNING] Failed to unlock '{}': {}", display, e);
            }
            written.map_err(|e| LoggerError::io_operation("appending to log file", display.as_str(), e))
        },
        true,
    );
    Ok(())
}
