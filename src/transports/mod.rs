//! Reference transports
//!
//! Each constructor returns a plain [`Transport`](crate::Transport) with its
//! write method bound; the `bind_*` variants attach the same behavior to an
//! existing transport.

pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod memory;

pub use console::{bind_console, console, console_to, SharedBuffer};
#[cfg(feature = "file")]
pub use file::{bind_file, file, FILE_HEADER_PREFIX};
pub use memory::MemorySink;
