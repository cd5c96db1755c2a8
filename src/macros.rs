//! Logging macros accepting mixed segment types.
//!
//! Every argument after the logger is turned into a segment with
//! [`to_segment`](crate::to_segment), so strings, numbers and any
//! `Serialize` value can be passed side by side.
//!
//! # Examples
//!
//! ```
//! use pipelog::prelude::*;
//! use pipelog::info;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .format("%msg")
//!     .transport("memory", sink.transport())
//!     .build()
//!     .unwrap();
//!
//! let port = 8080;
//! info!(logger, "listening on", port);
//! assert_eq!(sink.plain_output(), "listening on 8080\n");
//! ```

/// Log at a level looked up by name.
///
/// # Examples
///
/// ```
/// # use pipelog::prelude::*;
/// # let logger = Logger::builder().custom_levels(["audit"]).build().unwrap();
/// use pipelog::log_at;
/// log_at!(logger, "audit", "user", 42, "signed in");
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($seg:expr),+ $(,)?) => {
        $logger.log_at($level, vec![$($crate::to_segment(&$seg)),+])
    };
}

/// Log an info-level message; same as [`info!`](crate::info).
#[macro_export]
macro_rules! log {
    ($logger:expr, $($seg:expr),+ $(,)?) => {
        $logger.log(vec![$($crate::to_segment(&$seg)),+])
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use pipelog::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use pipelog::info;
/// info!(logger, "Application started");
/// info!(logger, "config", serde_json::json!({"workers": 4}));
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($seg:expr),+ $(,)?) => {
        $logger.info(vec![$($crate::to_segment(&$seg)),+])
    };
}

/// Log a success-level message.
#[macro_export]
macro_rules! success {
    ($logger:expr, $($seg:expr),+ $(,)?) => {
        $logger.success(vec![$($crate::to_segment(&$seg)),+])
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use pipelog::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use pipelog::warn;
/// warn!(logger, "Retry attempt", 3, "of", 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($seg:expr),+ $(,)?) => {
        $logger.warn(vec![$($crate::to_segment(&$seg)),+])
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($seg:expr),+ $(,)?) => {
        $logger.error(vec![$($crate::to_segment(&$seg)),+])
    };
}

#[cfg(test)]
mod tests {
    use crate::core::Registry;
    use crate::prelude::*;
    use serde::Serialize;
    use std::sync::Arc;

    fn logger(sink: &MemorySink) -> Arc<Logger> {
        Logger::builder()
            .registry(Arc::new(Registry::new()))
            .format("%symbol %msg")
            .custom_levels(["trace"])
            .transport("memory", sink.transport())
            .build()
            .unwrap()
    }

    #[derive(Serialize)]
    struct Job {
        id: u32,
    }

    #[test]
    fn test_mixed_segments() {
        let sink = MemorySink::new();
        let logger = logger(&sink);

        info!(logger, "job", Job { id: 7 }, true);
        assert_eq!(sink.plain_output(), "[INFO] job {\"id\":7} true\n");
    }

    #[test]
    fn test_each_level() {
        let sink = MemorySink::new();
        let logger = logger(&sink);

        log!(logger, "a");
        success!(logger, "b");
        warn!(logger, "c");
        error!(logger, "d");
        log_at!(logger, "trace", "e");

        assert_eq!(
            sink.plain_output(),
            "[INFO] a\n[SUCCESS] b\n[WARNING] c\n[ERROR] d\n[TRACE] e\n"
        );
    }
}
