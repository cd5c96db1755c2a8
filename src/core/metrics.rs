//! Logger metrics for observability
//!
//! Counters describing what a logger did with the messages posted to it:
//! how many arrived, how many were muted, how many copies went down pipes
//! and how many transports actually ran a write callback.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-logger routing counters
///
/// # Example
///
/// ```
/// use pipelog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_posted();
/// metrics.record_muted();
///
/// assert_eq!(metrics.posted(), 1);
/// assert_eq!(metrics.mute_rate(), 100.0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Messages that reached `post_message`, emitted locally or piped in
    posted: AtomicU64,

    /// Messages that left `post_message` marked muted
    muted: AtomicU64,

    /// Copies handed to pipes with a live receiver
    piped: AtomicU64,

    /// Transport posts that invoked a write callback
    delivered: AtomicU64,

    /// Transport posts refused (disabled or no write method)
    undelivered: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            posted: AtomicU64::new(0),
            muted: AtomicU64::new(0),
            piped: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            undelivered: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn muted(&self) -> u64 {
        self.muted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn piped(&self) -> u64 {
        self.piped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn undelivered(&self) -> u64 {
        self.undelivered.load(Ordering::Relaxed)
    }

    /// Record a posted message, returning the previous count
    #[inline]
    pub fn record_posted(&self) -> u64 {
        self.posted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_muted(&self) -> u64 {
        self.muted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_piped(&self) -> u64 {
        self.piped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_undelivered(&self) -> u64 {
        self.undelivered.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of posted messages that were muted, as a percentage
    ///
    /// Returns 0.0 if nothing has been posted.
    pub fn mute_rate(&self) -> f64 {
        let posted = self.posted() as f64;
        if posted == 0.0 {
            0.0
        } else {
            (self.muted() as f64 / posted) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.posted.store(0, Ordering::Relaxed);
        self.muted.store(0, Ordering::Relaxed);
        self.piped.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.undelivered.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            posted: AtomicU64::new(self.posted()),
            muted: AtomicU64::new(self.muted()),
            piped: AtomicU64::new(self.piped()),
            delivered: AtomicU64::new(self.delivered()),
            undelivered: AtomicU64::new(self.undelivered()),
        }
    }
}
