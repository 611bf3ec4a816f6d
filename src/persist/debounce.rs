//! Coalescing of rapid saves into one write.

use std::time::{Duration, Instant};

use crate::config::Configuration;

/// Quiet period before a scheduled save becomes due.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(180);

/// A single pending save.
///
/// Every [`schedule`](Self::schedule) replaces the pending configuration and
/// restarts the quiet period, so only the last configuration of a burst is
/// ever written. Time is passed in by the caller.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    delay: Duration,
    pending: Option<(Configuration, Instant)>,
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending save and restarts the quiet period at `now`.
    pub fn schedule(&mut self, config: Configuration, now: Instant) {
        let restarted = self.pending.is_some();
        self.pending = Some((config, now + self.delay));
        tracing::debug!(restarted, "save scheduled");
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending save becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Takes the pending configuration once its quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<Configuration> {
        match &self.pending {
            Some((_, at)) if now >= *at => self.pending.take().map(|(config, _)| config),
            _ => None,
        }
    }

    /// Takes the pending configuration regardless of its deadline.
    pub fn flush(&mut self) -> Option<Configuration> {
        self.pending.take().map(|(config, _)| config)
    }
}
