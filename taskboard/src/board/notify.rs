//! Transient user-facing messages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of notifications kept.
pub const DEFAULT_CAPACITY: usize = 8;

/// Default time a notification stays visible.
pub const DEFAULT_TTL: Duration = Duration::from_secs(4);

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

/// One message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub created_at: Instant,
}

/// Bounded queue of notifications, newest last.
#[derive(Debug, Clone)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    capacity: usize,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl Notifications {
    /// Creates a queue holding at most `capacity` entries, each visible for `ttl`.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Adds a notification, dropping the oldest when full.
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Error => tracing::warn!(%message, "notify"),
            Level::Success | Level::Info => tracing::info!(%message, "notify"),
        }
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notification {
            level,
            message,
            created_at: Instant::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Drops notifications older than the TTL as of `now`.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.queue
            .retain(|n| now.saturating_duration_since(n.created_at) < ttl);
    }

    /// The most recent notification.
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
