//! Transient user notifications with per-entry expiry.
//!
//! Each entry expires a fixed delay after its own push, independent of the
//! others. Expired entries are dropped whenever the queue is observed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Default time a notification stays visible.
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 5;

pub type NotificationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: DateTime<Utc>,
}

struct QueueInner {
    entries: VecDeque<Notification>,
}

/// Shared FIFO of notifications.
///
/// Cloning yields another handle to the same queue, so the store and the
/// embedding UI can both hold one.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<QueueInner>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl NotificationQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::seconds(DEFAULT_NOTIFICATION_TTL_SECS as i64))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner {
                entries: VecDeque::new(),
            })),
            clock,
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a notification. Identical messages get their own entries.
    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let entry = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            expires_at: self.clock.now() + self.ttl,
        };
        let id = entry.id;
        self.lock().entries.push_back(entry);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Error)
    }

    /// Remove a notification before it expires. Returns whether it was present.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|n| n.id != id);
        inner.entries.len() != before
    }

    /// Drop expired entries, returning their ids.
    pub fn prune(&self) -> Vec<NotificationId> {
        let now = self.clock.now();
        let mut inner = self.lock();
        let mut expired = Vec::new();
        inner.entries.retain(|n| {
            if n.expires_at <= now {
                expired.push(n.id);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Live notifications in push order.
    pub fn active(&self) -> Vec<Notification> {
        self.prune();
        self.lock().entries.iter().cloned().collect()
    }

    /// Earliest pending expiry, for scheduling the next redraw.
    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        self.lock().entries.iter().map(|n| n.expires_at).min()
    }

    pub fn len(&self) -> usize {
        self.active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("entries", &self.lock().entries)
            .field("ttl", &self.ttl)
            .finish()
    }
}
