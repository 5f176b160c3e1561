//! Transient notices for the shopper.
//!
//! Handlers queue a notice in the session; the client drains the queue with
//! `GET /api/notifications` and shows each one once.

use serde::{Deserialize, Serialize};

use crate::models::session_keys;
use crate::stores::{StateStore, load_or_default, persist};

/// Queue length cap; older notices are dropped first.
const MAX_QUEUED: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message shown once to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Append a notice to the visitor's queue.
pub async fn push<S: StateStore>(store: &S, notice: Notice) {
    let mut queue: Vec<Notice> = load_or_default(store, session_keys::NOTIFICATIONS).await;
    queue.push(notice);
    if queue.len() > MAX_QUEUED {
        let excess = queue.len() - MAX_QUEUED;
        queue.drain(..excess);
    }
    persist(store, session_keys::NOTIFICATIONS, &queue).await;
}

/// Take every queued notice, leaving the queue empty.
pub async fn drain<S: StateStore>(store: &S) -> Vec<Notice> {
    let queue: Vec<Notice> = load_or_default(store, session_keys::NOTIFICATIONS).await;
    if !queue.is_empty() {
        persist(store, session_keys::NOTIFICATIONS, &Vec::<Notice>::new()).await;
    }
    queue
}
