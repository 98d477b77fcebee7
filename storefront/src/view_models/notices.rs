use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Danger,
}

/// A dismissible, user-visible message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip)]
    pub posted_at: Instant,
}

#[derive(Debug)]
pub struct NoticeBoard {
    next_id: u64,
    ttl: Duration,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            next_id: 1,
            ttl,
            notices: Vec::new(),
        }
    }

    pub fn post(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        match level {
            NoticeLevel::Success => tracing::info!(notice_id = id, %message, "Notice posted"),
            NoticeLevel::Danger => tracing::warn!(notice_id = id, %message, "Notice posted"),
        }
        // Newest first, like banners inserted at the top of the page
        self.notices.insert(
            0,
            Notice {
                id,
                level,
                message,
                posted_at: Instant::now(),
            },
        );
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop notices older than the board's TTL. Returns how many were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.notices.len();
        let ttl = self.ttl;
        self.notices
            .retain(|n| now.saturating_duration_since(n.posted_at) < ttl);
        before - self.notices.len()
    }

    pub fn all(&self) -> &[Notice] {
        &self.notices
    }
}
