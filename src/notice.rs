use std::time::{Duration, Instant};

/// How long a notice stays on screen before auto-dismissal
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// A transient on-screen notice
pub struct Notice {
    pub message: String,
    posted: Instant,
}

/// Fixed-position transient notices, rendered top-right. Each error spawns
/// an independent notice; no queueing, no deduplication. Notices expire
/// after a fixed delay or on explicit dismissal, whichever comes first.
#[derive(Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a new notice
    pub fn post(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            message: message.into(),
            posted: Instant::now(),
        });
    }

    /// Drop expired notices; called once per event-loop tick
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&mut self, now: Instant) {
        self.notices
            .retain(|n| now.duration_since(n.posted) < NOTICE_TTL);
    }

    /// Dismiss a notice by position. Dismissing one that already expired
    /// (or never existed) is a no-op.
    pub fn dismiss(&mut self, index: usize) {
        if index < self.notices.len() {
            self.notices.remove(index);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
