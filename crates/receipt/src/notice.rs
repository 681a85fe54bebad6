//! Transient on-screen status notices

use std::time::{Duration, Instant};

/// How long error notices stay up
pub const ERROR_NOTICE_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Progress,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Dismissed automatically after this delay; `None` stays until dismissed
    pub auto_dismiss: Option<Duration>,
}

impl Notice {
    pub fn progress(message: &str) -> Self {
        Self {
            level: NoticeLevel::Progress,
            message: message.to_string(),
            auto_dismiss: None,
        }
    }

    pub fn error(message: &str, auto_dismiss: Duration) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.to_string(),
            auto_dismiss: Some(auto_dismiss),
        }
    }
}

/// Handle of a shown notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(pub u64);

/// Where notices are shown
pub trait StatusSurface {
    fn show(&mut self, notice: Notice) -> NoticeId;
    fn dismiss(&mut self, id: NoticeId);
}

#[derive(Debug)]
struct ActiveNotice {
    id: NoticeId,
    notice: Notice,
    shown_at: Instant,
}

/// In-memory status surface
///
/// Auto-dismissing notices are removed by [`NoticeBoard::prune`].
#[derive(Debug, Default)]
pub struct NoticeBoard {
    next_id: u64,
    active: Vec<ActiveNotice>,
    history: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices currently shown, oldest first
    pub fn active(&self) -> impl Iterator<Item = &Notice> {
        self.active.iter().map(|a| &a.notice)
    }

    /// Every notice ever shown
    pub fn history(&self) -> &[Notice] {
        &self.history
    }

    /// Remove auto-dismissing notices whose delay has elapsed at `now`
    pub fn prune(&mut self, now: Instant) {
        self.active.retain(|a| match a.notice.auto_dismiss {
            Some(delay) => now.saturating_duration_since(a.shown_at) < delay,
            None => true,
        });
    }
}

impl StatusSurface for NoticeBoard {
    fn show(&mut self, notice: Notice) -> NoticeId {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        self.history.push(notice.clone());
        self.active.push(ActiveNotice {
            id,
            notice,
            shown_at: Instant::now(),
        });
        id
    }

    fn dismiss(&mut self, id: NoticeId) {
        self.active.retain(|a| a.id != id);
    }
}

/// Progress indicator shown for as long as the guard lives
pub struct ProgressNotice<'a> {
    surface: &'a mut dyn StatusSurface,
    id: NoticeId,
}

impl<'a> ProgressNotice<'a> {
    pub fn show(surface: &'a mut dyn StatusSurface, message: &str) -> Self {
        let id = surface.show(Notice::progress(message));
        Self { surface, id }
    }

    /// The surface, for notices raised while in progress
    pub fn surface(&mut self) -> &mut dyn StatusSurface {
        &mut *self.surface
    }
}

impl Drop for ProgressNotice<'_> {
    fn drop(&mut self) {
        self.surface.dismiss(self.id);
    }
}
