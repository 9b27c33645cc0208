//! Outward-facing surfaces the login controller drives.

use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Destructive,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.kind == NotificationKind::Destructive
    }
}

/// Displays notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Performs a full redirect once `delay` has elapsed.
pub trait Navigator: Send + Sync {
    fn navigate_after(&self, target: Url, delay: Duration);
}
