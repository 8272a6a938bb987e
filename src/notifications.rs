use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Where the client reports things the user has to see: notifications and
/// forced navigation.
#[cfg_attr(test, mockall::automock)]
pub trait ClientEvents: Send + Sync {
    fn notify(&self, notice: Notice);
    fn redirect(&self, location: &str);
}

/// Buffers events until the console server hands them to the browser.
#[derive(Default)]
pub struct NoticeQueue {
    notices: Mutex<Vec<Notice>>,
    redirect: Mutex<Option<String>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => notices.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn take_redirect(&self) -> Option<String> {
        self.redirect.lock().ok().and_then(|mut r| r.take())
    }
}

impl ClientEvents for NoticeQueue {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }

    fn redirect(&self, location: &str) {
        if let Ok(mut redirect) = self.redirect.lock() {
            *redirect = Some(location.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_order_and_empties() {
        let queue = NoticeQueue::new();
        queue.notify(Notice::error("first"));
        queue.notify(Notice::success("second"));

        let drained = queue.drain();
        assert_eq!(drained, vec![Notice::error("first"), Notice::success("second")]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn redirect_is_taken_once() {
        let queue = NoticeQueue::new();
        queue.redirect("/login");
        assert_eq!(queue.take_redirect().as_deref(), Some("/login"));
        assert_eq!(queue.take_redirect(), None);
    }
}
