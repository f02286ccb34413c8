//! Transient notices
//!
//! At most one notice is active. Every notice gets a token; expiry and
//! completion only clear the notice they were issued for, so a late timer
//! cannot wipe a newer banner.

/// A loading label or an error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransientNotice {
    Loading(String),
    Error(String),
}

/// Identifies one issued notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeToken(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeBoard {
    current: Option<(NoticeToken, TransientNotice)>,
    issued: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self, notice: TransientNotice) -> NoticeToken {
        self.issued += 1;
        let token = NoticeToken(self.issued);
        self.current = Some((token, notice));
        token
    }

    /// Show a progress label until `finish` is called with the returned token
    pub fn loading(&mut self, label: impl Into<String>) -> NoticeToken {
        self.issue(TransientNotice::Loading(label.into()))
    }

    /// Show an error; the host expires it after the notice timeout
    pub fn error(&mut self, message: impl Into<String>) -> NoticeToken {
        self.issue(TransientNotice::Error(message.into()))
    }

    /// Clear the loading notice identified by `token`, if it is still shown
    pub fn finish(&mut self, token: NoticeToken) {
        if matches!(&self.current, Some((t, TransientNotice::Loading(_))) if *t == token) {
            self.current = None;
        }
    }

    /// Clear the error identified by `token`, if it is still shown
    ///
    /// Returns true when something was cleared.
    pub fn expire(&mut self, token: NoticeToken) -> bool {
        if matches!(&self.current, Some((t, TransientNotice::Error(_))) if *t == token) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&TransientNotice> {
        self.current.as_ref().map(|(_, notice)| notice)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.current(), Some(TransientNotice::Loading(_)))
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
