//! Wave composer: the pending message text

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    text: String,
}

impl Composer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Trimmed message, or `None` when there is nothing to send
    pub fn message(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self, busy: bool) -> bool {
        !busy && self.message().is_some()
    }
}
