use tracing::debug;

use crate::texts;

/// The legal notice panel. Remembers only what is on screen; whether the
/// notice was already surfaced is the caller's business.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisclaimerGate {
    text: Option<String>,
    shows: usize,
}

impl DisclaimerGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the panel visible with `text`. Repeated calls keep it visible
    /// and the last text wins; blank text falls back to the default notice.
    pub fn show(&mut self, text: &str) {
        let text = if text.trim().is_empty() {
            texts::DISCLAIMER
        } else {
            text
        };
        self.text = Some(text.to_string());
        self.shows += 1;
        debug!(shows = self.shows, "disclaimer: shown");
    }

    pub fn is_visible(&self) -> bool {
        self.text.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Number of `show` calls so far.
    pub fn show_count(&self) -> usize {
        self.shows
    }
}
