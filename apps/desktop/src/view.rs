//! Prints session changes to the terminal: transcript, error banner,
//! disclaimer panel and the embedded form.

use client_core::{ChatSession, FormPhase};

pub const FORM_HINT: &str = "[form] /calc <revenue> <months worked 1-6>, or /cancel";

#[derive(Debug, Default)]
pub struct TerminalView {
    printed: usize,
    banner: Option<String>,
    disclaimer: Option<String>,
    form_phase: FormPhase,
    inline_error: Option<String>,
}

impl TerminalView {
    pub fn render(&mut self, session: &ChatSession) {
        for line in self.changes(session) {
            println!("{line}");
        }
    }

    /// Makes the next render repeat the current inline form error even if
    /// its text did not change.
    pub fn forget_inline_error(&mut self) {
        self.inline_error = None;
    }

    /// Lines describing what changed since the previous call.
    pub fn changes(&mut self, session: &ChatSession) -> Vec<String> {
        let mut lines = Vec::new();

        let transcript = session.conversation().transcript();
        for message in transcript.iter().skip(self.printed) {
            lines.push(format!("[{}] {message}", message.sent_at.format("%H:%M")));
        }
        self.printed = transcript.len();

        let banner = session.conversation().error_banner().map(str::to_string);
        if banner != self.banner {
            if let Some(text) = &banner {
                lines.push(format!("[error] {text}"));
            }
            self.banner = banner;
        }

        let disclaimer = session.disclaimer().text().map(str::to_string);
        if disclaimer != self.disclaimer {
            if let Some(text) = &disclaimer {
                lines.push(format!("[disclaimer] {text}"));
            }
            self.disclaimer = disclaimer;
        }

        let phase = session.form().phase();
        if phase != self.form_phase {
            match phase {
                FormPhase::Open if self.form_phase == FormPhase::Closed => {
                    lines.push(FORM_HINT.to_string())
                }
                FormPhase::Submitting => lines.push("[form] calculating...".to_string()),
                _ => {}
            }
            self.form_phase = phase;
        }

        let inline_error = session.form().inline_error().map(str::to_string);
        if inline_error != self.inline_error {
            if let Some(text) = &inline_error {
                lines.push(format!("[form] {text}"));
            }
            self.inline_error = inline_error;
        }

        lines
    }
}
