use shared::{
    domain::{CalculationView, ChatMessage},
    error::{ApiError, ApiErrorKind},
    protocol::ChatTurnResponse,
};
use tracing::{debug, info, warn};

use crate::{disclaimer::DisclaimerGate, texts};

/// What a routed chat response asks of the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRouting {
    Reply,
    OpenForm,
    ErrorReply,
    Fallback,
}

impl TurnRouting {
    fn consults_disclaimer(self) -> bool {
        matches!(self, Self::Reply | Self::OpenForm)
    }
}

/// Sole writer of the transcript. Also owns the waiting-for-reply guard,
/// the disclaimer-shown flag and the global error banner.
#[derive(Debug, Clone)]
pub struct ConversationController {
    transcript: Vec<ChatMessage>,
    waiting_for_reply: bool,
    disclaimer_shown: bool,
    error_banner: Option<String>,
    chat_disclaimer: String,
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationController {
    pub fn new() -> Self {
        Self::with_chat_disclaimer(texts::DISCLAIMER)
    }

    /// `chat_disclaimer` is the fixed notice surfaced after assistant turns.
    pub fn with_chat_disclaimer(chat_disclaimer: impl Into<String>) -> Self {
        Self {
            transcript: Vec::new(),
            waiting_for_reply: false,
            disclaimer_shown: false,
            error_banner: None,
            chat_disclaimer: chat_disclaimer.into(),
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_waiting_for_reply(&self) -> bool {
        self.waiting_for_reply
    }

    pub fn disclaimer_shown(&self) -> bool {
        self.disclaimer_shown
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn greet(&mut self, text: &str) {
        self.transcript.push(ChatMessage::assistant(text));
    }

    /// Starts a chat turn. Returns the trimmed message to send, or `None`
    /// when the text is blank, a reply is pending or the form is active.
    pub fn begin_turn(&mut self, text: &str, form_active: bool) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.waiting_for_reply || form_active {
            debug!(
                waiting_for_reply = self.waiting_for_reply,
                form_active, "chat: turn rejected"
            );
            return None;
        }

        self.transcript.push(ChatMessage::user(text));
        self.waiting_for_reply = true;
        self.hide_error();
        Some(text.to_string())
    }

    pub fn route_response(&mut self, response: ChatTurnResponse) -> TurnRouting {
        self.hide_error();
        match response {
            ChatTurnResponse::AiMessage { text } => {
                self.transcript.push(ChatMessage::assistant(text));
                TurnRouting::Reply
            }
            ChatTurnResponse::ShowCalculationForm { text } => {
                self.transcript.push(ChatMessage::assistant(text));
                TurnRouting::OpenForm
            }
            ChatTurnResponse::Error { message } => {
                let message = if message.trim().is_empty() {
                    texts::INTERNAL_ERROR.to_string()
                } else {
                    message
                };
                warn!(%message, "chat: assistant reported an error");
                self.transcript.push(ChatMessage::assistant(message.clone()));
                self.show_error(message);
                TurnRouting::ErrorReply
            }
            ChatTurnResponse::Unrecognized => {
                warn!("chat: unrecognized response type");
                self.transcript
                    .push(ChatMessage::assistant(texts::UNEXPECTED_RESPONSE));
                TurnRouting::Fallback
            }
        }
    }

    /// Surfaces the fixed notice after a successful assistant turn.
    ///
    /// This path leaves `disclaimer_shown` untouched, so the notice is
    /// re-surfaced on every such turn until a calculation result latches it.
    pub fn evaluate_chat_disclaimer(&self, routing: TurnRouting, gate: &mut DisclaimerGate) {
        if !self.disclaimer_shown && routing.consults_disclaimer() {
            gate.show(&self.chat_disclaimer);
        }
    }

    pub fn fail_turn(&mut self, error: &ApiError) {
        warn!(
            kind = ?error.kind,
            status = ?error.http_status,
            detail = %error.detail,
            "chat: turn failed"
        );
        let inner = match error.kind {
            ApiErrorKind::Server => texts::CHAT_SERVER_ERROR_PREFIX,
            ApiErrorKind::Transport | ApiErrorKind::MalformedResponse => "",
        };
        self.show_error(format!("{}{inner}{error}", texts::CHAT_ERROR_PREFIX));
        self.transcript.push(ChatMessage::assistant(texts::CHAT_APOLOGY));
    }

    /// Unconditional end of a turn, whatever its outcome.
    pub fn finish_turn(&mut self) {
        self.waiting_for_reply = false;
    }

    pub fn append_calculation(&mut self, view: CalculationView) {
        info!("chat: calculation result appended");
        self.transcript.push(ChatMessage::calculation(view));
    }

    pub fn mark_disclaimer_shown(&mut self) {
        self.disclaimer_shown = true;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_banner = Some(message.into());
    }

    pub fn hide_error(&mut self) {
        self.error_banner = None;
    }
}
