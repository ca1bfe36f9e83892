use shared::{
    error::ApiError,
    protocol::{CalculationResult, ChatTurnResponse},
};
use tracing::{debug, warn};

use crate::{
    api::TaxApi,
    config::ClientSettings,
    conversation::{ConversationController, TurnRouting},
    disclaimer::DisclaimerGate,
    form::{FormInput, FormSessionManager},
    render::ResultRenderer,
};

/// A request the session has committed to; the caller must dispatch it and
/// feed the reply back through [`ChatSession::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundRequest {
    Chat { message: String },
    Calculate(FormInput),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundReply {
    Chat(Result<ChatTurnResponse, ApiError>),
    Calculation(Result<CalculationResult, ApiError>),
}

impl OutboundRequest {
    pub async fn dispatch<A: TaxApi + ?Sized>(self, api: &A) -> InboundReply {
        match self {
            Self::Chat { message } => InboundReply::Chat(api.chat(&message).await),
            Self::Calculate(input) => {
                InboundReply::Calculation(api.calculate(input.into()).await)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub waiting_for_reply: bool,
    pub disclaimer_shown: bool,
    pub form_active: bool,
}

/// One conversation: transcript, embedded form, disclaimer panel.
///
/// Every request-issuing operation is split into a synchronous `submit_*`
/// step that checks the guard flags and a `complete` step fed with the
/// reply, so at most one chat or calculation request is ever in flight.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    conversation: ConversationController,
    form: FormSessionManager,
    disclaimer: DisclaimerGate,
    renderer: ResultRenderer,
}

impl ChatSession {
    pub fn new(renderer: ResultRenderer) -> Self {
        Self {
            conversation: ConversationController::new(),
            form: FormSessionManager::new(),
            disclaimer: DisclaimerGate::new(),
            renderer,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(ResultRenderer::for_locale_tag(&settings.locale))
    }

    pub fn conversation(&self) -> &ConversationController {
        &self.conversation
    }

    pub fn form(&self) -> &FormSessionManager {
        &self.form
    }

    pub fn disclaimer(&self) -> &DisclaimerGate {
        &self.disclaimer
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            waiting_for_reply: self.conversation.is_waiting_for_reply(),
            disclaimer_shown: self.conversation.disclaimer_shown(),
            form_active: self.form.is_active(),
        }
    }

    pub fn request_in_flight(&self) -> bool {
        self.conversation.is_waiting_for_reply() || self.form.is_submitting()
    }

    pub fn chat_input_enabled(&self) -> bool {
        !self.conversation.is_waiting_for_reply() && !self.form.is_active()
    }

    pub fn greet(&mut self, text: &str) {
        self.conversation.greet(text);
    }

    pub fn submit_user_message(&mut self, text: &str) -> Option<OutboundRequest> {
        let message = self.conversation.begin_turn(text, self.form.is_active())?;
        self.form.close();
        debug!(chars = message.chars().count(), "chat: turn started");
        Some(OutboundRequest::Chat { message })
    }

    pub fn submit_form(
        &mut self,
        raw_revenue: &str,
        raw_months_worked: &str,
    ) -> Option<OutboundRequest> {
        if self.conversation.is_waiting_for_reply() {
            debug!("form: submit rejected while chat reply pending");
            return None;
        }
        let input = self.form.begin_submit(raw_revenue, raw_months_worked)?;
        Some(OutboundRequest::Calculate(input))
    }

    pub fn cancel_form(&mut self) -> bool {
        self.form.cancel()
    }

    /// Applies a reply to the request that produced it. Replies with no
    /// matching request in flight are dropped.
    pub fn complete(&mut self, reply: InboundReply) {
        match reply {
            InboundReply::Chat(_) if !self.conversation.is_waiting_for_reply() => {
                warn!("chat: reply dropped, no turn in flight");
            }
            InboundReply::Calculation(_) if !self.form.is_submitting() => {
                warn!("form: calculation reply dropped, no submission in flight");
            }
            InboundReply::Chat(result) => {
                match result {
                    Ok(response) => {
                        let routing = self.conversation.route_response(response);
                        if routing == TurnRouting::OpenForm {
                            self.form.show();
                        }
                        self.conversation
                            .evaluate_chat_disclaimer(routing, &mut self.disclaimer);
                    }
                    Err(error) => self.conversation.fail_turn(&error),
                }
                self.conversation.finish_turn();
            }
            InboundReply::Calculation(Ok(result)) => {
                self.form.finish_success();
                self.renderer
                    .present(&result, &mut self.conversation, &mut self.disclaimer);
            }
            InboundReply::Calculation(Err(error)) => {
                warn!(
                    kind = ?error.kind,
                    status = ?error.http_status,
                    detail = %error.detail,
                    "form: calculation failed"
                );
                self.form.finish_failure(&error);
            }
        }
    }

    /// Runs one chat turn to completion. Returns `false` when the guards
    /// rejected the message and nothing was sent.
    pub async fn send_user_message<A: TaxApi + ?Sized>(&mut self, api: &A, text: &str) -> bool {
        let Some(request) = self.submit_user_message(text) else {
            return false;
        };
        let reply = request.dispatch(api).await;
        self.complete(reply);
        true
    }

    /// Runs one form submission to completion. Returns `false` when
    /// validation or the guards stopped it before the network.
    pub async fn send_form<A: TaxApi + ?Sized>(
        &mut self,
        api: &A,
        raw_revenue: &str,
        raw_months_worked: &str,
    ) -> bool {
        let Some(request) = self.submit_form(raw_revenue, raw_months_worked) else {
            return false;
        };
        let reply = request.dispatch(api).await;
        self.complete(reply);
        true
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
