//! Client side of the tax assistant: a chat transcript that can hand off to
//! an embedded calculation form and back.

pub mod api;
pub mod config;
pub mod conversation;
pub mod disclaimer;
pub mod form;
pub mod render;
pub mod session;
pub mod texts;

pub use api::{HttpApiClient, TaxApi};
pub use config::{load_settings, ClientSettings, Endpoints};
pub use conversation::{ConversationController, TurnRouting};
pub use disclaimer::DisclaimerGate;
pub use form::{FormInput, FormPhase, FormSessionManager, FormValidationError};
pub use render::{NumberLocale, ResultRenderer};
pub use session::{ChatSession, InboundReply, OutboundRequest, SessionState};
